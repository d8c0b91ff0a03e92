//! Text rendering of values.
//!
//! Plain mode is what the REPL shows; verbose mode tags every scalar with
//! its variant (`num:`, `opn:`, `def:`, `pri:`, `mod:`) and brackets
//! sequences and programs so nesting is visible.

use crate::value::Value;
use chi_ir::SymbolTable;
use rustc_hash::FxHashSet;
use std::fmt::Write;

pub fn render(value: &Value, symbols: &SymbolTable, verbose: bool) -> String {
    let mut serializer = Serializer {
        symbols,
        verbose,
        out: String::new(),
        open_states: FxHashSet::default(),
    };
    serializer.value(value);
    serializer.out
}

struct Serializer<'a> {
    symbols: &'a SymbolTable,
    verbose: bool,
    out: String,
    /// States currently being written, to cut self-references.
    open_states: FxHashSet<usize>,
}

impl Serializer<'_> {
    fn tag(&mut self, prefix: &str) {
        if self.verbose {
            self.out.push_str(prefix);
        }
    }

    fn name(&mut self, name: chi_ir::Name) {
        let text = self.symbols.text(name);
        self.out.push_str(&text);
    }

    fn items(&mut self, items: &[Value], separator: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(separator);
            }
            self.value(item);
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::Nil => self.out.push_str("nil"),
            Value::Number(number) => {
                self.tag("num:");
                let _ = write!(self.out, "{number}");
            }
            Value::Open(name) => {
                self.tag("opn:");
                self.name(*name);
            }
            Value::Definition(callable) => {
                self.tag("def:");
                self.name(callable.name());
            }
            Value::Primitive(primitive) => {
                self.tag("pri:");
                self.name(primitive.signature);
            }
            Value::Module(module) => {
                self.tag("mod:");
                self.name(module.name);
            }
            Value::State(state) => {
                if !self.open_states.insert(state.addr()) {
                    self.out.push_str("<...>");
                    return;
                }
                self.out.push('<');
                for (i, (key, item)) in state.borrow().iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.name(key);
                    self.out.push('=');
                    self.value(item);
                }
                self.out.push('>');
                self.open_states.remove(&state.addr());
            }
            Value::Sequence(items) => {
                if self.verbose {
                    self.out.push('(');
                    self.items(items, " ");
                    self.out.push(')');
                } else {
                    self.items(items, " ");
                }
            }
            Value::Tuple(items) => {
                self.out.push('{');
                self.items(items, ",");
                self.out.push('}');
            }
            Value::Program(items) => {
                if self.verbose {
                    self.out.push('[');
                    self.items(items, ";");
                    self.out.push(']');
                } else {
                    self.items(items, ";");
                }
            }
        }
    }
}
