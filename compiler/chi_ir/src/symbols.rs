//! Symbol table: string interning with sequential codes.
//!
//! Every stage of the pipeline shares one table per session, so a [`Name`]
//! produced while lexing compares equal to the one the interpreter builds
//! when it assembles a call signature at run time.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Error returned by [`SymbolTable::by_code`] and [`SymbolTable::by_text`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownSymbol {
    #[error("no symbol with code {0}")]
    Code(u32),
    #[error("no symbol with text `{0}`")]
    Text(String),
}

/// A resolved symbol: its code together with its text.
#[derive(Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: Name,
    pub text: Arc<str>,
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.name.raw(), self.text)
    }
}

struct SymbolStore {
    map: FxHashMap<Arc<str>, u32>,
    texts: Vec<Arc<str>>,
}

/// Interns strings to small integer codes.
///
/// Code 0 is the `<null>` sentinel. The well-known names in
/// [`WellKnownNames`] are interned right after it by [`SymbolTable::new`].
pub struct SymbolTable {
    store: RwLock<SymbolStore>,
}

/// Text of the sentinel symbol at code 0.
pub const NULL_TEXT: &str = "<null>";

impl SymbolTable {
    pub fn new() -> Self {
        let null: Arc<str> = Arc::from(NULL_TEXT);
        let mut map = FxHashMap::default();
        map.insert(Arc::clone(&null), 0);
        let table = SymbolTable {
            store: RwLock::new(SymbolStore {
                map,
                texts: vec![null],
            }),
        };
        let _ = WellKnownNames::new(&table);
        table
    }

    /// Intern `text`, returning the existing code when already present.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct symbols are interned.
    pub fn intern(&self, text: &str) -> Name {
        {
            let guard = self.store.read();
            if let Some(&code) = guard.map.get(text) {
                return Name::from_raw(code);
            }
        }

        let mut guard = self.store.write();
        if let Some(&code) = guard.map.get(text) {
            return Name::from_raw(code);
        }

        let code = u32::try_from(guard.texts.len())
            .unwrap_or_else(|_| panic!("symbol table exceeded {} entries", u32::MAX));
        let shared: Arc<str> = Arc::from(text);
        guard.texts.push(Arc::clone(&shared));
        guard.map.insert(shared, code);
        Name::from_raw(code)
    }

    pub fn by_code(&self, code: u32) -> Result<Symbol, UnknownSymbol> {
        let guard = self.store.read();
        let index = usize::try_from(code).map_err(|_| UnknownSymbol::Code(code))?;
        guard
            .texts
            .get(index)
            .map(|text| Symbol {
                name: Name::from_raw(code),
                text: Arc::clone(text),
            })
            .ok_or(UnknownSymbol::Code(code))
    }

    pub fn by_text(&self, text: &str) -> Result<Symbol, UnknownSymbol> {
        let guard = self.store.read();
        guard
            .map
            .get_key_value(text)
            .map(|(text, &code)| Symbol {
                name: Name::from_raw(code),
                text: Arc::clone(text),
            })
            .ok_or_else(|| UnknownSymbol::Text(text.to_owned()))
    }

    /// Text for `name`, or `<null>` for codes this table never issued.
    pub fn text(&self, name: Name) -> Arc<str> {
        let guard = self.store.read();
        let index = name.raw() as usize;
        guard
            .texts
            .get(index)
            .map_or_else(|| Arc::clone(&guard.texts[0]), Arc::clone)
    }

    /// Number of interned symbols, sentinel included.
    pub fn len(&self) -> usize {
        self.store.read().texts.len()
    }

    /// Always false: the sentinel is interned on construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intern the signature `name(arity)` used to declare definitions.
    pub fn signature(&self, name: Name, arity: usize) -> Name {
        let text = self.text(name);
        self.intern(&format!("{text}({arity})"))
    }

    /// Intern the catch-all signature `name(*)` used by variadic primitives.
    pub fn variadic_signature(&self, name: Name) -> Name {
        let text = self.text(name);
        self.intern(&format!("{text}(*)"))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Names every session relies on, pre-interned in a fixed order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WellKnownNames {
    pub null: Name,
    pub ok: Name,
    pub ko: Name,
    pub global: Name,
    pub program: Name,
}

impl WellKnownNames {
    pub fn new(symbols: &SymbolTable) -> Self {
        WellKnownNames {
            null: Name::NULL,
            ok: symbols.intern("OK"),
            ko: symbols.intern("KO"),
            global: symbols.intern("<global>"),
            program: symbols.intern("<program>"),
        }
    }
}

/// Cheaply cloneable handle to a [`SymbolTable`].
#[derive(Clone)]
pub struct SharedSymbols(Arc<SymbolTable>);

impl SharedSymbols {
    pub fn new() -> Self {
        SharedSymbols(Arc::new(SymbolTable::new()))
    }
}

impl Default for SharedSymbols {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SharedSymbols {
    type Target = SymbolTable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
