//! Interactive read-eval-print loop.
//!
//! Every line is one unit on the same session, in permissive mode, so a
//! redefinition shadows the previous one. Lines starting with `/` are
//! commands.

use crate::driver::Driver;
use crate::error::DriverError;
use crate::testing::run_tests;
use chi_ir::SymbolTable;
use chi_lexer::{Lexer, TokenKind};
use std::io::BufRead;
use std::path::{Path, PathBuf};

const USAGE: &[&str] = &[
    "Commands:",
    "  /quit            Leave the REPL",
    "  /usage           Show this message",
    "  /reload          Reset the session and reload the startup files",
    "  /verbose         Toggle verbose result printing",
    "  /echo            Toggle echoing tokens and the parsed tree",
    "  /file PATH       Run a file into the session",
    "  /lex SOURCE      Show the tokens of SOURCE",
    "  /parse SOURCE    Show the parsed tree of SOURCE",
    "  /test [PATHS]    Run test files (default: library/tests)",
    "Anything else is evaluated.",
];

/// Directory `/test` runs when no path is given.
const DEFAULT_TEST_DIR: &str = "library/tests";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct Repl<'d> {
    driver: &'d mut Driver,
}

impl<'d> Repl<'d> {
    pub fn new(driver: &'d mut Driver) -> Self {
        Repl { driver }
    }

    /// Read lines until `/quit` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> Result<(), DriverError> {
        self.driver
            .output()
            .line("Chi REPL. Type /usage for commands.");
        for line in input.lines() {
            let line = line.map_err(|error| DriverError::io("<stdin>", error))?;
            if self.handle(&line) == Control::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle one input line.
    pub fn handle(&mut self, line: &str) -> Control {
        let line = line.trim();
        if line.is_empty() {
            return Control::Continue;
        }
        let result = match line.strip_prefix('/') {
            Some(command) => self.command(command),
            None => self.evaluate(line),
        };
        match result {
            Ok(control) => control,
            Err(error) => {
                self.driver.report(&error);
                Control::Continue
            }
        }
    }

    fn print(&self, line: &str) {
        self.driver.output().line(line);
    }

    fn command(&mut self, command: &str) -> Result<Control, DriverError> {
        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        tracing::debug!(command = name, "repl command");

        match name {
            "quit" => return Ok(Control::Quit),
            "usage" => {
                for line in USAGE {
                    self.print(line);
                }
            }
            "reload" => {
                let report = self.driver.reset();
                self.print(&format!(
                    "reloaded {} startup files ({} failed)",
                    report.loaded, report.failed
                ));
            }
            "verbose" => {
                let verbose = !self.driver.options().verbose;
                self.driver.set_verbose(verbose);
                self.print(if verbose { "verbose on" } else { "verbose off" });
            }
            "echo" => {
                let echo = !self.driver.options().echo;
                self.driver.set_echo(echo);
                self.print(if echo { "echo on" } else { "echo off" });
            }
            "file" => {
                if argument.is_empty() {
                    return Err(DriverError::Usage("usage: /file PATH".to_string()));
                }
                let result = self.driver.run_file(Path::new(argument))?;
                self.print(&self.driver.render(&result));
            }
            "lex" => self.print(&self.tokens(argument)?),
            "parse" => {
                let program = self.driver.parse("<repl>", argument)?;
                let symbols = self.driver.session().symbols();
                self.print(chi_parse::dump_program(&program, symbols).trim_end());
            }
            "test" => {
                let paths: Vec<PathBuf> = if argument.is_empty() {
                    vec![PathBuf::from(DEFAULT_TEST_DIR)]
                } else {
                    argument.split_whitespace().map(PathBuf::from).collect()
                };
                run_tests(self.driver, &paths)?;
            }
            _ => {
                return Err(DriverError::Usage(format!(
                    "unknown command `/{name}`, try /usage"
                )))
            }
        }
        Ok(Control::Continue)
    }

    fn evaluate(&mut self, line: &str) -> Result<Control, DriverError> {
        if self.driver.options().echo {
            self.print(&format!("tokens: {}", self.tokens(line)?));
            let program = self.driver.parse("<repl>", line)?;
            let tree = chi_parse::dump_program(&program, self.driver.session().symbols());
            self.print(&format!("tree: {}", tree.trim_end().replace('\n', "; ")));
        }
        let result = self.driver.run_source("<repl>", line)?;
        self.print(&self.driver.render(&result));
        Ok(Control::Continue)
    }

    /// Tokens of `source`, space separated, without the final end marker.
    fn tokens(&self, source: &str) -> Result<String, DriverError> {
        let symbols = self.driver.session().symbols();
        let tokens = Lexer::new(source, symbols)
            .tokenize()
            .map_err(|error| DriverError::syntax("<repl>", source, error.span, &error))?;
        let texts: Vec<String> = tokens
            .kinds()
            .filter(|kind| **kind != TokenKind::Eof)
            .map(|kind| token_text(kind, symbols))
            .collect();
        Ok(texts.join(" "))
    }
}

fn token_text(kind: &TokenKind, symbols: &SymbolTable) -> String {
    match kind {
        TokenKind::Number(number) => format!("number({number})"),
        TokenKind::Ident(name) => format!("ident({})", symbols.text(*name)),
        other => other.describe().trim_matches('`').to_string(),
    }
}

#[cfg(test)]
mod tests;
