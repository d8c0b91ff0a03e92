//! The driver: one session plus the plumbing around it.
//!
//! Turns source text into units, runs them on the session, loads the startup
//! directory and renders results according to the [`Options`].

use crate::error::DriverError;
use crate::options::Options;
use crate::output::Output;
use chi_eval::{render, LookupMode, Session, Value};
use chi_ir::{Program, SharedSymbols};
use std::path::{Path, PathBuf};

/// What a startup load did. Failures are logged, never fatal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub loaded: usize,
    pub failed: usize,
}

pub struct Driver {
    options: Options,
    session: Session,
    output: Output,
}

impl Driver {
    /// A driver on a fresh session. Startup files are not loaded yet.
    pub fn new(options: Options, output: Output) -> Self {
        let session =
            Session::new(SharedSymbols::new(), options.mode).with_print_handler(output.handler());
        Driver {
            options,
            session,
            output,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.options.verbose = verbose;
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.options.echo = echo;
    }

    pub fn set_mode(&mut self, mode: LookupMode) {
        self.options.mode = mode;
        self.session.set_mode(mode);
    }

    /// Parse one unit; `origin` names it in error messages.
    pub fn parse(&self, origin: &str, source: &str) -> Result<Program, DriverError> {
        chi_parse::parse(source, self.session.symbols()).map_err(|error| {
            let message = format!("{} while parsing {}", error.kind, error.context);
            DriverError::syntax(origin, source, error.span, message)
        })
    }

    /// Parse, analyze and evaluate one unit.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn run_source(&mut self, origin: &str, source: &str) -> Result<Value, DriverError> {
        let program = self.parse(origin, source)?;
        Ok(self.session.run(&program)?)
    }

    pub fn run_file(&mut self, path: &Path) -> Result<Value, DriverError> {
        let source = read_source(path)?;
        self.run_source(&path.display().to_string(), &source)
    }

    /// Run every startup file, in name order.
    pub fn load_startup(&mut self) -> StartupReport {
        let mut report = StartupReport::default();
        let dir = self.options.startup_dir.clone();
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no startup directory");
            return report;
        }

        let files = match chi_files(&dir) {
            Ok(files) => files,
            Err(error) => {
                tracing::warn!(%error, "cannot list startup files");
                report.failed += 1;
                return report;
            }
        };
        for file in files {
            match self.run_file(&file) {
                Ok(_) => report.loaded += 1,
                Err(error) => {
                    tracing::warn!(file = %file.display(), %error, "startup file failed");
                    report.failed += 1;
                }
            }
        }
        tracing::debug!(loaded = report.loaded, failed = report.failed, "startup loaded");
        report
    }

    /// Forget everything, then load the startup files again.
    pub fn reset(&mut self) -> StartupReport {
        self.session.reset();
        self.load_startup()
    }

    pub fn render(&self, value: &Value) -> String {
        render(value, self.session.symbols(), self.options.verbose)
    }

    /// Print an error with its category.
    pub fn report(&self, error: &DriverError) {
        self.output
            .line(&format!("{}: {error}", error.category()));
    }

    /// Drop the session, then wait for queued output.
    pub fn finish(self) {
        let Driver {
            session, output, ..
        } = self;
        drop(session);
        output.finish();
    }
}

pub fn read_source(path: &Path) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|error| DriverError::io(path, error))
}

/// `*.chi` files directly inside `dir`, sorted by name.
pub fn chi_files(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let entries = std::fs::read_dir(dir).map_err(|error| DriverError::io(dir, error))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|error| DriverError::io(dir, error))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "chi") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
