//! Driver configuration.

use chi_eval::LookupMode;
use std::path::PathBuf;

/// Environment variable naming the startup directory.
pub const STARTUP_ENV: &str = "CHI_STARTUP";

/// Startup directory used when `CHI_STARTUP` is unset.
pub const DEFAULT_STARTUP_DIR: &str = "library/startup";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Strict for `run` and `test`, permissive in the REPL.
    pub mode: LookupMode,
    /// Tag scalars and bracket collections when printing results.
    pub verbose: bool,
    /// Every `*.chi` file here runs before user code.
    pub startup_dir: PathBuf,
    /// Show tokens and the parsed tree before evaluating a REPL line.
    pub echo: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            mode: LookupMode::Strict,
            verbose: false,
            startup_dir: PathBuf::from(DEFAULT_STARTUP_DIR),
            echo: false,
        }
    }
}

impl Options {
    /// Defaults, with the startup directory taken from `CHI_STARTUP` when set.
    pub fn from_env() -> Self {
        let mut options = Options::default();
        if let Some(dir) = std::env::var_os(STARTUP_ENV).filter(|dir| !dir.is_empty()) {
            options.startup_dir = PathBuf::from(dir);
        }
        options
    }

    /// The REPL shadows earlier definitions instead of rejecting them.
    #[must_use]
    pub fn for_repl(mut self) -> Self {
        self.mode = LookupMode::Permissive;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.mode, LookupMode::Strict);
        assert_eq!(options.startup_dir, PathBuf::from("library/startup"));
        assert!(!options.verbose);
    }

    #[test]
    fn test_repl_is_permissive() {
        assert_eq!(Options::default().for_repl().mode, LookupMode::Permissive);
    }
}
