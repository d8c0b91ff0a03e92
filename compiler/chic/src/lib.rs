//! The Chi interpreter front end.
//!
//! ```text
//! source ──► chi_lexer ──► chi_parse ──► chi_eval::Session::run
//!                                            │ analyze, then evaluate
//!                                            ▼
//!                                      Program value ──► render ──► Output
//! ```
//!
//! A [`Driver`] owns one session and its [`Output`]. The `chi` binary builds
//! one per command: `run`, `test` and `repl`.

pub mod commands;
pub mod driver;
pub mod error;
pub mod options;
pub mod output;
pub mod repl;
pub mod testing;

pub use driver::{Driver, StartupReport};
pub use error::DriverError;
pub use options::Options;
pub use output::Output;
pub use testing::{run_tests, TestSummary};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber on stderr.
///
/// Nothing is installed unless `RUST_LOG` is set. With `CHI_LOG_TREE` set,
/// spans render as an indented tree. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
        if std::env::var_os("CHI_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    });
}
