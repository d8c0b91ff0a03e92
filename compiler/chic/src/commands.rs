//! Command handlers for the `chi` binary. Each returns the process exit code.

use crate::driver::Driver;
use crate::options::Options;
use crate::output::Output;
use crate::repl::Repl;
use crate::testing::run_tests;
use std::path::{Path, PathBuf};

fn start(options: Options) -> Driver {
    let mut driver = Driver::new(options, Output::spawn());
    let report = driver.load_startup();
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "some startup files failed");
    }
    driver
}

/// `chi run FILE`: evaluate a file and print its result.
pub fn run_file(path: &str) -> i32 {
    let mut driver = start(Options::from_env());
    let code = match driver.run_file(Path::new(path)) {
        Ok(result) => {
            let rendered = driver.render(&result);
            driver.output().line(&rendered);
            0
        }
        Err(error) => {
            driver.report(&error);
            1
        }
    };
    driver.finish();
    code
}

/// `chi test [PATHS...]`: run test files, defaulting to `library/tests`.
pub fn test_files(paths: &[String]) -> i32 {
    let paths: Vec<PathBuf> = if paths.is_empty() {
        vec![PathBuf::from("library/tests")]
    } else {
        paths.iter().map(PathBuf::from).collect()
    };

    let mut driver = start(Options::from_env());
    let code = match run_tests(&mut driver, &paths) {
        Ok(summary) if summary.is_success() => 0,
        Ok(_) => 1,
        Err(error) => {
            driver.report(&error);
            1
        }
    };
    driver.finish();
    code
}

/// `chi repl`: read lines from stdin.
pub fn repl() -> i32 {
    let mut driver = start(Options::from_env().for_repl());
    let stdin = std::io::stdin();
    let code = match Repl::new(&mut driver).run(stdin.lock()) {
        Ok(()) => 0,
        Err(error) => {
            driver.report(&error);
            1
        }
    };
    driver.finish();
    code
}
