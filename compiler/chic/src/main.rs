//! Chi interpreter CLI

use chic::commands::{repl, run_file, test_files};

fn main() {
    chic::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    let Some(command) = args.get(1) else {
        print_usage();
        return;
    };

    let code = match command.as_str() {
        "run" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: chi run <file.chi>");
                std::process::exit(1);
            };
            run_file(path)
        }
        "test" => test_files(&args[2..]),
        "repl" => repl(),
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-v" => {
            println!("Chi {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            // A bare file path runs it
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("chi"))
            {
                run_file(command)
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                1
            }
        }
    };
    std::process::exit(code);
}

fn print_usage() {
    println!("Chi interpreter");
    println!();
    println!("Usage: chi <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.chi>      Run a program and print its result");
    println!("  test [paths...]     Run test files (default: library/tests)");
    println!("  repl                Start an interactive session");
    println!("  help                Show this help message");
    println!("  version             Show version information");
    println!();
    println!("Environment:");
    println!("  CHI_STARTUP         Startup directory (default: library/startup)");
    println!("  RUST_LOG            Enable tracing, e.g. RUST_LOG=chi_eval=debug");
    println!("  CHI_LOG_TREE        Render tracing spans as a tree");
    println!();
    println!("Examples:");
    println!("  chi run program.chi");
    println!("  chi test library/tests");
    println!("  chi repl");
}
