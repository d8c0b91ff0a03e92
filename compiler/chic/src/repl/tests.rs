use super::*;
use crate::options::Options;
use crate::output::Output;
use pretty_assertions::assert_eq;

fn driver() -> Driver {
    let options = Options {
        startup_dir: PathBuf::from("no/startup"),
        ..Options::default()
    }
    .for_repl();
    Driver::new(options, Output::buffered())
}

/// Feed `lines` and return what the REPL printed.
fn session(lines: &[&str]) -> String {
    let mut driver = driver();
    let mut repl = Repl::new(&mut driver);
    for line in lines {
        if repl.handle(line) == Control::Quit {
            break;
        }
    }
    driver.output().captured()
}

#[test]
fn test_evaluates_lines() {
    assert_eq!(session(&["+(1, 2)", "mul(_, 2)"]), "3\n6\n");
}

#[test]
fn test_redefinition_shadows() {
    let output = session(&["def f() => old", "def f() => new", "f()"]);
    assert_eq!(output, "f\nf\nnew\n");
}

#[test]
fn test_errors_keep_the_session_alive() {
    let output = session(&["div(1, 0)", "if", "1"]);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "runtime error: primitive `div(2)`: division by zero");
    assert!(lines[1].starts_with("syntax error: <repl>:1:3:"));
    assert_eq!(lines[2], "1");
}

#[test]
fn test_quit_stops_reading() {
    assert_eq!(session(&["1", "/quit", "2"]), "1\n");
}

#[test]
fn test_verbose_toggle() {
    let output = session(&["/verbose", "1 a", "/verbose", "1 a"]);
    assert_eq!(output, "verbose on\n[(num:1 opn:a)]\nverbose off\n1 a\n");
}

#[test]
fn test_lex_and_parse_commands() {
    let output = session(&["/lex f(x) :: 1.5", "/parse f(x) :: y"]);
    assert_eq!(
        output,
        "ident(f) ( ident(x) ) :: number(1.5)\n(:: (call f x) y)\n"
    );
}

#[test]
fn test_echo_shows_pipeline() {
    let output = session(&["/echo", "a b"]);
    assert_eq!(
        output,
        "echo on\ntokens: ident(a) ident(b)\ntree: (:: a b)\na b\n"
    );
}

#[test]
fn test_reload_forgets_session() {
    let output = session(&["def f() => 1", "/reload", "f()"]);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[1], "reloaded 0 startup files (0 failed)");
    assert_eq!(lines[2], "runtime error: no definition or primitive matches `f(0)`");
}

#[test]
fn test_unknown_command() {
    assert_eq!(
        session(&["/frobnicate"]),
        "usage error: unknown command `/frobnicate`, try /usage\n"
    );
}

#[test]
fn test_run_reads_until_end_of_input() {
    let mut driver = driver();
    let input = "1\n\n2\n".as_bytes();
    assert!(Repl::new(&mut driver).run(input).is_ok());
    assert_eq!(
        driver.output().captured(),
        "Chi REPL. Type /usage for commands.\n1\n2\n"
    );
}
