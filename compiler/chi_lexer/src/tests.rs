use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str, symbols: &SymbolTable) -> Vec<TokenKind> {
    lex(source, symbols).tokens.into_iter().map(|t| t.kind).collect()
}

fn num(text: &str) -> TokenKind {
    TokenKind::Number(text.parse().unwrap_or_default())
}

#[test]
fn test_lex_definition() {
    let symbols = SymbolTable::new();
    let fact = symbols.intern("fact");
    let n = symbols.intern("n");

    assert_eq!(
        kinds("def fact(n) => n", &symbols),
        vec![
            TokenKind::Def,
            TokenKind::Ident(fact),
            TokenKind::LParen,
            TokenKind::Ident(n),
            TokenKind::RParen,
            TokenKind::FatArrow,
            TokenKind::Ident(n),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_numbers() {
    let symbols = SymbolTable::new();
    assert_eq!(
        kinds("42 -7 +3 1.25", &symbols),
        vec![num("42"), num("-7"), num("3"), num("1.25"), TokenKind::Eof]
    );
}

#[test]
fn test_operator_names_are_identifiers() {
    let symbols = SymbolTable::new();
    let tokens = kinds("++ -- - + is-empty?", &symbols);

    let names: Vec<String> = tokens
        .iter()
        .filter_map(|kind| match kind {
            TokenKind::Ident(name) => Some(symbols.text(*name).to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["++", "--", "-", "+", "is-empty?"]);
}

#[test]
fn test_sign_before_digit_is_a_number() {
    let symbols = SymbolTable::new();
    let minus = symbols.intern("-");
    assert_eq!(
        kinds("- 1 -1", &symbols),
        vec![TokenKind::Ident(minus), num("1"), num("-1"), TokenKind::Eof]
    );
}

#[test]
fn test_punctuation_and_keywords() {
    let symbols = SymbolTable::new();
    assert_eq!(
        kinds("close _ with ($ = nil) :: { } . [ ] ; , test module set var if then else", &symbols),
        vec![
            TokenKind::Close,
            TokenKind::Underscore,
            TokenKind::With,
            TokenKind::LParen,
            TokenKind::Dollar,
            TokenKind::Eq,
            TokenKind::Nil,
            TokenKind::RParen,
            TokenKind::ColonColon,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Dot,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Test,
            TokenKind::Module,
            TokenKind::Set,
            TokenKind::Var,
            TokenKind::If,
            TokenKind::Then,
            TokenKind::Else,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    let symbols = SymbolTable::new();
    let x = symbols.intern("x");
    assert_eq!(
        kinds("# heading\nx # trailing\n", &symbols),
        vec![TokenKind::Ident(x), TokenKind::Eof]
    );
}

#[test]
fn test_member_access_splits_on_dot() {
    let symbols = SymbolTable::new();
    let x = symbols.intern("x");
    let a = symbols.intern("a");
    assert_eq!(
        kinds("x.a", &symbols),
        vec![TokenKind::Ident(x), TokenKind::Dot, TokenKind::Ident(a), TokenKind::Eof]
    );
}

#[test]
fn test_spans() {
    let symbols = SymbolTable::new();
    let tokens = lex("var(x)", &symbols);
    assert_eq!(tokens.tokens[0].span, Span::new(0, 3));
    assert_eq!(tokens.tokens[2].span, Span::new(4, 5));
    assert_eq!(tokens.tokens[4].span, Span::new(6, 6));
}

#[test]
fn test_tokenize_reports_bad_input() {
    let symbols = SymbolTable::new();
    let error = Lexer::new("x @ y", &symbols).tokenize();
    assert_eq!(
        error,
        Err(LexError {
            text: "@".to_owned(),
            span: Span::new(2, 3),
        })
    );
}
