use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).tokens.iter().map(|t| t.kind).collect()
}

fn pos(line: u32, column: u32) -> Position {
    Position::new(line, column).unwrap()
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        kinds("finally throw as if true false null iffy $x _y"),
        vec![
            TokenKind::Finally,
            TokenKind::Throw,
            TokenKind::As,
            TokenKind::If,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_operators_longest_match() {
    assert_eq!(
        kinds("|| | && & >>> >> >= > << <= < == != => !"),
        vec![
            TokenKind::OrOr,
            TokenKind::Pipe,
            TokenKind::AndAnd,
            TokenKind::Amp,
            TokenKind::Ushr,
            TokenKind::Shr,
            TokenKind::Ge,
            TokenKind::Gt,
            TokenKind::Shl,
            TokenKind::Le,
            TokenKind::Lt,
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::Arrow,
            TokenKind::Bang,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_numeric_literals() {
    let lexed = tokenize("123L 0x1F 017 0 3.14f 2.5 1e10 .5d 7f");
    let tokens: Vec<_> = lexed.tokens.iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::IntLiteral, "123L"),
            (TokenKind::IntLiteral, "0x1F"),
            (TokenKind::IntLiteral, "017"),
            (TokenKind::IntLiteral, "0"),
            (TokenKind::FloatLiteral, "3.14f"),
            (TokenKind::FloatLiteral, "2.5"),
            (TokenKind::FloatLiteral, "1e10"),
            (TokenKind::FloatLiteral, ".5d"),
            (TokenKind::FloatLiteral, "7f"),
            (TokenKind::Eof, ""),
        ]
    );
    assert!(lexed.diagnostics.is_empty());
}

#[test]
fn test_string_and_char_literals() {
    let lexed = tokenize(r#""a\"b" 'single' '\101'c 'x'c"#);
    let tokens: Vec<_> = lexed.tokens.iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::StringLiteral, r#""a\"b""#),
            (TokenKind::StringLiteral, "'single'"),
            (TokenKind::CharLiteral, r"'\101'c"),
            (TokenKind::CharLiteral, "'x'c"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn test_positions_are_line_and_char_column() {
    let lexed = tokenize("a &&\n  \"ä\" == b");
    let positions: Vec<_> = lexed.tokens.iter().map(|t| t.position).collect();
    assert_eq!(
        positions,
        vec![pos(1, 0), pos(1, 2), pos(2, 2), pos(2, 6), pos(2, 9), pos(2, 10)]
    );
}

#[test]
fn test_origin_rebases_positions() {
    let lexed = Lexer::new("x >\n y").with_origin(pos(10, 4)).tokenize();
    let positions: Vec<_> = lexed.tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![pos(10, 4), pos(10, 6), pos(11, 1), pos(11, 2)]);
}

#[test]
fn test_unrecognized_input_is_reported_and_skipped() {
    let lexed = tokenize("a # b");
    let kinds: Vec<_> = lexed.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
    );
    assert_eq!(lexed.diagnostics.len(), 1);
    assert_eq!(
        lexed.diagnostics[0].to_string(),
        "1:2: token recognition error at: '#'"
    );
}

#[test]
fn test_eof_display_text() {
    let lexed = tokenize("");
    assert_eq!(lexed.tokens.len(), 1);
    assert_eq!(lexed.tokens[0].display_text(), "<EOF>");
    assert_eq!(lexed.tokens[0].position, Position::START);
}
