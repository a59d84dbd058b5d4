use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn tokenizes_keywords_and_identifiers() {
    let toks = tokenize("int main\n").unwrap();
    assert!(toks[0].is("int"));
    assert!(toks[1].is_ident());
    assert_eq!(toks[1].lexeme, "main");
    assert!(toks[2].is_eof());
}

#[test]
fn keyword_requires_non_ident_follow_byte() {
    // "intake" must lex as one identifier, not "int" + "ake".
    let toks = tokenize("intake\n").unwrap();
    assert!(toks[0].is_ident());
    assert_eq!(toks[0].lexeme, "intake");
}

#[test]
fn multi_char_punctuators_win_over_single_char() {
    let toks = tokenize("a == b\n").unwrap();
    assert!(toks[1].is("=="));
}

#[test]
fn arrow_is_a_single_token() {
    let toks = tokenize("p->x\n").unwrap();
    assert!(toks[1].is("->"));
}

#[test]
fn line_comment_is_skipped() {
    let toks = tokenize("1 // two\n3\n").unwrap();
    assert_eq!(toks[0].as_number(), Some(1));
    assert_eq!(toks[1].as_number(), Some(3));
}

#[test]
fn block_comment_is_skipped() {
    let toks = tokenize("1 /* comment\nspanning lines */ 2\n").unwrap();
    assert_eq!(toks[0].as_number(), Some(1));
    assert_eq!(toks[1].as_number(), Some(2));
}

#[test]
fn unterminated_block_comment_is_fatal() {
    let err = tokenize("1 /* oops\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedComment);
}

#[test]
fn string_literal_decodes_escapes_and_appends_nul() {
    let toks = tokenize("\"a\\nb\"\n").unwrap();
    assert_eq!(toks[0].as_string_bytes(), Some(&[b'a', b'\n', b'b', 0][..]));
}

#[test]
fn unknown_escape_keeps_the_literal_character() {
    let toks = tokenize("\"\\q\"\n").unwrap();
    assert_eq!(toks[0].as_string_bytes(), Some(&[b'q', 0][..]));
}

#[test]
fn unterminated_string_is_fatal() {
    let err = tokenize("\"abc\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedString);
}

#[test]
fn oversized_string_literal_is_fatal() {
    let huge = "a".repeat(2000);
    let src = format!("\"{huge}\"\n");
    let err = tokenize(&src).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StringTooLarge);
}

#[test]
fn unrecognized_byte_is_fatal() {
    let err = tokenize("1 @ 2\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnrecognizedByte);
}

#[test]
fn number_literal_parses_value() {
    assert_eq!(kinds("12345\n")[0], TokenKind::Number(12345));
}
