use super::*;
use logos::Logos;

fn kinds(input: &str) -> Vec<Token> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|spanned| spanned.token)
        .collect()
}

#[test]
fn test_basic_tokens() {
    let input = "
    class Point2 {
      static gtsam::Point2 Expmap(const Vector& v);
    ";
    let mut lexer = Token::lexer(input);

    assert_eq!(lexer.next(), Some(Ok(Token::KeywordClass)));
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("Point2".to_string()))));
    assert_eq!(lexer.next(), Some(Ok(Token::LBrace)));
    assert_eq!(lexer.next(), Some(Ok(Token::KeywordStatic)));
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("gtsam".to_string()))));
    assert_eq!(lexer.next(), Some(Ok(Token::Access)));
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("Point2".to_string()))));
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("Expmap".to_string()))));
    assert_eq!(lexer.next(), Some(Ok(Token::LParen)));
    assert_eq!(lexer.next(), Some(Ok(Token::KeywordConst)));
    assert_eq!(lexer.next(), Some(Ok(Token::Ident("Vector".to_string()))));
    assert_eq!(lexer.next(), Some(Ok(Token::Ampersand)));
}

#[test]
fn test_comments_are_invisible() {
    assert_eq!(
        kinds("/* a */ class /* b */ Foo { };"),
        kinds("class Foo { };")
    );
}

#[test]
fn test_multiline_comments() {
    let input = "
    /**
     * Requirements:
     *   Classes must start with an uppercase letter
     */
    class Foo; // trailing comment with /* inside
    // class Bar;
    ";
    assert_eq!(
        kinds(input),
        vec![
            Token::KeywordClass,
            Token::Ident("Foo".to_string()),
            Token::Semicolon
        ]
    );
}

#[test]
fn test_namespace_close_marker() {
    assert_eq!(
        kinds("}///\\namespace gtsam\n}///\\namespace\n} // namespace"),
        vec![
            Token::NamespaceClose(Some("gtsam".to_string())),
            Token::NamespaceClose(None),
            Token::RBrace,
        ]
    );
}

#[test]
fn test_include_line() {
    assert_eq!(
        kinds("#include <gtsam/slam/planarSLAM.h>\nnamespace planarSLAM {"),
        vec![
            Token::Include("gtsam/slam/planarSLAM.h".to_string()),
            Token::KeywordNamespace,
            Token::Ident("planarSLAM".to_string()),
            Token::LBrace,
        ]
    );
}

#[test]
fn test_literals() {
    assert_eq!(
        kinds(r#"= 1e-9 "tol""#),
        vec![
            Token::Assign,
            Token::Number("1e-9".to_string()),
            Token::String("tol".to_string()),
        ]
    );
}

#[test]
fn test_line_numbers() {
    let tokens = tokenize("class A;\n\n  class B;").unwrap();
    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[3].line, 3);
    assert_eq!(tokens[3].span, 12..17);
}

#[test]
fn test_unterminated_comment() {
    let mut lexer = Lexer::new("class A; /* never\nclosed");
    assert!(lexer.next().unwrap().is_ok());
    assert!(lexer.next().unwrap().is_ok());
    assert!(lexer.next().unwrap().is_ok());
    assert!(matches!(
        lexer.next(),
        Some(Err(LexError::UnterminatedComment { line: 1, .. }))
    ));
    assert_eq!(lexer.next(), None);
}

#[test]
fn test_stray_character() {
    let mut lexer = Lexer::new("class @ A;");

    assert!(matches!(lexer.next(), Some(Ok(Spanned { token: Token::KeywordClass, .. }))));
    assert!(matches!(lexer.next(), Some(Err(LexError::Stray { .. }))));
    assert!(matches!(lexer.next(), Some(Ok(Spanned { token: Token::Ident(_), .. }))));
}
