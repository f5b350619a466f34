//! Basic tests - identifiers, literals, positions, comments

use crate::frontend::lexer::{lex, LexError, TokenTag};

#[cfg(test)]
mod lexer_basic_tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let tokens = lex("", "a.oak").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        let tokens = lex("   \t\n\r   ", "a.oak").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = lex("let x\n  y", "a.oak").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].pos.line, tokens[0].pos.column), (1, 1));
        assert_eq!((tokens[1].pos.line, tokens[1].pos.column), (1, 5));
        assert_eq!((tokens[2].pos.line, tokens[2].pos.column), (2, 3));
        assert_eq!(tokens[2].file.as_str(), "a.oak");
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = lex("let main while_ok", "a.oak").unwrap();
        assert_eq!(tokens[0].tag, TokenTag::Keyword);
        assert_eq!(tokens[1].tag, TokenTag::Ident);
        assert_eq!(tokens[2].tag, TokenTag::Ident);
    }

    #[test]
    fn test_macro_reference() {
        let tokens = lex("include!(\"a.oak\"); x != y", "a.oak").unwrap();
        assert_eq!(tokens[0].text, "include!");
        assert_eq!(tokens[0].tag, TokenTag::MacroRef);
        let ne = tokens.iter().find(|t| t.text == "!=").unwrap();
        assert_eq!(ne.tag, TokenTag::Op);
    }

    #[test]
    fn test_adjacent_not_equal_is_not_macro() {
        let tokens = lex("a!=b", "a.oak").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "!=", "b"]);
    }

    #[test]
    fn test_capture_identifier() {
        let tokens = lex("$x", "a.oak").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, TokenTag::Ident);
    }

    #[test]
    fn test_numbers_keep_suffix() {
        let tokens = lex("123 0xFF 1.5f32 123z", "a.oak").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["123", "0xFF", "1.5f32", "123z"]);
        assert!(tokens.iter().all(|t| t.tag == TokenTag::Number));
    }

    #[test]
    fn test_member_access_after_number_is_not_float() {
        let tokens = lex("a.b", "a.oak").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", ".", "b"]);
    }

    #[test]
    fn test_strings_keep_quotes_and_escapes() {
        let tokens = lex(r#""a \"b\"" 'c'"#, "a.oak").unwrap();
        assert_eq!(tokens[0].text, r#""a \"b\"""#);
        assert_eq!(tokens[0].tag, TokenTag::Str);
        assert_eq!(tokens[1].text, "'c'");
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("\"abc", "a.oak").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = lex("a // line\n/* block\n */ b", "a.oak").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(tokens[1].pos.line, 3);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = lex("a /* never", "a.oak").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("a # b", "a.oak").unwrap_err();
        match err {
            LexError::UnexpectedChar { ch, location } => {
                assert_eq!(ch, '#');
                assert_eq!(location.pos.column, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
