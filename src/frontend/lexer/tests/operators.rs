//! Operator tests - maximal munch

use crate::frontend::lexer::{lex, TokenTag};

#[cfg(test)]
mod lexer_operator_tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        lex(source, "ops.oak")
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            texts("-> == <= >= && || << >> += -= *= /= %= &= |="),
            vec!["->", "==", "<=", ">=", "&&", "||", "<<", ">>", "+=", "-=", "*=", "/=", "%=", "&=", "|="]
        );
    }

    #[test]
    fn test_maximal_munch_without_spaces() {
        assert_eq!(texts("a<=b"), vec!["a", "<=", "b"]);
        assert_eq!(texts("a->b"), vec!["a", "->", "b"]);
        assert_eq!(texts("x+=1"), vec!["x", "+=", "1"]);
    }

    #[test]
    fn test_increment_lexes_as_one_token() {
        assert_eq!(texts("i++"), vec!["i", "++"]);
    }

    #[test]
    fn test_prefix_markers() {
        let tokens = lex("^x @p", "ops.oak").unwrap();
        assert_eq!(tokens[0].tag, TokenTag::Op);
        assert_eq!(tokens[2].text, "@");
    }

    #[test]
    fn test_punctuation() {
        let tokens = lex("(){}[],;:", "ops.oak").unwrap();
        assert_eq!(tokens.len(), 9);
        assert!(tokens.iter().all(|t| t.tag == TokenTag::Punct));
    }
}
