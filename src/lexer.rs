use logos::Logos;

use crate::error::{ErrorKind, GenError, Result};
use crate::token::{Spanned, Token};

/// Tokenize an experiment-info literal into a vector of spanned tokens.
pub fn lex(source: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => {
                tokens.push(Spanned { token, span });
            }
            Err(()) => {
                let fragment = &source[span.clone()];
                return Err(GenError {
                    kind: ErrorKind::UnrecognizedToken(fragment.to_string()),
                    span: Some(span),
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_default_info() {
        let tokens = lex("{'participant':'', 'session':'001'}").expect("lexing should succeed");
        let kinds: Vec<_> = tokens.iter().map(|t| &t.token).collect();

        assert_eq!(kinds[0], &Token::LBrace);
        assert!(matches!(kinds[1], Token::String(s) if s == "participant"));
        assert_eq!(kinds[2], &Token::Colon);
        assert!(matches!(kinds[3], Token::String(s) if s.is_empty()));
        assert_eq!(kinds[4], &Token::Comma);
        assert!(matches!(kinds[5], Token::String(s) if s == "session"));
        assert_eq!(kinds[6], &Token::Colon);
        assert!(matches!(kinds[7], Token::String(s) if s == "001"));
        assert_eq!(kinds[8], &Token::RBrace);
        assert_eq!(kinds.len(), 9);
    }

    #[test]
    fn lex_numbers_and_calls() {
        let tokens = lex("1.5, 42, data.getDateStr()").expect("lexing should succeed");
        let kinds: Vec<_> = tokens.iter().map(|t| &t.token).collect();
        assert_eq!(kinds[0], &Token::Float(1.5));
        assert_eq!(kinds[2], &Token::Int(42));
        assert!(matches!(kinds[4], Token::Ident(s) if s == "data"));
        assert_eq!(kinds[5], &Token::Dot);
        assert_eq!(kinds[7], &Token::LParen);
        assert_eq!(kinds[8], &Token::RParen);
    }

    #[test]
    fn lex_keyword_form() {
        let tokens = lex("participant='', session=u'001'").expect("lexing should succeed");
        assert_eq!(tokens[1].token, Token::Equals);
        assert!(matches!(&tokens[6].token, Token::String(s) if s == "001"));
    }

    #[test]
    fn lex_spans_are_byte_offsets() {
        let tokens = lex("{ 'a' : 1 }").unwrap();
        assert_eq!(tokens[1].span, 2..5);
        assert_eq!(tokens[3].span, 8..9);
    }

    #[test]
    fn lex_comments_skipped() {
        let tokens = lex("{'a': 1}  # the participant id").unwrap();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn lex_unterminated_string_fails() {
        let err = lex("{'participant: ''}").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnrecognizedToken(_)));
        assert!(err.span.is_some());
    }

    #[test]
    fn lex_unknown_character_fails() {
        let err = lex("{'a': $}").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnrecognizedToken(ref s) if s == "$"));
        assert_eq!(err.span, Some(6..7));
    }
}
