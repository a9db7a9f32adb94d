//! Parser for the "Experiment info" parameter.
//!
//! The parameter mixes structured keys with free-form code values, so the
//! only check possible at generation time is that it reads as a dictionary
//! literal. Three spellings are accepted:
//!
//! - a braced literal: `{'participant': '', 'session': '001'}`
//! - keyword arguments, as passed to `dict(...)`: `participant='', session='001'`
//! - bare pairs: `participant: '', session: '001'`
//!
//! Values are delimited (brackets must balance) but never interpreted; the
//! original source text of each value is kept for emission.

use indexmap::IndexMap;

use crate::error::{GenError, Result};
use crate::lexer;
use crate::param::py_repr;
use crate::token::{Spanned, Token};

/// A parsed experiment-info literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpInfo {
    /// Key → source text of the value expression, in declaration order.
    pub entries: IndexMap<String, String>,
    /// Trimmed source, kept verbatim for braced literals.
    source: String,
    braced: bool,
}

impl ExpInfo {
    /// Parse the parameter text. Empty text is an empty dictionary.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = lexer::lex(source)?;
        let mut parser = Parser::new(source, tokens);
        parser.parse()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first of `candidates` present as a key.
    pub fn first_key_of<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|k| self.contains_key(k))
    }

    /// Render as a braced dictionary literal.
    ///
    /// Braced input is reproduced as written; the other spellings are
    /// rebuilt from their entries.
    pub fn to_literal(&self) -> String {
        if self.braced {
            return self.source.clone();
        }
        let body: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}: {}", py_repr(k), v))
            .collect();
        format!("{{{}}}", body.join(", "))
    }
}

/// Recursive descent parser over the info literal's tokens.
struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, tokens: Vec<Spanned>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_spanned(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.peek_spanned() {
            Some(s) if &s.token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(s) => Err(GenError::unexpected_token(
                expected.describe(),
                s.token.describe(),
                s.span.clone(),
            )),
            None => Err(GenError::unexpected_eof(expected.describe())),
        }
    }

    fn unexpected(&self, expected: &str) -> GenError {
        match self.peek_spanned() {
            Some(s) => GenError::unexpected_token(expected, s.token.describe(), s.span.clone()),
            None => GenError::unexpected_eof(expected),
        }
    }

    // ── Grammar ────────────────────────────────────────────────────────

    fn parse(&mut self) -> Result<ExpInfo> {
        let braced = self.at(&Token::LBrace);
        if braced {
            self.pos += 1;
        }

        let closer = if braced { Some(Token::RBrace) } else { None };
        let mut entries = IndexMap::new();

        loop {
            if self.peek() == closer.as_ref() {
                break;
            }
            let (key, value) = self.parse_entry(braced)?;
            entries.insert(key, value);

            if self.at(&Token::Comma) {
                self.pos += 1;
                continue;
            }
            if self.peek() == closer.as_ref() {
                break;
            }
            return Err(self.unexpected(if braced { "',' or '}'" } else { "','" }));
        }

        if let Some(closer) = &closer {
            self.expect(closer)?;
        }
        if let Some(extra) = self.peek_spanned() {
            return Err(GenError::unexpected_token(
                "end of input",
                extra.token.describe(),
                extra.span.clone(),
            ));
        }

        Ok(ExpInfo {
            entries,
            source: self.source.trim().to_string(),
            braced,
        })
    }

    fn parse_entry(&mut self, braced: bool) -> Result<(String, String)> {
        let key = match self.peek().cloned() {
            Some(Token::String(s)) => s,
            Some(Token::Int(n)) => n.to_string(),
            Some(Token::Ident(name)) if !braced => name,
            _ => return Err(self.unexpected("string key")),
        };
        let keyword = matches!(self.peek(), Some(Token::Ident(_)));
        self.pos += 1;

        match self.peek() {
            Some(Token::Colon) => self.pos += 1,
            Some(Token::Equals) if keyword => self.pos += 1,
            _ => return Err(self.unexpected("':'")),
        }

        let value = self.parse_value()?;
        Ok((key, value))
    }

    /// Consume one value expression: every token up to the next top-level
    /// `,` or closing delimiter, with nested groups balanced.
    fn parse_value(&mut self) -> Result<String> {
        let start = match self.peek_spanned() {
            Some(s) if s.token != Token::Comma && !s.token.is_closer() => s.span.start,
            _ => return Err(self.unexpected("value")),
        };
        let mut end = start;
        let mut open: Vec<Token> = Vec::new();

        while let Some(s) = self.peek_spanned() {
            let token = s.token.clone();
            let span = s.span.clone();

            if open.is_empty() && (token == Token::Comma || token.is_closer()) {
                break;
            }
            if open.is_empty() && matches!(token, Token::Colon | Token::Equals) {
                return Err(GenError::unexpected_token("','", token.describe(), span));
            }

            if let Some(closer) = token.closer() {
                open.push(closer);
            } else if token.is_closer() {
                match open.pop() {
                    Some(expected) if expected == token => {}
                    Some(expected) => {
                        return Err(GenError::unexpected_token(
                            expected.describe(),
                            token.describe(),
                            span,
                        ))
                    }
                    None => unreachable!("top-level closers end the value"),
                }
            }

            end = span.end;
            self.pos += 1;
        }

        if let Some(unclosed) = open.last() {
            return Err(GenError::unexpected_eof(unclosed.describe()));
        }

        Ok(self.source[start..end].to_string())
    }
}
