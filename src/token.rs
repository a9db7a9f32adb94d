use logos::Logos;

/// Tokens of the experiment-info literal.
///
/// The literal is a Python dictionary, so the token set follows Python's
/// lexical rules closely enough to find entry boundaries. Values are never
/// interpreted, only delimited.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+|#[^\n]*")]
pub enum Token {
    // ── Literals ───────────────────────────────────────────────────────
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[0-9]+", priority = 2, callback = |lex| lex.slice().parse::<u64>().ok())]
    Int(u64),

    #[regex(r#"[uUbBrR]?'([^'\\\n]|\\.)*'"#, |lex| Some(unquote(lex.slice())))]
    #[regex(r#"[uUbBrR]?"([^"\\\n]|\\.)*""#, |lex| Some(unquote(lex.slice())))]
    String(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 1, callback = |lex| Some(lex.slice().to_string()))]
    Ident(String),

    // ── Operators ──────────────────────────────────────────────────────
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token(".")]
    Dot,
    #[regex(r"[-+*/%<>!&|^~@]=?|==|\*\*|//|<<|>>", |lex| Some(lex.slice().to_string()))]
    Op(String),

    // ── Delimiters ─────────────────────────────────────────────────────
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl Token {
    /// Human-readable name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Float(_) => "float",
            Token::Int(_) => "integer",
            Token::String(_) => "string",
            Token::Ident(_) => "identifier",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::Equals => "'='",
            Token::Dot => "'.'",
            Token::Op(_) => "operator",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
        }
    }

    /// The delimiter that closes this one, if it opens a group.
    pub fn closer(&self) -> Option<Token> {
        match self {
            Token::LBrace => Some(Token::RBrace),
            Token::LParen => Some(Token::RParen),
            Token::LBracket => Some(Token::RBracket),
            _ => None,
        }
    }

    pub fn is_closer(&self) -> bool {
        matches!(self, Token::RBrace | Token::RParen | Token::RBracket)
    }
}

/// A token with its source location (byte offset span).
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Strip the prefix and quotes from a string literal and resolve escapes.
fn unquote(slice: &str) -> String {
    let prefix_len = slice.find(|c: char| c == '\'' || c == '"').unwrap_or(0);
    let raw = slice[..prefix_len].contains(|c: char| c == 'r' || c == 'R');
    let body = &slice[prefix_len + 1..slice.len() - 1];
    if raw {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other @ ('\\' | '\'' | '"')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_handles_prefix_and_escapes() {
        assert_eq!(unquote("u'abc'"), "abc");
        assert_eq!(unquote(r#""it\'s""#), "it's");
        assert_eq!(unquote(r"r'a\nb'"), r"a\nb");
        assert_eq!(unquote(r"'a\nb'"), "a\nb");
    }
}
