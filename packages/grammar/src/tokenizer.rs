use logos::Logos;
use std::fmt;

/// Token types for stored post content.
///
/// Only block delimiters are recognized; everything else is opaque text. A
/// delimiter that fails to match falls back to `LAngle` followed by text, so
/// every byte of the input belongs to exactly one token.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // <!-- wp:core/paragraph v=2 {"align":"left"} --> and the void form ending in /-->
    #[regex(
        r"<!--[ \t\r\n]+(wp:[a-z][a-z0-9_-]*(/[a-z][a-z0-9_-]*)?|[a-z][a-z0-9_-]*/[a-z][a-z0-9_-]*)([ \t\r\n]([^-]|-[^-])*)?-->",
        |lex| lex.slice()
    )]
    OpenDelimiter(&'src str),

    // <!-- /wp:core/paragraph -->
    #[regex(
        r"<!--[ \t\r\n]+/(wp:[a-z][a-z0-9_-]*(/[a-z][a-z0-9_-]*)?|[a-z][a-z0-9_-]*/[a-z][a-z0-9_-]*)[ \t\r\n]+-->",
        |lex| lex.slice()
    )]
    CloseDelimiter(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    #[token("<")]
    LAngle,
}

impl<'src> Token<'src> {
    /// Whether the token starts or ends a block.
    pub fn is_delimiter(&self) -> bool {
        matches!(self, Token::OpenDelimiter(_) | Token::CloseDelimiter(_))
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenDelimiter(s) => write!(f, "opening delimiter {}", s),
            Token::CloseDelimiter(s) => write!(f, "closing delimiter {}", s),
            Token::Text(s) => write!(f, "text '{}'", s),
            Token::LAngle => write!(f, "<"),
        }
    }
}

/// Tokenize a source string
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => (token, span),
            // Unreachable with the patterns above, but keep the bytes as text
            Err(()) => (Token::Text(&source[span.clone()]), span),
        })
        .collect()
}
