use crate::ast::{RawBlockNode, Span};
use crate::delimiter::Delimiter;
use crate::tokenizer::{tokenize, Token};
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

/// Position of the parser relative to block delimiters
#[derive(Debug)]
enum State {
    /// Between blocks, accumulating freeform content
    Outside,
    /// On an opening delimiter that has not been decoded yet
    OpenDelimiter,
    /// Inside a balanced block whose closing delimiter is at `closer`
    BlockBody {
        opener: usize,
        header: Delimiter,
        closer: usize,
    },
    /// On the closing delimiter matching `opener`
    CloseDelimiter {
        opener: usize,
        header: Delimiter,
        body: Range<usize>,
    },
}

/// Parser for block-delimited post content.
///
/// Never fails: delimiters that cannot be decoded or matched are kept as
/// freeform content.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    /// Index of the closing delimiter balancing each opener, if any
    closers: Vec<Option<usize>>,
    pos: usize,
    state: State,
    freeform: Option<Range<usize>>,
    nodes: Vec<RawBlockNode>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let tokens = tokenize(source);
        let closers = match_closers(&tokens);
        Self {
            source,
            tokens,
            closers,
            pos: 0,
            state: State::Outside,
            freeform: None,
            nodes: Vec::new(),
        }
    }

    /// Parse the whole document into block nodes in document order
    pub fn parse_document(mut self) -> Vec<RawBlockNode> {
        loop {
            let state = std::mem::replace(&mut self.state, State::Outside);
            self.state = match state {
                State::Outside => match self
                    .peek()
                    .map(|(token, span)| (matches!(token, Token::OpenDelimiter(_)), span.clone()))
                {
                    None => break,
                    Some((true, _)) => State::OpenDelimiter,
                    Some((false, span)) => {
                        // Text, stray angle brackets and unmatched closers
                        self.extend_freeform(span);
                        self.advance();
                        State::Outside
                    }
                },
                State::OpenDelimiter => self.open_delimiter(),
                State::BlockBody {
                    opener,
                    header,
                    closer,
                } => {
                    let body = self.tokens[opener].1.end..self.tokens[closer].1.start;
                    self.pos = closer;
                    State::CloseDelimiter {
                        opener,
                        header,
                        body,
                    }
                }
                State::CloseDelimiter {
                    opener,
                    header,
                    body,
                } => {
                    let start = self.tokens[opener].1.start;
                    let end = self.peek_span().end;
                    self.flush_freeform();
                    self.nodes.push(RawBlockNode::block(
                        header.name,
                        &self.source[body],
                        header.attrs,
                        header.version,
                        Span::new(start, end),
                    ));
                    self.advance();
                    State::Outside
                }
            };
        }

        self.flush_freeform();
        self.nodes
    }

    fn open_delimiter(&mut self) -> State {
        let (source, span) = match self.peek() {
            Some((Token::OpenDelimiter(source), span)) => (*source, span.clone()),
            _ => return State::Outside,
        };

        match Delimiter::parse_open(source, span.start) {
            Ok(header) if header.self_closing => {
                self.flush_freeform();
                self.nodes.push(RawBlockNode::block(
                    header.name,
                    "",
                    header.attrs,
                    header.version,
                    span.into(),
                ));
                self.advance();
                State::Outside
            }
            Ok(header) => match self.closers[self.pos] {
                Some(closer) => State::BlockBody {
                    opener: self.pos,
                    header,
                    closer,
                },
                None => {
                    debug!(block = %header.name, "Unterminated block kept as freeform content");
                    self.extend_freeform(span);
                    self.advance();
                    State::Outside
                }
            },
            Err(e) => {
                debug!(error = %e, "Keeping undecodable delimiter as freeform content");
                self.extend_freeform(span);
                self.advance();
                State::Outside
            }
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_span(&self) -> Range<usize> {
        self.peek()
            .map(|(_, span)| span.clone())
            .unwrap_or(self.source.len()..self.source.len())
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn extend_freeform(&mut self, span: Range<usize>) {
        self.freeform = match self.freeform.take() {
            Some(run) => Some(run.start..span.end),
            None => Some(span),
        };
    }

    fn flush_freeform(&mut self) {
        if let Some(run) = self.freeform.take() {
            self.nodes
                .push(RawBlockNode::freeform(&self.source[run.clone()], run.into()));
        }
    }
}

/// Pair every non-void opener with the closer that balances it.
///
/// Only delimiters sharing the opener's name count towards its depth, so a
/// per-name stack finds every pair in one pass.
fn match_closers(tokens: &[(Token<'_>, Range<usize>)]) -> Vec<Option<usize>> {
    let mut closers = vec![None; tokens.len()];
    let mut open: HashMap<String, Vec<usize>> = HashMap::new();

    for (index, (token, span)) in tokens.iter().enumerate() {
        match token {
            Token::OpenDelimiter(source) if !is_void(source) => {
                if let Some(name) = Delimiter::open_name(source) {
                    open.entry(name).or_default().push(index);
                }
            }
            Token::CloseDelimiter(source) => {
                let opener = Delimiter::parse_close(source, span.start)
                    .ok()
                    .and_then(|name| open.get_mut(&name))
                    .and_then(|stack| stack.pop());
                if let Some(opener) = opener {
                    closers[opener] = Some(index);
                }
            }
            _ => {}
        }
    }
    closers
}

fn is_void(source: &str) -> bool {
    source.trim_end_matches("-->").trim_end().ends_with('/')
}

/// Parse post content into raw block nodes
pub fn parse(source: &str) -> Vec<RawBlockNode> {
    Parser::new(source).parse_document()
}
