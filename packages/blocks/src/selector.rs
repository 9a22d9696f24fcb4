//! A small CSS selector subset for locating attribute values in content.
//!
//! Supported: type selectors, `*`, `.class`, `#id`, `[attr]`, `[attr=value]`,
//! descendant and `>` child combinators, and `,` separated groups.

use crate::content::{element_attribute, element_name};
use crate::error::SelectorError;
use markup5ever_rcdom::Handle;

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    groups: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut cursor = Cursor { source, pos: 0 };
        cursor.skip_whitespace();
        if cursor.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut groups = vec![cursor.complex()?];
        while cursor.eat(',') {
            cursor.skip_whitespace();
            groups.push(cursor.complex()?);
        }

        match cursor.peek() {
            None => Ok(Self {
                source: source.to_string(),
                groups,
            }),
            Some(c) => Err(SelectorError::unexpected_char(source, cursor.pos, c)),
        }
    }

    /// Selector matching any element
    pub fn universal() -> Self {
        Self {
            source: "*".to_string(),
            groups: vec![ComplexSelector {
                compounds: vec![Compound::default()],
                combinators: Vec::new(),
            }],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `element` matches, given its ancestors from outermost to
    /// innermost.
    pub(crate) fn matches(&self, element: &Handle, ancestors: &[Handle]) -> bool {
        self.groups
            .iter()
            .any(|group| group.matches_at(group.compounds.len() - 1, element, ancestors))
    }
}

impl ComplexSelector {
    fn matches_at(&self, index: usize, element: &Handle, ancestors: &[Handle]) -> bool {
        if !self.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => self.matches_at(index - 1, parent, rest),
                None => false,
            },
            Combinator::Descendant => (0..ancestors.len())
                .rev()
                .any(|i| self.matches_at(index - 1, &ancestors[i], &ancestors[..i])),
        }
    }
}

impl Compound {
    fn matches(&self, element: &Handle) -> bool {
        let name = match element_name(element) {
            Some(name) => name,
            None => return false,
        };

        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(&name) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element_attribute(element, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class = element_attribute(element, "class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|wanted| class.split_ascii_whitespace().any(|token| token == wanted))
            {
                return false;
            }
        }

        self.attributes.iter().all(|(attr, expected)| {
            match (element_attribute(element, attr), expected) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == *expected,
                (None, _) => false,
            }
        })
    }
}

struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(c) => SelectorError::unexpected_char(self.source, self.pos, c),
            None => SelectorError::unexpected_end(self.source),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '-' || c == '_') {
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                }
                None | Some(',') => break,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();

        if self.eat('*') {
            // universal, no tag constraint
        } else if matches!(self.peek(), Some(c) if c.is_alphanumeric()) {
            compound.tag = Some(self.ident()?);
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<(String, Option<String>), SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let value = if self.eat('=') {
            self.skip_whitespace();
            let value = match self.peek() {
                Some(quote @ ('"' | '\'')) => {
                    self.bump();
                    let start = self.pos;
                    while matches!(self.peek(), Some(c) if c != quote) {
                        self.bump();
                    }
                    let value = self.source[start..self.pos].to_string();
                    if !self.eat(quote) {
                        return Err(self.unexpected());
                    }
                    value
                }
                _ => self.ident()?,
            };
            self.skip_whitespace();
            Some(value)
        } else {
            None
        };

        if !self.eat(']') {
            return Err(self.unexpected());
        }
        Ok((name, value))
    }
}
