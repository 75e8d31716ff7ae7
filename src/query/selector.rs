//! The structural selector language.
//!
//! ```text
//! selector  := compound ("," compound)*
//! compound  := (kind | "*") qualifier*
//! qualifier := "[" attr "=" value "]" | ":has(" selector ")"
//! ```
//!
//! Kinds are tree-sitter node kinds (`import_statement`, `tag_name`, ...).
//! Values may be bare or quoted with `"` or `'`.

use crate::query::errors::SelectorError;
use crate::syntax::NodeRef;
use std::fmt;
use std::str::FromStr;

/// A union of compound selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    kind: Option<String>,
    attrs: Vec<(String, String)>,
    has: Vec<Selector>,
}

impl Compound {
    fn new(kind: &str) -> Self {
        Self {
            kind: (kind != "*").then(|| kind.to_string()),
            attrs: Vec::new(),
            has: Vec::new(),
        }
    }

    fn matches(&self, node: NodeRef<'_>) -> bool {
        if !node.is_named() {
            return false;
        }
        if let Some(kind) = &self.kind {
            if node.kind() != kind {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|(attr, value)| attribute(node, attr) == Some(value.as_str()))
            && self
                .has
                .iter()
                .all(|inner| node.descendants().any(|d| inner.matches(d)))
    }
}

/// Value of a selector attribute on `node`.
///
/// `text` is the raw node text, `value` the literal value, `name` the `name`
/// field (or the node's own text when it has none). Any other attribute
/// names a grammar field.
pub fn attribute<'a>(node: NodeRef<'a>, attr: &str) -> Option<&'a str> {
    match attr {
        "text" => Some(node.text()),
        "value" => Some(node.literal_value()),
        "name" => Some(
            node.child_by_field("name")
                .map_or_else(|| node.text(), |name| name.literal_value()),
        ),
        field => node.child_by_field(field).map(|child| child.literal_value()),
    }
}

impl Selector {
    /// Nodes of `kind`; `"*"` matches any named node.
    pub fn kind(kind: &str) -> Self {
        Self {
            alternatives: vec![Compound::new(kind)],
        }
    }

    pub fn any() -> Self {
        Self::kind("*")
    }

    /// Require `attr == value` on the last alternative.
    pub fn with_attr(mut self, attr: &str, value: &str) -> Self {
        if let Some(last) = self.alternatives.last_mut() {
            last.attrs.push((attr.to_string(), value.to_string()));
        }
        self
    }

    /// Require a strict descendant matching `inner` on the last alternative.
    pub fn has(mut self, inner: Selector) -> Self {
        if let Some(last) = self.alternatives.last_mut() {
            last.has.push(inner);
        }
        self
    }

    /// Union with another selector.
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(node))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parser = SelectorParser {
            chars: input.char_indices().collect(),
            pos: 0,
        };
        if parser.at_end() {
            return Err(SelectorError::Empty);
        }
        let selector = parser.selector()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(selector),
            Some((pos, found)) => Err(SelectorError::UnexpectedChar { pos, found }),
        }
    }
}

struct SelectorParser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl SelectorParser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.peek();
        self.pos += 1;
        next
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.peek().is_none()
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some((_, c)) if c == want => Ok(()),
            Some((pos, found)) => Err(SelectorError::UnexpectedChar { pos, found }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn selector(&mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = vec![self.compound()?];
        loop {
            self.skip_ws();
            if self.peek().is_some_and(|(_, c)| c == ',') {
                self.pos += 1;
                alternatives.push(self.compound()?);
            } else {
                return Ok(Selector { alternatives });
            }
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        self.skip_ws();
        let kind = match self.peek() {
            Some((_, '*')) => {
                self.pos += 1;
                "*".to_string()
            }
            _ => self.ident()?,
        };
        let mut compound = Compound::new(&kind);

        loop {
            match self.peek() {
                Some((_, '[')) => {
                    self.pos += 1;
                    self.skip_ws();
                    let attr = self.ident()?;
                    self.skip_ws();
                    self.expect('=')?;
                    self.skip_ws();
                    let value = self.value()?;
                    self.skip_ws();
                    self.expect(']')?;
                    compound.attrs.push((attr, value));
                }
                Some((_, ':')) => {
                    self.pos += 1;
                    let name = self.ident()?;
                    if name != "has" {
                        return Err(SelectorError::UnknownPseudo { name });
                    }
                    self.expect('(')?;
                    let inner = self.selector()?;
                    self.skip_ws();
                    self.expect(')')?;
                    compound.has.push(inner);
                }
                _ => return Ok(compound),
            }
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some((_, c)) = self.peek() {
            if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if !ident.is_empty() {
            return Ok(ident);
        }
        match self.peek() {
            Some((pos, found)) => Err(SelectorError::UnexpectedChar { pos, found }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some((_, quote @ ('"' | '\''))) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some((_, c)) if c == quote => return Ok(value),
                        Some((_, c)) => value.push(c),
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
            }
            _ => {
                let mut value = String::new();
                while let Some((_, c)) = self.peek() {
                    if c == ']' {
                        break;
                    }
                    value.push(c);
                    self.pos += 1;
                }
                Ok(value.trim_end().to_string())
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, alt) in self.alternatives.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", alt.kind.as_deref().unwrap_or("*"))?;
            for (attr, value) in &alt.attrs {
                if !value.is_empty() && value.chars().all(is_ident_char) {
                    write!(f, "[{attr}={value}]")?;
                } else if value.contains('"') {
                    write!(f, "[{attr}='{value}']")?;
                } else {
                    write!(f, "[{attr}=\"{value}\"]")?;
                }
            }
            for inner in &alt.has {
                write!(f, ":has({inner})")?;
            }
        }
        Ok(())
    }
}
