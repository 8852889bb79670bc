//! CSS selector subset used by the simulated application.
//!
//! Supported grammar:
//!
//! ```text
//! list      := complex ( "," complex )*
//! complex   := compound ( ( " " | ">" ) compound )*
//! compound  := ( tag | "*" )? ( "." class | "#" id | "[" attr "]" )*
//! attr      := name ( ( "=" | "~=" | "^=" | "$=" | "*=" ) value )?
//! value     := ident | '...' | "..."
//! ```
//!
//! Pseudo-classes are rejected.

use super::dom::{Document, NodeId};
use std::str::FromStr;
use thiserror::Error;

/// Selector text that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {selector:?} at {position}: {reason}")]
pub struct SelectorError {
    /// Selector text
    pub selector: String,
    /// Character offset of the problem
    pub position: usize,
    /// What went wrong
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    Prefix,
    Suffix,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrTest {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let v = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == v,
            AttrOp::Includes => actual.split_whitespace().any(|w| w == v),
            AttrOp::Prefix => !v.is_empty() && actual.starts_with(v),
            AttrOp::Suffix => !v.is_empty() && actual.ends_with(v),
            AttrOp::Contains => !v.is_empty() && actual.contains(v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(node) = doc.node(id) else {
            return false;
        };
        if self.tag.as_ref().is_some_and(|t| *t != node.tag) {
            return false;
        }
        self.ids.iter().all(|i| node.attr("id") == Some(i.as_str()))
            && self.classes.iter().all(|c| node.has_class(c))
            && self.attrs.iter().all(|a| a.matches(node.attr(&a.name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    // combinators[i] joins compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.match_at(doc, self.compounds.len() - 1, id)
    }

    fn match_at(&self, doc: &Document, idx: usize, id: NodeId) -> bool {
        if !self.compounds[idx].matches(doc, id) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .node(id)
                .and_then(|n| n.parent)
                .is_some_and(|p| self.match_at(doc, idx - 1, p)),
            Combinator::Descendant => doc.ancestors(id).any(|a| self.match_at(doc, idx - 1, a)),
        }
    }
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse selector text
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        Parser::new(text).parse_list()
    }

    /// Whether the node matches any alternative
    #[must_use]
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, id))
    }

    /// All matching nodes in document order
    #[must_use]
    pub fn select(&self, doc: &Document) -> Vec<NodeId> {
        doc.walk()
            .into_iter()
            .filter(|&id| self.matches(doc, id))
            .collect()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectorError {
        SelectorError {
            selector: self.text.to_string(),
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_list(mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.eat(',') {
            alternatives.push(self.parse_complex()?);
        }
        if let Some(c) = self.peek() {
            return Err(self.error(format!("unexpected {c:?}")));
        }
        Ok(Selector { alternatives })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = if self.eat('>') {
                self.skip_ws();
                Combinator::Child
            } else if had_ws && !matches!(self.peek(), None | Some(',')) {
                Combinator::Descendant
            } else {
                break;
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let universal = self.eat('*');
        if !universal && self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attr()?);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attr(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrTest {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.pos += 1;
                if !self.eat('=') {
                    return Err(self.error("expected '='"));
                }
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Contains,
                }
            }
            _ => return Err(self.error("expected an attribute operator")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.quoted(q)?
            }
            _ => self.ident()?,
        };
        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(AttrTest { name, op, value })
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => {
                            out.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.error("dangling escape")),
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sim::dom::El;
    use proptest::prelude::*;

    fn page() -> Document {
        let mut doc = Document::new("Event");
        let root = doc.root();
        let header = doc.append(root, El::new("header").class("header"));
        let logout = doc.append(
            header,
            El::new("form").attr("action", "/logout").attr("method", "POST"),
        );
        doc.append(logout, El::new("button").attr("type", "submit").text("Log out"));

        let main = doc.append(root, El::new("main"));
        let register = doc.append(
            main,
            El::new("form").attr("action", "/events/3/register").attr("method", "POST"),
        );
        doc.append(register, El::new("button").attr("type", "submit").text("Register"));
        let unregister = doc.append(
            main,
            El::new("form").attr("action", "/events/3/unregister").attr("method", "POST"),
        );
        doc.append(unregister, El::new("button").attr("type", "submit").text("Unregister"));
        doc.append(main, El::new("h1").class("event-title").attr("id", "title"));
        doc
    }

    fn texts(doc: &Document, selector: &str) -> Vec<String> {
        Selector::parse(selector)
            .unwrap()
            .select(doc)
            .into_iter()
            .map(|id| doc.text_content(id))
            .collect()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_accepts_suite_selectors() {
            for s in [
                "button[type='submit']",
                ".event-card .event-title",
                ".event-title, h1",
                "a[href*='register']",
                "form[action$='/unregister'] button",
                "header > .auth-buttons a",
                "*",
                "#title",
                "[name=\"email\"]",
            ] {
                assert!(Selector::parse(s).is_ok(), "{s}");
            }
        }

        #[test]
        fn test_rejects_malformed() {
            for s in ["", "a[href", "a:hover", ".", "a,", "[x^y]", "a[href='x]"] {
                assert!(Selector::parse(s).is_err(), "{s}");
            }
        }

        #[test]
        fn test_error_reports_position() {
            let err = Selector::parse("a:first-child").unwrap_err();
            assert_eq!(err.position, 1);
            assert!(err.to_string().contains("pseudo"));
        }
    }

    mod match_tests {
        use super::*;

        #[test]
        fn test_contains_matches_both_register_forms() {
            let doc = page();
            assert_eq!(
                texts(&doc, "form[action*='register'] button"),
                vec!["Register", "Unregister"]
            );
        }

        #[test]
        fn test_suffix_separates_register_from_unregister() {
            let doc = page();
            assert_eq!(texts(&doc, "form[action$='/register'] button"), vec!["Register"]);
            assert_eq!(texts(&doc, "form[action$='/unregister'] button"), vec!["Unregister"]);
        }

        #[test]
        fn test_list_keeps_document_order() {
            let doc = page();
            let all = texts(&doc, "main button, header button");
            assert_eq!(all, vec!["Log out", "Register", "Unregister"]);
        }

        #[test]
        fn test_child_combinator() {
            let doc = page();
            assert_eq!(texts(&doc, "header > form > button").len(), 1);
            assert!(texts(&doc, "header > button").is_empty());
        }

        #[test]
        fn test_id_and_class() {
            let doc = page();
            assert_eq!(texts(&doc, "h1#title.event-title").len(), 1);
            assert!(texts(&doc, "h1#other").is_empty());
        }

        #[test]
        fn test_empty_prefix_matches_nothing() {
            let doc = page();
            assert!(texts(&doc, "form[action^='']").is_empty());
        }
    }

    proptest! {
        #[test]
        fn prop_class_chain_parses(classes in prop::collection::vec("[a-z][a-z0-9-]{0,8}", 1..4)) {
            let text = format!(".{}", classes.join("."));
            prop_assert!(Selector::parse(&text).is_ok());
        }

        #[test]
        fn prop_list_is_union(a in "(h1|button|form|main|header)", b in "(h1|button|form|main|header)") {
            let doc = page();
            let left = Selector::parse(&a).unwrap().select(&doc);
            let right = Selector::parse(&b).unwrap().select(&doc);
            let both = Selector::parse(&format!("{a}, {b}")).unwrap().select(&doc);
            for id in &both {
                prop_assert!(left.contains(id) || right.contains(id));
            }
            for id in left.iter().chain(&right) {
                prop_assert!(both.contains(id));
            }
        }
    }
}
