//! Token stream adapter
//!
//! Tokenizers hand us a flat list of [`RawToken`]s whose nesting is a bare
//! integer. [`normalize`] turns that list into typed [`Token`]s, checking on a
//! throwaway shadow stack that every close matches the innermost open.

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A token as produced by the tokenizer, before validation.
///
/// The field names follow the common flattened-tree dump format, so a JSON
/// array of these can come from any tokenizer that emits it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawToken {
    /// Tokenizer type name, e.g. `paragraph_open`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub tag: String,

    /// 1 opens, 0 stands alone, -1 closes
    #[serde(default)]
    pub nesting: i32,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub attrs: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawToken>>,

    #[serde(default)]
    pub hidden: bool,
}

impl RawToken {
    pub fn new(kind: &str, tag: &str, nesting: i32) -> Self {
        Self {
            kind: kind.to_string(),
            tag: tag.to_string(),
            nesting,
            ..Default::default()
        }
    }

    /// `<tag>_open` style token, e.g. `open("table", "table")`
    pub fn open(name: &str, tag: &str) -> Self {
        Self::new(&format!("{}_open", name), tag, 1)
    }

    pub fn close(name: &str, tag: &str) -> Self {
        Self::new(&format!("{}_close", name), tag, -1)
    }

    /// Inline token holding plain text with a single `text` child
    pub fn inline(content: &str) -> Self {
        let mut text = Self::new("text", "", 0);
        text.content = content.to_string();

        let mut token = Self::new("inline", "", 0);
        token.content = content.to_string();
        token.children = Some(vec![text]);
        token
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }
}

/// Direction of a token relative to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nesting {
    Open,
    SelfClosing,
    Close,
}

impl Nesting {
    pub fn delta(self) -> i32 {
        match self {
            Nesting::Open => 1,
            Nesting::SelfClosing => 0,
            Nesting::Close => -1,
        }
    }

    /// Short label used by the token dump
    pub fn label(self) -> &'static str {
        match self {
            Nesting::Open => "open",
            Nesting::SelfClosing => "self",
            Nesting::Close => "close",
        }
    }
}

impl TryFrom<i32> for Nesting {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Nesting::Open),
            0 => Ok(Nesting::SelfClosing),
            -1 => Ok(Nesting::Close),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Open,
    Close,
    SelfClosing,
    /// Leaf-block content; the only kind that carries children
    Inline,
    Text,
}

/// A validated, immutable token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    name: String,
    tag: String,
    nesting: Nesting,
    level: usize,
    content: String,
    attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Token>,
    hidden: bool,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Tokenizer type name, e.g. `th_open`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn nesting(&self) -> Nesting {
        self.nesting
    }

    /// Depth in the stream: number of elements open around this token
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn children(&self) -> &[Token] {
        &self.children
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_open(&self, tag: &str) -> bool {
        self.nesting == Nesting::Open && self.tag == tag
    }

    pub fn is_close(&self, tag: &str) -> bool {
        self.nesting == Nesting::Close && self.tag == tag
    }

    /// Text of an inline token with all formatting markers resolved away.
    ///
    /// Falls back to `content` when the tokenizer supplied no children.
    pub fn plain_text(&self) -> String {
        if self.children.is_empty() {
            return self.content.clone();
        }

        let mut text = String::new();
        for child in &self.children {
            match child.name.as_str() {
                "softbreak" => text.push(' '),
                "hardbreak" => text.push('\n'),
                _ if child.nesting == Nesting::SelfClosing => text.push_str(&child.content),
                _ => {}
            }
        }
        text
    }
}

/// Validate a raw token sequence and convert it into typed tokens.
///
/// Order and depth are preserved. Elements still open at the end of the
/// stream are not an error here; the tree builder and table extractor report
/// those with the element that was left open.
pub fn normalize(raw: Vec<RawToken>) -> Result<Vec<Token>> {
    let mut shadow: Vec<String> = Vec::new();
    let mut tokens = Vec::with_capacity(raw.len());

    for (position, token) in raw.into_iter().enumerate() {
        tokens.push(convert(token, position, &mut shadow, true)?);
    }

    Ok(tokens)
}

fn convert(
    raw: RawToken,
    position: usize,
    shadow: &mut Vec<String>,
    top_level: bool,
) -> Result<Token> {
    let nesting = Nesting::try_from(raw.nesting).map_err(|value| {
        RenderError::malformed(
            position,
            format!("`{}` has nesting {}, expected 1, 0 or -1", raw.kind, value),
        )
    })?;

    check_name_convention(&raw, nesting, position)?;

    let level = match nesting {
        Nesting::Open => {
            let level = shadow.len();
            shadow.push(raw.tag.clone());
            level
        }
        Nesting::Close => match shadow.pop() {
            Some(open) if open == raw.tag => shadow.len(),
            Some(open) => {
                return Err(RenderError::malformed(
                    position,
                    format!("`{}` closes <{}> but <{}> is open", raw.kind, raw.tag, open),
                ))
            }
            None => {
                return Err(RenderError::malformed(
                    position,
                    format!("`{}` closes <{}> but nothing is open", raw.kind, raw.tag),
                ))
            }
        },
        Nesting::SelfClosing => shadow.len(),
    };

    let kind = match nesting {
        Nesting::Open => TokenKind::Open,
        Nesting::Close => TokenKind::Close,
        Nesting::SelfClosing if raw.kind == "inline" => TokenKind::Inline,
        Nesting::SelfClosing if raw.kind == "text" => TokenKind::Text,
        Nesting::SelfClosing => TokenKind::SelfClosing,
    };

    let children = match raw.children {
        Some(children) if kind == TokenKind::Inline && top_level => {
            let mut inner = Vec::new();
            let mut converted = Vec::with_capacity(children.len());
            for child in children {
                converted.push(convert(child, position, &mut inner, false)?);
            }
            if let Some(open) = inner.last() {
                return Err(RenderError::malformed(
                    position,
                    format!("inline span <{}> is never closed", open),
                ));
            }
            converted
        }
        Some(children) if children.is_empty() => Vec::new(),
        Some(_) => {
            return Err(RenderError::malformed(
                position,
                format!("`{}` carries children but is not an inline token", raw.kind),
            ))
        }
        None => Vec::new(),
    };

    Ok(Token {
        kind,
        name: raw.kind,
        tag: raw.tag,
        nesting,
        level,
        content: raw.content,
        attributes: raw.attrs,
        children,
        hidden: raw.hidden,
    })
}

/// `*_open` must open and `*_close` must close; other names are free
fn check_name_convention(raw: &RawToken, nesting: Nesting, position: usize) -> Result<()> {
    let expected = if raw.kind.ends_with("_open") {
        Some(Nesting::Open)
    } else if raw.kind.ends_with("_close") {
        Some(Nesting::Close)
    } else {
        None
    };

    match expected {
        Some(expected) if expected != nesting => Err(RenderError::malformed(
            position,
            format!(
                "`{}` has nesting {} but its name says {}",
                raw.kind,
                nesting.delta(),
                expected.delta()
            ),
        )),
        _ => Ok(()),
    }
}
