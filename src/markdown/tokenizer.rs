//! Tokenizer service backed by pulldown-cmark
//!
//! pulldown-cmark reports start/end events with inline content interleaved.
//! [`PulldownTokenizer`] regroups them into the flattened token layout the
//! rest of the pipeline expects: every leaf block owns a single `inline`
//! token, tables get explicit header/body sections and per-cell alignment
//! hints.

use super::token::RawToken;
use pulldown_cmark::{
    Alignment as CmarkAlignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd,
};
use serde::{Deserialize, Serialize};

/// Grammar extensions switched on for a parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    #[serde(default = "default_true")]
    pub table: bool,

    #[serde(default = "default_true")]
    pub strikethrough: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            table: true,
            strikethrough: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Anything that can turn markup text into a raw token sequence
pub trait Tokenizer {
    fn tokenize(&self, source: &str) -> Vec<RawToken>;
}

#[derive(Debug, Clone, Default)]
pub struct PulldownTokenizer {
    options: TokenizerOptions,
}

impl PulldownTokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Self { options }
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.table {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.options.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        options
    }
}

impl Tokenizer for PulldownTokenizer {
    fn tokenize(&self, source: &str) -> Vec<RawToken> {
        let mut sink = TokenSink::default();
        for event in Parser::new_ext(source, self.parser_options()) {
            sink.push(event);
        }
        sink.finish()
    }
}

/// Inline children collected for the leaf block currently open
#[derive(Default)]
struct InlineBuffer {
    children: Vec<RawToken>,
    /// Set while inside an image: alt text goes here instead of `children`
    image: Option<RawToken>,
    /// Images opened inside the alt text of `image`; their text joins its alt
    nested_images: usize,
}

impl InlineBuffer {
    fn push(&mut self, token: RawToken) {
        if let Some(image) = self.image.as_mut() {
            image.content.push_str(&token.content);
            return;
        }

        // pulldown-cmark splits text runs at every special character
        if token.kind == "text" {
            if let Some(last) = self.children.last_mut() {
                if last.kind == "text" {
                    last.content.push_str(&token.content);
                    return;
                }
            }
        }
        self.children.push(token);
    }

    fn into_token(self) -> RawToken {
        let mut children = self.children;
        if let Some(image) = self.image {
            children.push(image);
        }

        let mut content = String::new();
        for child in &children {
            match child.kind.as_str() {
                "softbreak" => content.push(' '),
                "hardbreak" => content.push('\n'),
                _ if child.nesting == 0 => content.push_str(&child.content),
                _ => {}
            }
        }

        let mut token = RawToken::new("inline", "", 0);
        token.content = content;
        token.children = Some(children);
        token
    }
}

#[derive(Default)]
struct TableState {
    alignments: Vec<CmarkAlignment>,
    in_head: bool,
    body_open: bool,
    cell: usize,
}

#[derive(Default)]
struct TokenSink {
    tokens: Vec<RawToken>,
    inline: Option<InlineBuffer>,
    /// Tight list items have no paragraph events; one is synthesized and marked hidden
    implicit_paragraph: bool,
    /// Fenced/indented code or raw HTML being accumulated into one token
    literal: Option<RawToken>,
    table: TableState,
}

impl TokenSink {
    fn push(&mut self, event: Event<'_>) {
        if let Some(literal) = self.literal.as_mut() {
            match &event {
                Event::Text(text) | Event::Html(text) => {
                    literal.content.push_str(text);
                    return;
                }
                Event::End(TagEnd::CodeBlock) | Event::End(TagEnd::HtmlBlock) => {
                    if let Some(literal) = self.literal.take() {
                        self.tokens.push(literal);
                    }
                    return;
                }
                _ => {}
            }
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.inline_leaf("text", "", &text),
            Event::Code(code) => self.inline_leaf("code_inline", "code", &code),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.inline_leaf("code_inline", "code", &math)
            }
            Event::InlineHtml(html) => self.inline_leaf("html_inline", "", &html),
            Event::Html(html) => {
                self.close_implicit_paragraph();
                self.tokens
                    .push(RawToken::new("html_block", "", 0).with_content(&html));
            }
            Event::FootnoteReference(label) => {
                self.inline_leaf("text", "", &format!("[^{}]", label))
            }
            Event::SoftBreak => self.inline_leaf("softbreak", "br", ""),
            Event::HardBreak => self.inline_leaf("hardbreak", "br", ""),
            Event::Rule => {
                self.close_implicit_paragraph();
                self.tokens.push(RawToken::new("hr", "hr", 0));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.inline_leaf("text", "", marker);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Emphasis => self.inline_span(RawToken::open("em", "em")),
            Tag::Strong => self.inline_span(RawToken::open("strong", "strong")),
            Tag::Strikethrough => self.inline_span(RawToken::open("s", "s")),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut token = RawToken::open("link", "a").with_attr("href", &dest_url);
                if !title.is_empty() {
                    token = token.with_attr("title", &title);
                }
                self.inline_span(token);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut token = RawToken::new("image", "img", 0).with_attr("src", &dest_url);
                if !title.is_empty() {
                    token = token.with_attr("title", &title);
                }
                self.ensure_inline();
                if let Some(buffer) = self.inline.as_mut() {
                    if buffer.image.is_some() {
                        buffer.nested_images += 1;
                    } else {
                        buffer.image = Some(token);
                    }
                }
            }
            block => {
                self.close_implicit_paragraph();
                self.start_block(block);
            }
        }
    }

    fn start_block(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.tokens.push(RawToken::open("paragraph", "p"));
                self.inline = Some(InlineBuffer::default());
            }
            Tag::Heading { level, .. } => {
                let tag = format!("h{}", level as usize);
                self.tokens.push(RawToken::open("heading", &tag));
                self.inline = Some(InlineBuffer::default());
            }
            Tag::BlockQuote(_) => self.tokens.push(RawToken::open("blockquote", "blockquote")),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let mut token = RawToken::new("fence", "code", 0);
                if !info.is_empty() {
                    token = token.with_attr("info", &info);
                }
                self.literal = Some(token);
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => {
                self.literal = Some(RawToken::new("code_block", "code", 0));
            }
            Tag::HtmlBlock => self.literal = Some(RawToken::new("html_block", "", 0)),
            Tag::List(Some(start)) => {
                let mut token = RawToken::open("ordered_list", "ol");
                if start != 1 {
                    token = token.with_attr("start", &start.to_string());
                }
                self.tokens.push(token);
            }
            Tag::List(None) => self.tokens.push(RawToken::open("bullet_list", "ul")),
            Tag::Item => self.tokens.push(RawToken::open("list_item", "li")),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..Default::default()
                };
                self.tokens.push(RawToken::open("table", "table"));
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                self.tokens.push(RawToken::open("thead", "thead"));
                self.tokens.push(RawToken::open("tr", "tr"));
            }
            Tag::TableRow => {
                if !self.table.body_open {
                    self.table.body_open = true;
                    self.tokens.push(RawToken::open("tbody", "tbody"));
                }
                self.table.cell = 0;
                self.tokens.push(RawToken::open("tr", "tr"));
            }
            Tag::TableCell => {
                let (name, tag) = if self.table.in_head {
                    ("th", "th")
                } else {
                    ("td", "td")
                };
                let mut token = RawToken::open(name, tag);
                if let Some(style) = self
                    .table
                    .alignments
                    .get(self.table.cell)
                    .and_then(alignment_style)
                {
                    token = token.with_attr("style", style);
                }
                self.tokens.push(token);
                self.inline = Some(InlineBuffer::default());
            }
            // Only produced by extensions that are never enabled
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Emphasis => self.inline_span(RawToken::close("em", "em")),
            TagEnd::Strong => self.inline_span(RawToken::close("strong", "strong")),
            TagEnd::Strikethrough => self.inline_span(RawToken::close("s", "s")),
            TagEnd::Link => self.inline_span(RawToken::close("link", "a")),
            TagEnd::Image => {
                if let Some(buffer) = self.inline.as_mut() {
                    if buffer.nested_images > 0 {
                        buffer.nested_images -= 1;
                    } else if let Some(image) = buffer.image.take() {
                        buffer.children.push(image);
                    }
                }
            }
            block => {
                self.close_implicit_paragraph();
                self.end_block(block);
            }
        }
    }

    fn end_block(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.close_leaf(RawToken::close("paragraph", "p")),
            TagEnd::Heading(level) => {
                let tag = format!("h{}", level as usize);
                self.close_leaf(RawToken::close("heading", &tag));
            }
            TagEnd::BlockQuote(_) => self
                .tokens
                .push(RawToken::close("blockquote", "blockquote")),
            TagEnd::List(true) => self.tokens.push(RawToken::close("ordered_list", "ol")),
            TagEnd::List(false) => self.tokens.push(RawToken::close("bullet_list", "ul")),
            TagEnd::Item => self.tokens.push(RawToken::close("list_item", "li")),
            TagEnd::TableCell => {
                let (name, tag) = if self.table.in_head {
                    ("th", "th")
                } else {
                    ("td", "td")
                };
                self.close_leaf(RawToken::close(name, tag));
                self.table.cell += 1;
            }
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.tokens.push(RawToken::close("tr", "tr"));
                self.tokens.push(RawToken::close("thead", "thead"));
            }
            TagEnd::TableRow => self.tokens.push(RawToken::close("tr", "tr")),
            TagEnd::Table => {
                if self.table.body_open {
                    self.tokens.push(RawToken::close("tbody", "tbody"));
                }
                self.tokens.push(RawToken::close("table", "table"));
                self.table = TableState::default();
            }
            _ => {}
        }
    }

    /// Flush the open leaf's inline content, then emit its close
    fn close_leaf(&mut self, close: RawToken) {
        let buffer = self.inline.take().unwrap_or_default();
        self.tokens.push(buffer.into_token());
        self.tokens.push(close);
    }

    fn ensure_inline(&mut self) {
        if self.inline.is_none() {
            let mut open = RawToken::open("paragraph", "p");
            open.hidden = true;
            self.tokens.push(open);
            self.inline = Some(InlineBuffer::default());
            self.implicit_paragraph = true;
        }
    }

    fn close_implicit_paragraph(&mut self) {
        if self.implicit_paragraph {
            self.implicit_paragraph = false;
            let mut close = RawToken::close("paragraph", "p");
            close.hidden = true;
            self.close_leaf(close);
        }
    }

    fn inline_leaf(&mut self, kind: &str, tag: &str, content: &str) {
        self.inline_span(RawToken::new(kind, tag, 0).with_content(content));
    }

    fn inline_span(&mut self, token: RawToken) {
        self.ensure_inline();
        if let Some(buffer) = self.inline.as_mut() {
            buffer.push(token);
        }
    }

    fn finish(mut self) -> Vec<RawToken> {
        self.close_implicit_paragraph();
        self.tokens
    }
}

fn alignment_style(alignment: &CmarkAlignment) -> Option<&'static str> {
    match alignment {
        CmarkAlignment::None => None,
        CmarkAlignment::Left => Some("text-align:left"),
        CmarkAlignment::Center => Some("text-align:center"),
        CmarkAlignment::Right => Some("text-align:right"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        PulldownTokenizer::default()
            .tokenize(source)
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_heading_and_paragraph() {
        let tokens = PulldownTokenizer::default().tokenize("# Hello\n\nThis is **bold**.");
        let names: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "heading_open",
                "inline",
                "heading_close",
                "paragraph_open",
                "inline",
                "paragraph_close"
            ]
        );
        assert_eq!(tokens[0].tag, "h1");
        assert_eq!(tokens[4].content, "This is bold.");
        let children: Vec<&str> = tokens[4]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.kind.as_str())
            .collect();
        assert_eq!(
            children,
            vec!["text", "strong_open", "text", "strong_close", "text"]
        );
    }

    #[test]
    fn test_table_layout() {
        let names = kinds("| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(
            names,
            vec![
                "table_open",
                "thead_open",
                "tr_open",
                "th_open",
                "inline",
                "th_close",
                "th_open",
                "inline",
                "th_close",
                "tr_close",
                "thead_close",
                "tbody_open",
                "tr_open",
                "td_open",
                "inline",
                "td_close",
                "td_open",
                "inline",
                "td_close",
                "tr_close",
                "tbody_close",
                "table_close"
            ]
        );
    }

    #[test]
    fn test_header_only_table_has_no_body() {
        let names = kinds("| A |\n|---|\n");
        assert!(!names.iter().any(|name| name == "tbody_open"));
        assert_eq!(names.last().unwrap(), "table_close");
    }

    #[test]
    fn test_cell_alignment_hints() {
        let tokens = PulldownTokenizer::default().tokenize("| X | Y | Z |\n|:-:|--:|---|\n");
        let styles: Vec<Option<&String>> = tokens
            .iter()
            .filter(|t| t.kind == "th_open")
            .map(|t| t.attrs.get("style"))
            .collect();

        assert_eq!(styles[0].unwrap(), "text-align:center");
        assert_eq!(styles[1].unwrap(), "text-align:right");
        assert!(styles[2].is_none());
    }

    #[test]
    fn test_tables_disabled() {
        let tokenizer = PulldownTokenizer::new(TokenizerOptions {
            table: false,
            strikethrough: true,
        });
        let tokens = tokenizer.tokenize("| A |\n|---|\n");
        assert!(!tokens.iter().any(|t| t.kind == "table_open"));
    }

    #[test]
    fn test_tight_list_gets_hidden_paragraphs() {
        let tokens = PulldownTokenizer::default().tokenize("- one\n- two\n");
        let paragraph = tokens
            .iter()
            .find(|t| t.kind == "paragraph_open")
            .unwrap();
        assert!(paragraph.hidden);
        assert_eq!(
            tokens.iter().filter(|t| t.kind == "list_item_open").count(),
            2
        );
        let opens = tokens.iter().filter(|t| t.nesting == 1).count();
        let closes = tokens.iter().filter(|t| t.nesting == -1).count();
        assert_eq!(opens, closes);
    }

    #[test]
    fn test_fence_keeps_language() {
        let tokens = PulldownTokenizer::default().tokenize("```rust\nfn main() {}\n```\n");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "fence");
        assert_eq!(tokens[0].attrs.get("info").unwrap(), "rust");
        assert_eq!(tokens[0].content, "fn main() {}\n");
    }

    #[test]
    fn test_image_alt_text() {
        let tokens = PulldownTokenizer::default().tokenize("![Alt text](pic.png)");
        let children = tokens[1].children.as_ref().unwrap();
        assert_eq!(children[0].kind, "image");
        assert_eq!(children[0].content, "Alt text");
        assert_eq!(children[0].attrs.get("src").unwrap(), "pic.png");
    }

    #[test]
    fn test_nested_image_folds_into_outer_alt() {
        let tokens = PulldownTokenizer::default().tokenize("![outer ![inner](i.png)](o.png)");
        let children = tokens[1].children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind, "image");
        assert_eq!(children[0].content, "outer inner");
        assert_eq!(children[0].attrs.get("src").unwrap(), "o.png");
    }
}
