//! Document renderer: one strategy per block kind

use super::grid::{ComfyBackend, TableRenderer};
use super::table::TableModel;
use super::token::{Nesting, Token, TokenKind};
use super::tree::{Node, SyntaxTree};
use super::RenderOptions;
use crate::error::Result;
use crate::output::colorize::{ColorScheme, InlineStyle};

const BULLETS: [&str; 3] = ["•", "◦", "▪"];
const MIN_WIDTH: usize = 20;

pub struct DocumentRenderer<'a> {
    options: &'a RenderOptions,
    scheme: ColorScheme,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            scheme: ColorScheme::new(options.color),
        }
    }

    /// Render the whole tree; the result ends with a newline unless empty
    pub fn render(&self, tree: &SyntaxTree) -> Result<String> {
        let mut out = self.blocks(tree.root(), self.options.width.max(MIN_WIDTH), 0)?;
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    /// Render a node's children as consecutive blocks
    fn blocks(&self, parent: Node<'_>, width: usize, list_depth: usize) -> Result<String> {
        let mut out = String::new();
        let mut previous_hidden = false;

        for (i, child) in parent.children().enumerate() {
            let hidden = child.token().map(Token::is_hidden).unwrap_or(false);
            let block = self.block(child, width, list_depth)?;
            if i > 0 {
                out.push_str(if hidden || previous_hidden { "\n" } else { "\n\n" });
            }
            out.push_str(&block);
            previous_hidden = hidden;
        }

        Ok(out)
    }

    fn block(&self, node: Node<'_>, width: usize, list_depth: usize) -> Result<String> {
        let Some(token) = node.token() else {
            return self.blocks(node, width, list_depth);
        };

        let rendered = match node.kind() {
            "heading" => self.heading(node, token),
            "paragraph" => textwrap::fill(&self.inline_of(node), width),
            "bullet_list" | "ordered_list" => return self.list(node, width, list_depth),
            "blockquote" => return self.blockquote(node, width, list_depth),
            "fence" | "code_block" => self.code(token),
            "hr" => self.scheme.muted(&"─".repeat(width)),
            "html_block" => self.scheme.muted(token.content().trim_end()),
            "table" => return self.table(node, width),
            "inline" => textwrap::fill(&self.inline(token), width),
            _ if token.nesting() == Nesting::Open => return self.blocks(node, width, list_depth),
            _ => token.content().to_string(),
        };
        Ok(rendered)
    }

    fn heading(&self, node: Node<'_>, token: &Token) -> String {
        let level = token
            .tag()
            .strip_prefix('h')
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(1);
        let text = node
            .children()
            .filter_map(|child| child.token())
            .map(Token::plain_text)
            .collect::<String>();
        self.scheme.heading(level, &text)
    }

    fn list(&self, node: Node<'_>, width: usize, list_depth: usize) -> Result<String> {
        let ordered = node.kind() == "ordered_list";
        let start = node
            .token()
            .and_then(|t| t.attr("start"))
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1);
        let tight = node.children().all(|item| {
            item.children()
                .next()
                .and_then(|first| first.token())
                .map(|t| t.kind() != TokenKind::Open || t.is_hidden())
                .unwrap_or(true)
        });

        let mut items = Vec::new();
        for (i, item) in node.children().enumerate() {
            let marker = if ordered {
                format!("{}.", start + i)
            } else {
                BULLETS[list_depth % BULLETS.len()].to_string()
            };
            let indent = marker.chars().count() + 1;
            let item_width = width.saturating_sub(indent).max(MIN_WIDTH);
            let body = self.blocks(item, item_width, list_depth + 1)?;

            let mut lines = Vec::new();
            for (n, line) in body.lines().enumerate() {
                if n == 0 {
                    lines.push(format!("{} {}", self.scheme.marker(&marker), line));
                } else if line.is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{}{}", " ".repeat(indent), line));
                }
            }
            if lines.is_empty() {
                lines.push(self.scheme.marker(&marker));
            }
            items.push(lines.join("\n"));
        }

        Ok(items.join(if tight { "\n" } else { "\n\n" }))
    }

    fn blockquote(&self, node: Node<'_>, width: usize, list_depth: usize) -> Result<String> {
        let body = self.blocks(node, width.saturating_sub(2).max(MIN_WIDTH), list_depth)?;
        let bar = self.scheme.muted("│");
        let lines: Vec<String> = body
            .lines()
            .map(|line| {
                if line.is_empty() {
                    bar.clone()
                } else {
                    format!("{} {}", bar, line)
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn code(&self, token: &Token) -> String {
        let mut lines = Vec::new();
        if let Some(language) = token.attr("info").filter(|info| !info.is_empty()) {
            lines.push(self.scheme.muted(&format!("[{}]", language)));
        }
        for line in token.content().trim_end_matches('\n').lines() {
            lines.push(format!("  {}", self.scheme.code_block(line)));
        }
        lines.join("\n")
    }

    fn table(&self, node: Node<'_>, width: usize) -> Result<String> {
        let model = TableModel::from_node(node)?;
        let backend = ComfyBackend {
            border: self.options.border,
            width: Some(u16::try_from(width).unwrap_or(u16::MAX)),
            bold_header: self.options.bold_header,
            styled: self.options.color,
        };
        let rendered = TableRenderer::new(backend, self.options.overflow).render(model);
        Ok(rendered.trim_end().to_string())
    }

    fn inline_of(&self, node: Node<'_>) -> String {
        node.children()
            .filter_map(|child| child.token())
            .map(|token| self.inline(token))
            .collect()
    }

    /// Styled text of an inline token
    pub fn inline(&self, token: &Token) -> String {
        if token.children().is_empty() {
            return self.scheme.inline(token.content(), InlineStyle::default());
        }

        let mut out = String::new();
        let mut plain = String::new();
        let mut style = InlineStyle::default();
        let mut strong = 0usize;
        let mut emphasis = 0usize;
        let mut strike = 0usize;
        // (href, offset into `plain` where the link text starts)
        let mut links: Vec<(String, usize)> = Vec::new();

        for child in token.children() {
            match (child.name(), child.nesting()) {
                ("strong_open", _) => strong += 1,
                ("strong_close", _) => strong = strong.saturating_sub(1),
                ("em_open", _) => emphasis += 1,
                ("em_close", _) => emphasis = emphasis.saturating_sub(1),
                ("s_open", _) => strike += 1,
                ("s_close", _) => strike = strike.saturating_sub(1),
                ("link_open", _) => {
                    let href = child.attr("href").unwrap_or_default().to_string();
                    links.push((href, plain.len()));
                }
                ("link_close", _) => {
                    if let Some((href, start)) = links.pop() {
                        if !href.is_empty() && plain[start..] != href {
                            out.push_str(&self.scheme.muted(&format!(" ({})", href)));
                        }
                    }
                }
                ("code_inline", _) => {
                    out.push_str(&self.scheme.code(child.content()));
                    plain.push_str(child.content());
                }
                ("softbreak", _) => {
                    out.push(' ');
                    plain.push(' ');
                }
                ("hardbreak", _) => {
                    out.push('\n');
                    plain.push('\n');
                }
                ("image", _) => {
                    let alt = child.plain_text();
                    let label = if alt.is_empty() {
                        "[image]".to_string()
                    } else {
                        format!("[image: {}]", alt)
                    };
                    out.push_str(&self.scheme.muted(&label));
                    plain.push_str(&label);
                }
                (_, Nesting::SelfClosing) => {
                    style.bold = strong > 0;
                    style.italic = emphasis > 0;
                    style.strike = strike > 0;
                    style.link = !links.is_empty();
                    out.push_str(&self.scheme.inline(child.content(), style));
                    plain.push_str(child.content());
                }
                _ => {}
            }
        }

        out
    }
}
