//! Syntax tree builder
//!
//! Nodes live in a single arena and refer to each other by index. Children
//! are only ever appended, so the tree cannot cycle.

use super::token::{Nesting, Token};
use crate::error::{RenderError, Result};

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    /// `None` only for the root
    token: Option<Token>,
    /// Matching close token for container nodes
    closing: Option<Token>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A rooted tree rebuilt from a flat token stream. Immutable once built.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

const ROOT: NodeId = NodeId(0);

impl SyntaxTree {
    /// Fold a validated token sequence into a tree.
    ///
    /// Opens push a new node onto the stack of open nodes, closes pop it after
    /// checking the tag, everything else becomes a leaf of the current top.
    pub fn build(tokens: Vec<Token>) -> Result<Self> {
        let mut tree = SyntaxTree {
            nodes: vec![NodeData {
                token: None,
                closing: None,
                parent: None,
                children: Vec::new(),
            }],
        };
        // (node, position of its open token)
        let mut stack: Vec<(NodeId, usize)> = vec![(ROOT, 0)];

        for (position, token) in tokens.into_iter().enumerate() {
            let (top, _) = stack[stack.len() - 1];
            match token.nesting() {
                Nesting::Open => {
                    let id = tree.append(top, token);
                    stack.push((id, position));
                }
                Nesting::SelfClosing => {
                    tree.append(top, token);
                }
                Nesting::Close => {
                    if top == ROOT {
                        return Err(RenderError::malformed(
                            position,
                            format!(
                                "`{}` closes <{}> but nothing is open",
                                token.name(),
                                token.tag()
                            ),
                        ));
                    }
                    let open_tag = tree.nodes[top.0]
                        .token
                        .as_ref()
                        .map(|t| t.tag().to_string())
                        .unwrap_or_default();
                    if open_tag != token.tag() {
                        return Err(RenderError::malformed(
                            position,
                            format!(
                                "`{}` closes <{}> but <{}> is open",
                                token.name(),
                                token.tag(),
                                open_tag
                            ),
                        ));
                    }
                    tree.nodes[top.0].closing = Some(token);
                    stack.pop();
                }
            }
        }

        // Report the outermost element left open; everything inside it is too
        if let Some(&(id, position)) = stack.get(1) {
            let tag = tree.node(id).tag().to_string();
            return Err(RenderError::UnclosedElement { tag, position });
        }

        tracing::debug!(nodes = tree.len(), "syntax tree built");
        Ok(tree)
    }

    fn append(&mut self, parent: NodeId, token: Token) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            token: Some(token),
            closing: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> Node<'_> {
        self.node(ROOT)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    /// Number of token-bearing nodes, i.e. every node except the root
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A borrowed view of one node, used for navigation
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT
    }

    pub fn token(&self) -> Option<&'a Token> {
        self.data().token.as_ref()
    }

    /// Element tag, empty for the root and for tagless tokens
    pub fn tag(&self) -> &'a str {
        self.token().map(Token::tag).unwrap_or("")
    }

    /// Token type name with any `_open` suffix removed, e.g. `bullet_list`
    pub fn kind(&self) -> &'a str {
        match self.token() {
            Some(token) => token.name().strip_suffix("_open").unwrap_or(token.name()),
            None => "root",
        }
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    fn sibling(&self, offset: isize) -> Option<Node<'a>> {
        let parent = self.parent()?;
        let siblings = &parent.data().children;
        let index = siblings.iter().position(|&id| id == self.id)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).map(|&id| self.tree.node(id))
    }

    pub fn next_sibling(&self) -> Option<Node<'a>> {
        self.sibling(1)
    }

    pub fn previous_sibling(&self) -> Option<Node<'a>> {
        self.sibling(-1)
    }

    /// Number of ancestors; the root is at depth 0
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(node) = current {
            depth += 1;
            current = node.parent();
        }
        depth
    }

    /// Nearest ancestor (or self) with the given tag
    pub fn closest(&self, tag: &str) -> Option<Node<'a>> {
        let mut current = Some(*self);
        while let Some(node) = current {
            if node.tag() == tag {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Pre-order walk over this node and all of its descendants
    pub fn walk(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        let mut pending = vec![*self];
        while let Some(node) = pending.pop() {
            out.push(node);
            let children: Vec<Node<'a>> = node.children().collect();
            pending.extend(children.into_iter().rev());
        }
        out
    }

    /// Re-flatten this subtree into the token sequence it was built from
    pub fn to_tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.flatten_into(&mut tokens);
        tokens
    }

    fn flatten_into(&self, tokens: &mut Vec<Token>) {
        if let Some(token) = self.token() {
            tokens.push(token.clone());
        }
        for child in self.children() {
            child.flatten_into(tokens);
        }
        if let Some(closing) = self.data().closing.as_ref() {
            tokens.push(closing.clone());
        }
    }

    /// Indented outline of the subtree, one `<tag>` per line
    pub fn pretty(&self, indent: usize, show_text: bool) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, indent, 0, show_text);
        out
    }

    fn pretty_into(&self, out: &mut String, indent: usize, depth: usize, show_text: bool) {
        let pad = " ".repeat(indent * depth);
        let label = if self.is_root() {
            "root"
        } else if self.tag().is_empty() {
            self.kind()
        } else {
            self.tag()
        };
        out.push_str(&format!("{}<{}>\n", pad, label));

        if show_text {
            if let Some(token) = self.token() {
                let text = token.plain_text();
                if self.child_count() == 0 && !text.is_empty() {
                    let inner = " ".repeat(indent * (depth + 1));
                    for line in text.lines() {
                        out.push_str(&format!("{}{}\n", inner, line));
                    }
                }
            }
        }

        for child in self.children() {
            child.pretty_into(out, indent, depth + 1, show_text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::token::{normalize, RawToken};

    fn tokens(raw: Vec<RawToken>) -> Vec<Token> {
        normalize(raw).unwrap()
    }

    fn sample() -> Vec<Token> {
        tokens(vec![
            RawToken::open("heading", "h1"),
            RawToken::inline("Title"),
            RawToken::close("heading", "h1"),
            RawToken::open("bullet_list", "ul"),
            RawToken::open("list_item", "li"),
            RawToken::open("paragraph", "p"),
            RawToken::inline("Item 1"),
            RawToken::close("paragraph", "p"),
            RawToken::close("list_item", "li"),
            RawToken::close("bullet_list", "ul"),
            RawToken::new("hr", "hr", 0),
        ])
    }

    #[test]
    fn test_node_count_matches_opens_and_leaves() {
        let tree = SyntaxTree::build(sample()).unwrap();
        // 4 opens + 2 inline + 1 hr
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.root().child_count(), 3);
    }

    #[test]
    fn test_navigation() {
        let tree = SyntaxTree::build(sample()).unwrap();
        let root = tree.root();
        let children: Vec<Node> = root.children().collect();

        let heading = children[0];
        assert_eq!(heading.tag(), "h1");
        assert!(heading.previous_sibling().is_none());
        assert_eq!(heading.next_sibling().unwrap().tag(), "ul");
        assert!(heading.parent().unwrap().is_root());

        let list = children[1];
        let item = list.children().next().unwrap();
        let paragraph = item.children().next().unwrap();
        assert_eq!(paragraph.depth(), 3);
        assert_eq!(paragraph.closest("ul").unwrap().id(), list.id());
        assert_eq!(children[2].kind(), "hr");
        assert!(children[2].next_sibling().is_none());
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = SyntaxTree::build(sample()).unwrap();
        let kinds: Vec<&str> = tree.root().walk().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "root",
                "heading",
                "inline",
                "bullet_list",
                "list_item",
                "paragraph",
                "inline",
                "hr"
            ]
        );
    }

    #[test]
    fn test_to_tokens_round_trips_subtree() {
        let original = sample();
        let tree = SyntaxTree::build(original.clone()).unwrap();
        assert_eq!(tree.root().to_tokens(), original);

        let list = tree.root().children().nth(1).unwrap();
        assert_eq!(list.to_tokens(), original[3..10].to_vec());
    }

    /// A close token normalized on its own, so the adapter's checks don't see it
    fn stray_close(name: &str, tag: &str) -> Token {
        tokens(vec![RawToken::open(name, tag), RawToken::close(name, tag)])
            .pop()
            .unwrap()
    }

    #[test]
    fn test_unmatched_close_is_malformed() {
        let mut built = tokens(vec![
            RawToken::open("paragraph", "p"),
            RawToken::inline("x"),
            RawToken::close("paragraph", "p"),
        ]);
        built.push(stray_close("paragraph", "p"));

        let err = SyntaxTree::build(built).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MalformedTokenStream { position: 3, .. }
        ));
    }

    #[test]
    fn test_mismatched_close_is_malformed() {
        let mut built = tokens(vec![RawToken::open("blockquote", "blockquote")]);
        built.push(stray_close("paragraph", "p"));

        let err = SyntaxTree::build(built).unwrap_err();
        assert!(err.to_string().contains("<blockquote> is open"));
    }

    #[test]
    fn test_unclosed_element() {
        let built = tokens(vec![
            RawToken::open("blockquote", "blockquote"),
            RawToken::open("paragraph", "p"),
            RawToken::inline("x"),
            RawToken::close("paragraph", "p"),
        ]);
        let err = SyntaxTree::build(built).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnclosedElement {
                tag: "blockquote".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn test_unclosed_reports_outermost() {
        let built = tokens(vec![
            RawToken::open("table", "table"),
            RawToken::open("thead", "thead"),
        ]);
        let err = SyntaxTree::build(built).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnclosedElement {
                tag: "table".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn test_empty_stream_is_root_only() {
        let tree = SyntaxTree::build(Vec::new()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root().is_root());
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn test_pretty() {
        let tree = SyntaxTree::build(sample()).unwrap();
        let pretty = tree.root().pretty(2, true);
        assert!(pretty.starts_with("<root>\n  <h1>\n    <inline>\n      Title\n"));
        assert!(pretty.contains("\n  <hr>\n"));
    }
}
