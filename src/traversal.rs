//! Depth-first traversals of syntax trees in document order.
//!
//! All traversals run on an explicit stack rather than recursion, so they work on arbitrarily deep trees. The stack
//! storage is pooled and reused between traversals. Every traversal is configured by [`TraversalOptions`]:
//!  - [`within`](TraversalOptions::within) restricts the walk to elements whose full span overlaps a range. Zero-width
//!    elements are visited if they touch the range.
//!  - [`descend_into_children`](TraversalOptions::descend_into_children) decides for each visited node whether its
//!    children are walked. The node itself is visited either way.
//!  - [`descend_into_trivia`](TraversalOptions::descend_into_trivia) makes the walk enter the structure of
//!    structured trivia, as if the structure was a child of its trivia.
//!  - [`include_self`](TraversalOptions::include_self) makes node traversals start by visiting the start node.
//!
//! ```
//! # use greenwood::*;
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
//! # enum Lang {}
//! # impl Language for Lang {
//! #     type Kind = SyntaxKind;
//! #     fn kind_from_raw(raw: SyntaxKind) -> SyntaxKind { raw }
//! #     fn kind_to_raw(kind: SyntaxKind) -> SyntaxKind { kind }
//! # }
//! const ROOT: SyntaxKind = SyntaxKind(0);
//! const PAIR: SyntaxKind = SyntaxKind(1);
//! const WORD: SyntaxKind = SyntaxKind(2);
//!
//! let mut builder: GreenNodeBuilder<Lang> = GreenNodeBuilder::new();
//! builder.start_node(ROOT);
//! builder.start_node(PAIR);
//! builder.token(WORD, "a");
//! builder.token(WORD, "b");
//! builder.finish_node();
//! builder.token(WORD, "c");
//! builder.finish_node();
//! let (green, _) = builder.finish();
//!
//! let root = SyntaxNode::<Lang>::new_root(green);
//! let words: Vec<_> = root.descendant_tokens().map(|token| token.to_string()).collect();
//! assert_eq!(words, ["a", "b", "c"]);
//!
//! // don't look into pairs
//! let options = TraversalOptions::new().descend_into_children(|node: &SyntaxNode<Lang>| node.kind() != PAIR);
//! assert_eq!(root.descendant_tokens_with(options).count(), 1);
//! ```

mod pool;
mod stack;

use std::marker::PhantomData;

pub use self::pool::{CAPACITY_CLASSES, MAX_FREE_PER_CLASS, RETENTION_THRESHOLD};
use self::stack::{TraversalStack, Which};
use crate::{
    syntax::tree::RawNode, Language, NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTrivia, TextRange,
};

/// Whether an element with full span `item` is visited by a traversal bounded by `span`.
///
/// Elements are visited if they overlap the span. Zero-width elements never overlap anything, so they are visited if
/// they touch the span instead.
#[inline]
pub(crate) fn is_in_span(span: TextRange, item: TextRange) -> bool {
    if item.is_empty() {
        span.start() <= item.end() && item.start() <= span.end()
    } else {
        span.start() < item.end() && item.start() < span.end()
    }
}

/// The predicate type of [`TraversalOptions`] that descend into every node.
pub type DescendAll<L> = fn(&SyntaxNode<L>) -> bool;

/// Configures a traversal. See the [module documentation](self).
pub struct TraversalOptions<L: Language, F = DescendAll<L>> {
    span:         Option<TextRange>,
    descend:      Option<F>,
    into_trivia:  bool,
    include_self: bool,
    _lang:        PhantomData<fn() -> L>,
}

impl<L: Language> TraversalOptions<L> {
    /// Options for an unbounded walk that descends into all nodes but not into trivia, and excludes the start node.
    pub fn new() -> Self {
        Self {
            span:         None,
            descend:      None,
            into_trivia:  false,
            include_self: false,
            _lang:        PhantomData,
        }
    }
}

impl<L: Language> Default for TraversalOptions<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Language, F> TraversalOptions<L, F> {
    /// Only visit elements whose full span is in `span`.
    pub fn within(mut self, span: TextRange) -> Self {
        self.span = Some(span);
        self
    }

    /// Only walk the children of nodes for which `descend` returns `true`.
    pub fn descend_into_children<G>(self, descend: G) -> TraversalOptions<L, G>
    where
        G: FnMut(&SyntaxNode<L>) -> bool,
    {
        TraversalOptions {
            span:         self.span,
            descend:      Some(descend),
            into_trivia:  self.into_trivia,
            include_self: self.include_self,
            _lang:        PhantomData,
        }
    }

    /// Walk the structure of structured trivia.
    pub fn descend_into_trivia(mut self, descend: bool) -> Self {
        self.into_trivia = descend;
        self
    }

    /// Visit the start node first. Has no effect on token and trivia traversals.
    pub fn include_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self
    }
}

impl<L: Language, F> std::fmt::Debug for TraversalOptions<L, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalOptions")
            .field("span", &self.span)
            .field("descend_into_children", &self.descend.is_some())
            .field("descend_into_trivia", &self.into_trivia)
            .field("include_self", &self.include_self)
            .finish()
    }
}

/// State shared by all traversal iterators.
struct Walk<L: Language, F> {
    /// The start node, until the first call to `next`.
    start:        Option<RawNode>,
    span:         TextRange,
    descend:      Option<F>,
    into_trivia:  bool,
    include_self: bool,
    stack:        TraversalStack,
    _lang:        PhantomData<fn() -> L>,
}

impl<L: Language, F: FnMut(&SyntaxNode<L>) -> bool> Walk<L, F> {
    fn new(start: &SyntaxNode<L>, options: TraversalOptions<L, F>) -> Self {
        Self {
            span:         options.span.unwrap_or_else(|| start.full_span()),
            start:        Some(start.raw().clone()),
            descend:      options.descend,
            into_trivia:  options.into_trivia,
            include_self: options.include_self,
            stack:        TraversalStack::new(),
            _lang:        PhantomData,
        }
    }

    /// Pushes the children of `node` unless the predicate prunes it.
    fn push_children(&mut self, node: &SyntaxNode<L>) {
        let descend = match &mut self.descend {
            Some(descend) => descend(node),
            None => true,
        };
        if descend {
            self.stack.push_children(node.raw().clone());
        }
    }

    /// Takes the start node on the first call. Returns it if it should be visited.
    fn start(&mut self) -> Option<SyntaxNode<L>> {
        let start = SyntaxNode::from_raw(self.start.take()?);
        self.push_children(&start);
        (self.include_self && is_in_span(self.span, start.full_span())).then_some(start)
    }

    /// The positioned structure of a trivia, if the walk enters it.
    fn enter_structure(&mut self, trivia: &SyntaxTrivia<L>) -> Option<SyntaxNode<L>> {
        if !self.into_trivia || !trivia.has_structure() || !is_in_span(self.span, trivia.full_span()) {
            return None;
        }
        let structure = trivia.structure()?;
        self.push_children(&structure);
        Some(structure)
    }
}

/// Iterator over the descendant nodes of a node, in document order.
///
/// Created by [`SyntaxNode::descendant_nodes`] and related methods.
pub struct DescendantNodes<L: Language, F = DescendAll<L>> {
    walk: Walk<L, F>,
}

impl<L: Language, F: FnMut(&SyntaxNode<L>) -> bool> Iterator for DescendantNodes<L, F> {
    type Item = SyntaxNode<L>;

    fn next(&mut self) -> Option<Self::Item> {
        let walk = &mut self.walk;
        if walk.start.is_some() {
            if let Some(start) = walk.start() {
                return Some(start);
            }
        }
        let span = walk.span;
        loop {
            match walk.stack.peek()? {
                Which::Node if walk.into_trivia => match walk.stack.next_in_span(span) {
                    Some(NodeOrToken::Node(node)) => {
                        let node = SyntaxNode::from_raw(node);
                        walk.push_children(&node);
                        return Some(node);
                    }
                    Some(NodeOrToken::Token(token)) => {
                        if token.green.contains_structured_trivia() {
                            walk.stack.push_trailing_trivia(&token);
                            walk.stack.push_leading_trivia(&token);
                        }
                    }
                    None => {}
                },
                Which::Node => {
                    if let Some(node) = walk.stack.next_node_in_span(span) {
                        let node = SyntaxNode::from_raw(node);
                        walk.push_children(&node);
                        return Some(node);
                    }
                }
                Which::Trivia => {
                    if let Some(trivia) = walk.stack.next_trivia() {
                        if let Some(structure) = walk.enter_structure(&SyntaxTrivia::from_raw(trivia)) {
                            return Some(structure);
                        }
                    }
                }
                Which::Token => unreachable!("node traversals never push tokens"),
            }
        }
    }
}

/// Iterator over the descendant nodes and tokens of a node, in document order.
///
/// Created by [`SyntaxNode::descendant_nodes_and_tokens`] and related methods. When descending into trivia, the
/// structure of a token's leading trivia comes before the token and the structure of its trailing trivia after it.
pub struct DescendantNodesAndTokens<L: Language, F = DescendAll<L>> {
    walk: Walk<L, F>,
}

impl<L: Language, F: FnMut(&SyntaxNode<L>) -> bool> Iterator for DescendantNodesAndTokens<L, F> {
    type Item = SyntaxElement<L>;

    fn next(&mut self) -> Option<Self::Item> {
        let walk = &mut self.walk;
        if walk.start.is_some() {
            if let Some(start) = walk.start() {
                return Some(NodeOrToken::Node(start));
            }
        }
        let span = walk.span;
        loop {
            match walk.stack.peek()? {
                Which::Node => match walk.stack.next_in_span(span) {
                    Some(NodeOrToken::Node(node)) => {
                        let node = SyntaxNode::from_raw(node);
                        walk.push_children(&node);
                        return Some(NodeOrToken::Node(node));
                    }
                    Some(NodeOrToken::Token(token)) => {
                        if walk.into_trivia && token.green.contains_structured_trivia() {
                            // visited in reverse: leading trivia, the token, trailing trivia
                            walk.stack.push_trailing_trivia(&token);
                            walk.stack.push_token(token.clone());
                            walk.stack.push_leading_trivia(&token);
                        } else {
                            return Some(NodeOrToken::Token(SyntaxToken::from_raw(token)));
                        }
                    }
                    None => {}
                },
                Which::Trivia => {
                    if let Some(trivia) = walk.stack.next_trivia() {
                        if let Some(structure) = walk.enter_structure(&SyntaxTrivia::from_raw(trivia)) {
                            return Some(NodeOrToken::Node(structure));
                        }
                    }
                }
                Which::Token => {
                    if let Some(token) = walk.stack.pop_token() {
                        return Some(NodeOrToken::Token(SyntaxToken::from_raw(token)));
                    }
                }
            }
        }
    }
}

/// Iterator over the descendant tokens of a node, in document order.
///
/// Created by [`SyntaxNode::descendant_tokens`] and [`SyntaxNode::descendant_tokens_with`].
pub struct DescendantTokens<L: Language, F = DescendAll<L>> {
    inner: DescendantNodesAndTokens<L, F>,
}

impl<L: Language, F: FnMut(&SyntaxNode<L>) -> bool> Iterator for DescendantTokens<L, F> {
    type Item = SyntaxToken<L>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(NodeOrToken::into_token)
    }
}

/// Iterator over the trivia of all descendant tokens of a node, in document order.
///
/// Created by [`SyntaxNode::descendant_trivia`] and [`SyntaxNode::descendant_trivia_with`]. When descending into
/// trivia, a structured trivia is visited before the trivia inside its structure.
pub struct DescendantTrivia<L: Language, F = DescendAll<L>> {
    walk: Walk<L, F>,
}

impl<L: Language, F: FnMut(&SyntaxNode<L>) -> bool> Iterator for DescendantTrivia<L, F> {
    type Item = SyntaxTrivia<L>;

    fn next(&mut self) -> Option<Self::Item> {
        let walk = &mut self.walk;
        if walk.start.is_some() {
            walk.start();
        }
        let span = walk.span;
        loop {
            match walk.stack.peek()? {
                Which::Node => match walk.stack.next_in_span(span) {
                    Some(NodeOrToken::Node(node)) => walk.push_children(&SyntaxNode::from_raw(node)),
                    Some(NodeOrToken::Token(token)) => {
                        walk.stack.push_trailing_trivia(&token);
                        walk.stack.push_leading_trivia(&token);
                    }
                    None => {}
                },
                Which::Trivia => {
                    let Some(trivia) = walk.stack.next_trivia() else {
                        continue;
                    };
                    let trivia = SyntaxTrivia::from_raw(trivia);
                    if !is_in_span(span, trivia.full_span()) {
                        continue;
                    }
                    if walk.into_trivia {
                        if let Some(structure) = trivia.structure() {
                            walk.push_children(&structure);
                        }
                    }
                    return Some(trivia);
                }
                Which::Token => unreachable!("trivia traversals never push tokens"),
            }
        }
    }
}

impl<L: Language> SyntaxNode<L> {
    /// All nodes below this node, in document order.
    pub fn descendant_nodes(&self) -> DescendantNodes<L> {
        self.descendant_nodes_with(TraversalOptions::new())
    }

    /// This node, followed by all nodes below it, in document order.
    pub fn descendant_nodes_and_self(&self) -> DescendantNodes<L> {
        self.descendant_nodes_with(TraversalOptions::new().include_self(true))
    }

    pub fn descendant_nodes_with<F>(&self, options: TraversalOptions<L, F>) -> DescendantNodes<L, F>
    where
        F: FnMut(&SyntaxNode<L>) -> bool,
    {
        DescendantNodes {
            walk: Walk::new(self, options),
        }
    }

    /// All nodes and tokens below this node, in document order.
    pub fn descendant_nodes_and_tokens(&self) -> DescendantNodesAndTokens<L> {
        self.descendant_nodes_and_tokens_with(TraversalOptions::new())
    }

    /// This node, followed by all nodes and tokens below it, in document order.
    pub fn descendant_nodes_and_tokens_and_self(&self) -> DescendantNodesAndTokens<L> {
        self.descendant_nodes_and_tokens_with(TraversalOptions::new().include_self(true))
    }

    pub fn descendant_nodes_and_tokens_with<F>(
        &self,
        options: TraversalOptions<L, F>,
    ) -> DescendantNodesAndTokens<L, F>
    where
        F: FnMut(&SyntaxNode<L>) -> bool,
    {
        DescendantNodesAndTokens {
            walk: Walk::new(self, options),
        }
    }

    /// All tokens below this node, in document order.
    pub fn descendant_tokens(&self) -> DescendantTokens<L> {
        self.descendant_tokens_with(TraversalOptions::new())
    }

    pub fn descendant_tokens_with<F>(&self, options: TraversalOptions<L, F>) -> DescendantTokens<L, F>
    where
        F: FnMut(&SyntaxNode<L>) -> bool,
    {
        DescendantTokens {
            inner: self.descendant_nodes_and_tokens_with(options.include_self(false)),
        }
    }

    /// The trivia of all tokens below this node, in document order.
    pub fn descendant_trivia(&self) -> DescendantTrivia<L> {
        self.descendant_trivia_with(TraversalOptions::new())
    }

    pub fn descendant_trivia_with<F>(&self, options: TraversalOptions<L, F>) -> DescendantTrivia<L, F>
    where
        F: FnMut(&SyntaxNode<L>) -> bool,
    {
        DescendantTrivia {
            walk: Walk::new(self, options.include_self(false)),
        }
    }

    /// All nodes and tokens below this node, including inside structured trivia, that carry an annotation of `kind`.
    ///
    /// Subtrees without any annotations are skipped entirely.
    pub fn annotated_nodes_and_tokens<'a>(&self, kind: &'a str) -> impl Iterator<Item = SyntaxElement<L>> + 'a {
        let options = TraversalOptions::new()
            .descend_into_trivia(true)
            .include_self(true)
            .descend_into_children(SyntaxNode::<L>::contains_annotations as DescendAll<L>);
        self.contains_annotations()
            .then(|| self.descendant_nodes_and_tokens_with(options))
            .into_iter()
            .flatten()
            .filter(move |element| match element {
                NodeOrToken::Node(node) => node.has_annotations_of_kind(kind),
                NodeOrToken::Token(token) => token.has_annotations_of_kind(kind),
            })
    }

    /// All nodes below this node, including inside structured trivia, that carry an annotation of `kind`.
    pub fn annotated_nodes<'a>(&self, kind: &'a str) -> impl Iterator<Item = SyntaxNode<L>> + 'a {
        let options = TraversalOptions::new()
            .descend_into_trivia(true)
            .include_self(true)
            .descend_into_children(SyntaxNode::<L>::contains_annotations as DescendAll<L>);
        self.contains_annotations()
            .then(|| self.descendant_nodes_with(options))
            .into_iter()
            .flatten()
            .filter(move |node| node.has_annotations_of_kind(kind))
    }

    /// All tokens below this node, including inside structured trivia, that carry an annotation of `kind`.
    pub fn annotated_tokens<'a>(&self, kind: &'a str) -> impl Iterator<Item = SyntaxToken<L>> + 'a {
        self.annotated_nodes_and_tokens(kind).filter_map(NodeOrToken::into_token)
    }

    /// All trivia below this node, including inside structured trivia, that carry an annotation of `kind`.
    pub fn annotated_trivia<'a>(&self, kind: &'a str) -> impl Iterator<Item = SyntaxTrivia<L>> + 'a {
        let options = TraversalOptions::new()
            .descend_into_trivia(true)
            .descend_into_children(SyntaxNode::<L>::contains_annotations as DescendAll<L>);
        self.contains_annotations()
            .then(|| self.descendant_trivia_with(options))
            .into_iter()
            .flatten()
            .filter(move |trivia| trivia.has_annotations_of_kind(kind))
    }
}
