use std::{
    fmt::{self, Write as _},
    marker::PhantomData,
};

use crate::{
    annotation::SyntaxAnnotation,
    green::{GreenNode, GreenTrivia},
    syntax::{
        tree::{RawElement, RawNode, RawToken},
        Ancestors, SyntaxElement, SyntaxElementChildren, SyntaxNodeChildren, SyntaxToken, SyntaxTokenList,
        SyntaxTrivia,
    },
    Language, NodeOrToken, SyntaxError, SyntaxKind, TextRange, TextSize,
};

/// Inner syntax tree node.
///
/// A node knows its absolute position and can navigate to its parent, siblings and children. Syntax nodes can be
/// shared between threads. Cloning a node only bumps one counter. A node keeps its ancestors alive, but not its
/// children: navigating to a child creates a new handle, and equal handles stand for the same position in the same tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNode<L: Language> {
    raw:   RawNode,
    _lang: PhantomData<L>,
}

impl<L: Language> SyntaxNode<L> {
    /// Creates the root of a new tree from `green`. The root starts at offset zero.
    pub fn new_root(green: GreenNode) -> Self {
        Self::from_raw(RawNode::new_root(green))
    }

    #[inline]
    pub(crate) fn from_raw(raw: RawNode) -> Self {
        Self {
            raw,
            _lang: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn raw(&self) -> &RawNode {
        &self.raw
    }

    /// The underlying green node.
    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.raw.green
    }

    /// The typed kind of this node.
    #[inline]
    pub fn kind(&self) -> L::Kind {
        L::kind_from_raw(self.syntax_kind())
    }

    #[inline]
    pub fn syntax_kind(&self) -> SyntaxKind {
        self.raw.green.kind()
    }

    /// The range covered by this node, including the leading trivia of its first token and the trailing trivia of its
    /// last token.
    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.raw.full_span()
    }

    /// The range covered by this node, excluding its outer trivia.
    pub fn span(&self) -> TextRange {
        TextRange::at(self.span_start(), self.raw.green.width())
    }

    /// Start of [`span`](SyntaxNode::span).
    #[inline]
    pub fn span_start(&self) -> TextSize {
        self.raw.offset + self.raw.green.leading_trivia_len()
    }

    /// Number of child slots, including absent ones.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.raw.green.slot_count()
    }

    /// The child in slot `index`, or `None` if that slot is absent.
    ///
    /// If the slot holds a token list with more than one token, this is the first token of the list. Use
    /// [`token_list`](SyntaxNode::token_list) to get all of them.
    ///
    /// ## Panics
    /// If `index` is not smaller than [`slot_count`](SyntaxNode::slot_count).
    #[inline]
    pub fn child_at_slot(&self, index: usize) -> Option<SyntaxElement<L>> {
        self.raw.child(index).map(SyntaxElement::from_raw)
    }

    /// The child node in slot `index`, or `None` if that slot is absent or holds tokens.
    ///
    /// ## Panics
    /// If `index` is not smaller than [`slot_count`](SyntaxNode::slot_count).
    #[inline]
    pub fn node_at_slot(&self, index: usize) -> Option<SyntaxNode<L>> {
        self.raw.child_node(index).map(SyntaxNode::from_raw)
    }

    /// The tokens in slot `index`, viewed as a token list.
    ///
    /// An absent slot is an empty list, a token is a single-element list and a [`SyntaxKind::LIST`] node holds many
    /// tokens. The tokens of the list are children of this node.
    ///
    /// ## Panics
    /// If `index` is not smaller than [`slot_count`](SyntaxNode::slot_count), or if the slot holds a node that is not a
    /// list.
    pub fn token_list(&self, index: usize) -> SyntaxTokenList<L> {
        let position = self.raw.offset + self.raw.green.slot_offset(index);
        match self.raw.green.slot(index) {
            None => SyntaxTokenList::empty_at(position),
            Some(NodeOrToken::Token(token)) => SyntaxTokenList::single(RawToken {
                parent: Some(self.raw.clone()),
                green: token.clone(),
                offset: position,
                index,
                item: 0,
            }),
            Some(NodeOrToken::Node(node)) => {
                assert!(
                    node.kind().is_list(),
                    "slot {index} of `{:?}` holds a `{:?}` node, not a token list",
                    self.kind(),
                    L::kind_from_raw(node.kind()),
                );
                SyntaxTokenList::many(Some(self.raw.clone()), index, node.clone(), position)
            }
        }
    }

    /// The parent node, or `None` for the root of a tree or of a structured trivia.
    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode<L>> {
        self.raw.parent().map(SyntaxNode::from_raw)
    }

    /// If this node is the structure of a trivia, that trivia.
    #[inline]
    pub fn parent_trivia(&self) -> Option<SyntaxTrivia<L>> {
        self.raw.parent_trivia().map(SyntaxTrivia::from_raw)
    }

    /// The slot of this node in its parent.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.raw.index()
    }

    /// Whether this node is the root of its tree. Roots of structured trivia are not.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.raw.is_root()
    }

    /// The root of the tree this node belongs to. From inside structured trivia, this continues through the token
    /// owning the trivia.
    #[inline]
    pub fn root(&self) -> SyntaxNode<L> {
        SyntaxNode::from_raw(self.raw.root())
    }

    /// Iterator over this node and its parents, starting with this node.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<L> {
        Ancestors::new(self.clone(), false)
    }

    /// Like [`ancestors`](SyntaxNode::ancestors), but continues from the root of a structured trivia to the parent of
    /// the token that owns the trivia.
    #[inline]
    pub fn ancestors_through_trivia(&self) -> Ancestors<L> {
        Ancestors::new(self.clone(), true)
    }

    /// Iterator over the child nodes of this node, skipping tokens and absent slots.
    #[inline]
    pub fn children(&self) -> SyntaxNodeChildren<L> {
        SyntaxNodeChildren::new(self.raw.clone())
    }

    /// Iterator over the child nodes and tokens of this node, skipping absent slots. Token lists are iterated in place.
    #[inline]
    pub fn children_with_tokens(&self) -> SyntaxElementChildren<L> {
        SyntaxElementChildren::new(self.raw.clone())
    }

    pub fn first_child(&self) -> Option<SyntaxNode<L>> {
        self.children().next()
    }

    pub fn last_child(&self) -> Option<SyntaxNode<L>> {
        self.children().next_back()
    }

    pub fn first_child_or_token(&self) -> Option<SyntaxElement<L>> {
        self.children_with_tokens().next()
    }

    pub fn last_child_or_token(&self) -> Option<SyntaxElement<L>> {
        self.children_with_tokens().next_back()
    }

    /// The next node in the parent, skipping tokens and absent slots.
    pub fn next_sibling(&self) -> Option<SyntaxNode<L>> {
        let parent = self.raw.parent()?;
        let index = self.raw.index()?;
        (index + 1..parent.green.slot_count())
            .find_map(|slot| parent.child_node(slot))
            .map(SyntaxNode::from_raw)
    }

    /// The previous node in the parent, skipping tokens and absent slots.
    pub fn prev_sibling(&self) -> Option<SyntaxNode<L>> {
        let parent = self.raw.parent()?;
        let index = self.raw.index()?;
        (0..index)
            .rev()
            .find_map(|slot| parent.child_node(slot))
            .map(SyntaxNode::from_raw)
    }

    /// The next child of the parent, skipping absent slots.
    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement<L>> {
        let sibling = self.raw.parent()?.next_child_after(self.raw.index()?, 0)?;
        Some(SyntaxElement::from_raw(sibling))
    }

    /// The previous child of the parent, skipping absent slots.
    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement<L>> {
        let sibling = self.raw.parent()?.prev_child_before(self.raw.index()?, 0)?;
        Some(SyntaxElement::from_raw(sibling))
    }

    /// The first token below this node that is not zero-width.
    pub fn first_token(&self) -> Option<SyntaxToken<L>> {
        self.first_token_where(|token| u32::from(token.width()) != 0)
    }

    /// The last token below this node that is not zero-width.
    pub fn last_token(&self) -> Option<SyntaxToken<L>> {
        self.last_token_where(|token| u32::from(token.width()) != 0)
    }

    /// The first token below this node, including missing and empty tokens.
    pub fn first_token_including_zero_width(&self) -> Option<SyntaxToken<L>> {
        self.first_token_where(|_| true)
    }

    /// The last token below this node, including missing and empty tokens.
    pub fn last_token_including_zero_width(&self) -> Option<SyntaxToken<L>> {
        self.last_token_where(|_| true)
    }

    pub(crate) fn first_token_where(&self, mut pred: impl FnMut(&SyntaxToken<L>) -> bool) -> Option<SyntaxToken<L>> {
        let mut stack = vec![self.children_with_tokens()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(NodeOrToken::Node(node)) => stack.push(node.children_with_tokens()),
                Some(NodeOrToken::Token(token)) if pred(&token) => return Some(token),
                Some(NodeOrToken::Token(_)) => {}
                None => {
                    stack.pop();
                }
            }
        }
        None
    }

    pub(crate) fn last_token_where(&self, mut pred: impl FnMut(&SyntaxToken<L>) -> bool) -> Option<SyntaxToken<L>> {
        let mut stack = vec![self.children_with_tokens()];
        while let Some(children) = stack.last_mut() {
            match children.next_back() {
                Some(NodeOrToken::Node(node)) => stack.push(node.children_with_tokens()),
                Some(NodeOrToken::Token(token)) if pred(&token) => return Some(token),
                Some(NodeOrToken::Token(_)) => {}
                None => {
                    stack.pop();
                }
            }
        }
        None
    }

    /// Finds the token whose full span contains `position`.
    ///
    /// A `position` equal to the end of this node's full span finds the last token. Zero-width tokens are never
    /// returned unless they are the only candidate.
    pub fn find_token(&self, position: TextSize) -> Result<SyntaxToken<L>, SyntaxError> {
        self.find_token_impl(position, false)
    }

    /// Like [`find_token`](SyntaxNode::find_token), but if `position` lies in structured trivia, finds the token within
    /// that trivia's structure.
    pub fn find_token_in_trivia(&self, position: TextSize) -> Result<SyntaxToken<L>, SyntaxError> {
        self.find_token_impl(position, true)
    }

    fn find_token_impl(&self, position: TextSize, into_trivia: bool) -> Result<SyntaxToken<L>, SyntaxError> {
        let full_span = self.full_span();
        if !full_span.contains_inclusive(position) {
            return Err(SyntaxError::PositionOutOfRange { position, full_span });
        }
        if position == full_span.end() {
            if let Some(token) = self.last_token_including_zero_width() {
                return Ok(token);
            }
        }

        let mut node = self.clone();
        loop {
            let mut found = None;
            let mut fallback = None;
            for child in node.children_with_tokens() {
                let span = child.full_span();
                if span.is_empty() {
                    if span.start() == position && fallback.is_none() {
                        fallback = Some(child);
                    }
                    continue;
                }
                if span.contains(position) {
                    found = Some(child);
                    break;
                }
                if span.start() > position {
                    break;
                }
            }
            match found.or(fallback) {
                Some(NodeOrToken::Node(child)) => node = child,
                Some(NodeOrToken::Token(token)) => {
                    if into_trivia && token.green().contains_structured_trivia() {
                        if let Some(structure) = token.trivia_at(position).and_then(|trivia| trivia.structure()) {
                            return structure.find_token_impl(position, true);
                        }
                    }
                    return Ok(token);
                }
                None => {
                    return Err(SyntaxError::PositionOutOfRange {
                        position,
                        full_span: node.full_span(),
                    })
                }
            }
        }
    }

    /// Finds the trivia that covers `position`, if the token at `position` has any there.
    pub fn find_trivia(&self, position: TextSize) -> Result<Option<SyntaxTrivia<L>>, SyntaxError> {
        Ok(self.find_token(position)?.trivia_at(position))
    }

    /// Finds the innermost node whose full span contains `span`.
    ///
    /// Tokens are skipped: if `span` lies within a single token, that token's parent is returned.
    pub fn find_node(&self, span: TextRange) -> Result<SyntaxNode<L>, SyntaxError> {
        let full_span = self.full_span();
        if !full_span.contains_range(span) {
            return Err(SyntaxError::SpanOutOfRange { span, full_span });
        }
        let mut node = self.clone();
        'descend: loop {
            for child in node.children() {
                if child.full_span().contains_range(span) && !child.full_span().is_empty() {
                    node = child;
                    continue 'descend;
                }
            }
            return Ok(node);
        }
    }

    /// The smallest element whose full span covers `range`.
    ///
    /// ## Panics
    /// If `range` is not contained in this node's full span.
    pub fn covering_element(&self, range: TextRange) -> SyntaxElement<L> {
        assert!(
            self.full_span().contains_range(range),
            "range {range:?} is not within the full span {:?} of `{:?}`",
            self.full_span(),
            self.kind(),
        );
        let mut node = self.clone();
        'descend: loop {
            for child in node.children_with_tokens() {
                let span = child.full_span();
                if span.contains_range(range) && (range.is_empty() || !span.is_empty()) {
                    match child {
                        NodeOrToken::Node(child) => {
                            node = child;
                            continue 'descend;
                        }
                        token @ NodeOrToken::Token(_) => return token,
                    }
                }
            }
            return NodeOrToken::Node(node);
        }
    }

    /// Whether `other` is this node or lies below it, including inside structured trivia.
    pub fn contains(&self, other: &SyntaxNode<L>) -> bool {
        if !self.full_span().contains_range(other.full_span()) {
            return false;
        }
        other.ancestors_through_trivia().any(|ancestor| &ancestor == self)
    }

    /// Whether both nodes have the same structure and text, ignoring positions and annotations.
    #[inline]
    pub fn is_equivalent_to(&self, other: &SyntaxNode<L>) -> bool {
        self.green().is_equivalent_to(other.green())
    }

    /// Whether both nodes are backed by the same green node.
    #[inline]
    pub fn is_identical_to(&self, other: &SyntaxNode<L>) -> bool {
        self.green().ptr_eq(other.green())
    }

    /// Replaces this node with `replacement` and returns the green root of the resulting tree.
    ///
    /// All ancestors are rebuilt; siblings are shared with the original tree. When the path leads out of a structured
    /// trivia, the trivia and its token are rebuilt as well.
    pub fn replace_with(&self, replacement: GreenNode) -> GreenNode {
        let mut green = replacement;
        let mut node = self.raw.clone();
        loop {
            if let (Some(parent), Some(index)) = (node.parent(), node.index()) {
                green = parent.green.replace_slot(index, Some(green.into()));
                node = parent;
                continue;
            }
            let Some(trivia) = node.parent_trivia() else {
                return green;
            };
            let Some(token) = trivia.token else {
                return green;
            };
            let new_trivia = GreenTrivia::structured(trivia.green.kind(), green.clone())
                .with_additional_annotations(trivia.green.annotations().iter().cloned());
            let leading = token.green.leading_trivia();
            let new_token = if trivia.index < leading.len() {
                token
                    .green
                    .with_leading_trivia(leading.splice(trivia.index, 1, [new_trivia]))
            } else {
                let trailing = token.green.trailing_trivia();
                token
                    .green
                    .with_trailing_trivia(trailing.splice(trivia.index - leading.len(), 1, [new_trivia]))
            };
            match token.parent {
                Some(parent) => {
                    green = parent.replace_token(token.index, token.item, new_token);
                    node = parent;
                }
                // a detached token cannot carry its structure any further
                None => return green,
            }
        }
    }

    /// The annotations of this node, not of its descendants.
    #[inline]
    pub fn annotations(&self) -> &[SyntaxAnnotation] {
        self.green().annotations()
    }

    #[inline]
    pub fn has_annotation(&self, annotation: &SyntaxAnnotation) -> bool {
        self.green().has_annotation(annotation)
    }

    #[inline]
    pub fn has_annotations_of_kind(&self, kind: &str) -> bool {
        self.green().has_annotations_of_kind(kind)
    }

    #[inline]
    pub fn has_any_annotations(&self) -> bool {
        !self.annotations().is_empty()
    }

    pub fn annotations_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SyntaxAnnotation> + 'a {
        self.green().annotations_of_kind(kind)
    }

    /// Whether this node or anything below it, including trivia, carries annotations.
    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.green().contains_annotations()
    }

    /// Returns the root of a new tree whose green node is this node's, with `annotations` added.
    pub fn with_additional_annotations<I>(&self, annotations: I) -> SyntaxNode<L>
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        SyntaxNode::new_root(self.green().with_additional_annotations(annotations))
    }

    /// Returns the root of a new tree whose green node is this node's, with `annotations` removed.
    pub fn without_annotations<'a, I>(&self, annotations: I) -> SyntaxNode<L>
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        SyntaxNode::new_root(self.green().without_annotations(annotations))
    }

    /// Returns the root of a new tree whose green node is this node's, without annotations of `kind`.
    pub fn without_annotations_of_kind(&self, kind: &str) -> SyntaxNode<L> {
        SyntaxNode::new_root(self.green().without_annotations_of_kind(kind))
    }

    /// The text of this node, including its outer trivia.
    pub fn to_full_string(&self) -> String {
        self.green().to_full_string()
    }

    /// Writes an indented dump of this subtree, one element per line, into `target`.
    pub fn write_debug_tree(&self, target: &mut impl fmt::Write) -> fmt::Result {
        enum Item<L: Language> {
            Element(SyntaxElement<L>),
            Trivia(SyntaxTrivia<L>, &'static str),
        }

        let mut stack = vec![(Item::Element(NodeOrToken::Node(self.clone())), 0usize)];
        while let Some((item, depth)) = stack.pop() {
            for _ in 0..depth {
                target.write_str("  ")?;
            }
            match item {
                Item::Element(NodeOrToken::Node(node)) => {
                    writeln!(target, "{node:?}")?;
                    let children: Vec<_> = node.children_with_tokens().collect();
                    stack.extend(children.into_iter().rev().map(|child| (Item::Element(child), depth + 1)));
                }
                Item::Element(NodeOrToken::Token(token)) => {
                    writeln!(target, "{token:?}")?;
                    let trivia = token
                        .leading_trivia()
                        .iter()
                        .map(|trivia| (trivia, "leading"))
                        .chain(token.trailing_trivia().iter().map(|trivia| (trivia, "trailing")))
                        .collect::<Vec<_>>();
                    stack.extend(
                        trivia
                            .into_iter()
                            .rev()
                            .map(|(trivia, edge)| (Item::Trivia(trivia, edge), depth + 1)),
                    );
                }
                Item::Trivia(trivia, edge) => {
                    writeln!(target, "{edge} {trivia:?}")?;
                    if let Some(structure) = trivia.structure() {
                        stack.push((Item::Element(NodeOrToken::Node(structure)), depth + 1));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns an indented dump of this subtree, one element per line.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        // `fmt::Write` for `String` never fails
        let _ = self.write_debug_tree(&mut out);
        out
    }
}

impl<L: Language> SyntaxElement<L> {
    #[inline]
    pub(crate) fn from_raw(raw: RawElement) -> Self {
        match raw {
            NodeOrToken::Node(node) => NodeOrToken::Node(SyntaxNode::from_raw(node)),
            NodeOrToken::Token(token) => NodeOrToken::Token(SyntaxToken::from_raw(token)),
        }
    }
}

impl<L: Language> fmt::Debug for SyntaxNode<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.full_span())
    }
}

/// Writes the text of the node without its outer trivia.
impl<L: Language> fmt::Display for SyntaxNode<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.green().write_to(f, false, false)
    }
}
