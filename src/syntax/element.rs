use crate::{
    syntax::{SyntaxNode, SyntaxToken},
    Direction, Language, NodeOrToken, SyntaxKind, TextRange, TextSize,
};

/// An element of the tree, can be either a node or a token.
pub type SyntaxElement<L> = NodeOrToken<SyntaxNode<L>, SyntaxToken<L>>;

impl<L: Language> From<SyntaxNode<L>> for SyntaxElement<L> {
    fn from(node: SyntaxNode<L>) -> SyntaxElement<L> {
        NodeOrToken::Node(node)
    }
}

impl<L: Language> From<SyntaxToken<L>> for SyntaxElement<L> {
    fn from(token: SyntaxToken<L>) -> SyntaxElement<L> {
        NodeOrToken::Token(token)
    }
}

impl<L: Language> SyntaxElement<L> {
    #[inline]
    pub fn kind(&self) -> L::Kind {
        match self {
            NodeOrToken::Node(it) => it.kind(),
            NodeOrToken::Token(it) => it.kind(),
        }
    }

    #[inline]
    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(it) => it.syntax_kind(),
            NodeOrToken::Token(it) => it.syntax_kind(),
        }
    }

    /// The range of this element without its outer trivia.
    #[inline]
    pub fn span(&self) -> TextRange {
        match self {
            NodeOrToken::Node(it) => it.span(),
            NodeOrToken::Token(it) => it.span(),
        }
    }

    #[inline]
    pub fn span_start(&self) -> TextSize {
        match self {
            NodeOrToken::Node(it) => it.span_start(),
            NodeOrToken::Token(it) => it.span_start(),
        }
    }

    #[inline]
    pub fn full_span(&self) -> TextRange {
        match self {
            NodeOrToken::Node(it) => it.full_span(),
            NodeOrToken::Token(it) => it.full_span(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode<L>> {
        match self {
            NodeOrToken::Node(it) => it.parent(),
            NodeOrToken::Token(it) => it.parent(),
        }
    }

    /// The slot of this element in its parent.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        match self {
            NodeOrToken::Node(it) => it.index(),
            NodeOrToken::Token(it) => it.parent().map(|_| it.index()),
        }
    }

    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<L>> {
        self.parent().into_iter().flat_map(|parent| parent.ancestors())
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement<L>> {
        match self {
            NodeOrToken::Node(it) => it.next_sibling_or_token(),
            NodeOrToken::Token(it) => it.next_sibling_or_token(),
        }
    }

    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement<L>> {
        match self {
            NodeOrToken::Node(it) => it.prev_sibling_or_token(),
            NodeOrToken::Token(it) => it.prev_sibling_or_token(),
        }
    }

    #[inline]
    pub fn sibling_or_token(&self, direction: Direction) -> Option<SyntaxElement<L>> {
        match direction {
            Direction::Next => self.next_sibling_or_token(),
            Direction::Prev => self.prev_sibling_or_token(),
        }
    }

    /// The text of this element including its outer trivia.
    pub fn to_full_string(&self) -> String {
        match self {
            NodeOrToken::Node(it) => it.to_full_string(),
            NodeOrToken::Token(it) => it.to_full_string(),
        }
    }
}
