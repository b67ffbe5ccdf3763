use std::{fmt, ops};

use super::{GreenNode, GreenToken};
use crate::{NodeOrToken, SyntaxKind, TextSize};

/// A green node or token, owned.
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// A green node or token, borrowed.
pub type GreenElementRef<'a> = NodeOrToken<&'a GreenNode, &'a GreenToken>;

/// Summary bits stored on every green element.
///
/// `CONTAINS_ANNOTATIONS` and `CONTAINS_STRUCTURED_TRIVIA` describe the whole subtree and propagate to parents.
/// `IS_MISSING` only describes the element itself.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct GreenFlags(u8);

impl GreenFlags {
    pub(crate) const NONE: GreenFlags = GreenFlags(0);
    pub(crate) const CONTAINS_ANNOTATIONS: GreenFlags = GreenFlags(1 << 0);
    pub(crate) const CONTAINS_STRUCTURED_TRIVIA: GreenFlags = GreenFlags(1 << 1);
    pub(crate) const IS_MISSING: GreenFlags = GreenFlags(1 << 2);

    const INHERITED: GreenFlags = GreenFlags(Self::CONTAINS_ANNOTATIONS.0 | Self::CONTAINS_STRUCTURED_TRIVIA.0);

    #[inline]
    pub(crate) fn contains(self, other: GreenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// The part of these flags that only describes the element itself.
    #[inline]
    pub(crate) fn local(self) -> GreenFlags {
        GreenFlags(self.0 & !Self::INHERITED.0)
    }

    /// The part of these flags a parent inherits.
    #[inline]
    pub(crate) fn inherited(self) -> GreenFlags {
        GreenFlags(self.0 & Self::INHERITED.0)
    }
}

impl ops::BitOr for GreenFlags {
    type Output = GreenFlags;

    #[inline]
    fn bitor(self, rhs: GreenFlags) -> GreenFlags {
        GreenFlags(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for GreenFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: GreenFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for GreenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_set();
        if self.contains(Self::CONTAINS_ANNOTATIONS) {
            list.entry(&"CONTAINS_ANNOTATIONS");
        }
        if self.contains(Self::CONTAINS_STRUCTURED_TRIVIA) {
            list.entry(&"CONTAINS_STRUCTURED_TRIVIA");
        }
        if self.contains(Self::IS_MISSING) {
            list.entry(&"IS_MISSING");
        }
        list.finish()
    }
}

impl From<GreenNode> for GreenElement {
    #[inline]
    fn from(node: GreenNode) -> GreenElement {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    #[inline]
    fn from(token: GreenToken) -> GreenElement {
        NodeOrToken::Token(token)
    }
}

impl<'a> From<&'a GreenNode> for GreenElementRef<'a> {
    #[inline]
    fn from(node: &'a GreenNode) -> GreenElementRef<'a> {
        NodeOrToken::Node(node)
    }
}

impl<'a> From<&'a GreenToken> for GreenElementRef<'a> {
    #[inline]
    fn from(token: &'a GreenToken) -> GreenElementRef<'a> {
        NodeOrToken::Token(token)
    }
}

impl GreenElement {
    /// Returns kind of this element.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.as_ref().kind()
    }

    /// Returns the length of the text covered by this element, including trivia.
    #[inline]
    pub fn full_len(&self) -> TextSize {
        self.as_ref().full_len()
    }

    #[inline]
    pub(crate) fn flags(&self) -> GreenFlags {
        self.as_ref().flags()
    }
}

impl GreenElementRef<'_> {
    /// Returns kind of this element.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(it) => it.kind(),
            NodeOrToken::Token(it) => it.kind(),
        }
    }

    /// Returns the length of the text covered by this element, including trivia.
    #[inline]
    pub fn full_len(self) -> TextSize {
        match self {
            NodeOrToken::Node(it) => it.full_len(),
            NodeOrToken::Token(it) => it.full_len(),
        }
    }

    #[inline]
    pub(crate) fn flags(self) -> GreenFlags {
        match self {
            NodeOrToken::Node(it) => it.flags(),
            NodeOrToken::Token(it) => it.flags(),
        }
    }

    /// Width of the leading trivia of the first token in this element.
    pub fn leading_trivia_len(self) -> TextSize {
        match self {
            NodeOrToken::Node(it) => it.leading_trivia_len(),
            NodeOrToken::Token(it) => it.leading_trivia().full_len(),
        }
    }

    /// Width of the trailing trivia of the last token in this element.
    pub fn trailing_trivia_len(self) -> TextSize {
        match self {
            NodeOrToken::Node(it) => it.trailing_trivia_len(),
            NodeOrToken::Token(it) => it.trailing_trivia().full_len(),
        }
    }
}

/// Turns a sequence of tokens into the content of a token-list slot, using the smallest shape for its length:
/// nothing, the token itself, or a [`SyntaxKind::LIST`] node.
pub(crate) fn token_list_slot(mut tokens: Vec<GreenToken>) -> Option<GreenElement> {
    match tokens.len() {
        0 => None,
        1 => tokens.pop().map(GreenElement::from),
        _ => Some(GreenNode::new(SyntaxKind::LIST, tokens.into_iter().map(GreenElement::from)).into()),
    }
}
