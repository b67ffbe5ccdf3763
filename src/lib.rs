//! `greenwood` is an immutable red/green syntax tree library for compiler front ends.
//!
//! Trees come in two layers:
//! - The *green* layer ([`GreenNode`], [`GreenToken`], [`GreenTrivia`]) holds kinds, child slots, text and
//!   widths, but no absolute positions and no parents. Green elements are immutable, atomically reference counted
//!   and freely shared between trees and threads. Identical small subtrees are deduplicated by a [`NodeCache`].
//! - The *red* layer ([`SyntaxNode`], [`SyntaxToken`], [`SyntaxTrivia`]) pairs a green element with its absolute
//!   offset and a way to find its parent. Red nodes are created lazily while navigating and are cheap to drop.
//!
//! Every character of the source, including whitespace and comments, lives in the tree as *trivia* attached to the
//! leading or trailing edge of a token, so `node.to_full_string()` reproduces the parsed text exactly. Trivia may be
//! *structured*: its content is then itself a green node which can be navigated like any other subtree.
//!
//! Any element can carry [`SyntaxAnnotation`]s. Annotations compare by a process-unique id, so they keep
//! identifying "the same" element after a rewrite copies it into a brand new tree.
//!
//! Traversals ([`SyntaxNode::descendant_nodes`] and friends) run on explicit, pooled stacks and can be bounded by a
//! text range, pruned by a predicate, and told to descend into structured trivia. See [`TraversalOptions`].
#![forbid(unconditional_recursion, future_incompatible)]
#![deny(unsafe_code)]

pub mod annotation;
mod error;
pub mod green;
#[cfg(feature = "serde1")]
mod serde_impls;
pub mod syntax;
pub mod traversal;
mod utility_types;

use std::fmt;

// Reexport types for working with strings.
pub use text_size::{TextLen, TextRange, TextSize};

pub use crate::{
    annotation::SyntaxAnnotation,
    error::SyntaxError,
    green::{
        Checkpoint, GreenElement, GreenNode, GreenNodeBuilder, GreenToken, GreenTrivia, GreenTriviaList, NodeCache,
    },
    syntax::{
        SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTokenList, SyntaxTrivia, SyntaxTriviaList,
    },
    traversal::TraversalOptions,
    utility_types::{Direction, NodeOrToken},
};

/// The raw kind tag of every tree element.
///
/// Kinds are opaque to the tree itself; a [`Language`] maps them to and from a typed representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyntaxKind(pub u16);

impl SyntaxKind {
    /// Kind of the shared node backing a token list with more than one element.
    pub const LIST: SyntaxKind = SyntaxKind(u16::MAX);

    /// Whether this is the reserved [`LIST`](SyntaxKind::LIST) kind.
    #[inline]
    pub fn is_list(self) -> bool {
        self == Self::LIST
    }
}

impl From<u16> for SyntaxKind {
    #[inline]
    fn from(raw: u16) -> Self {
        SyntaxKind(raw)
    }
}

/// Ties the raw [`SyntaxKind`] tags of a tree to the kind type of a concrete language.
///
/// The language type only ever appears as a type parameter of the red layer, so it is usually an uninhabited enum.
/// Implementations must be able to map [`SyntaxKind::LIST`], which is used for token lists with more than one
/// element.
pub trait Language: Sized + Clone + Copy + fmt::Debug + Eq + Ord + std::hash::Hash + 'static {
    type Kind: fmt::Debug + Copy + PartialEq;

    fn kind_from_raw(raw: SyntaxKind) -> Self::Kind;
    fn kind_to_raw(kind: Self::Kind) -> SyntaxKind;
}
