//! Implementation of the outer, "red" tree.
//!
//! Red elements pair a green element with its absolute position in the source. They are created on demand while
//! navigating and may be dropped freely. A node holds a counted reference to its parent only, never to its children,
//! so a subtree stays alive exactly as long as some handle into it does. Token lists are not nodes of the red tree:
//! their tokens are children of the node that owns the list.

mod element;
mod iter;
mod list;
mod node;
mod token;
pub(crate) mod tree;
mod trivia;

pub use self::{
    element::SyntaxElement,
    iter::{Ancestors, SyntaxElementChildren, SyntaxNodeChildren},
    list::{
        ReversedTokenList, ReversedTriviaList, SyntaxTokenList, SyntaxTokenListIter, SyntaxTriviaList,
        SyntaxTriviaListIter,
    },
    node::SyntaxNode,
    token::SyntaxToken,
    trivia::SyntaxTrivia,
};
