//! Implementation of the inner, "green" tree.
//!
//! Green elements know their kind, their children or text, and their width, but not where they are. That makes them
//! shareable: the same `GreenNode` may appear in many places of many trees. The [`GreenNodeBuilder`] is the main entry
//! point to constructing [`GreenNode`]s, [`GreenToken`]s and [`GreenTrivia`].

mod builder;
mod element;
mod iter;
mod node;
mod token;
mod trivia;

pub(crate) use self::element::{token_list_slot, GreenFlags};

pub use self::{
    builder::{Checkpoint, GreenNodeBuilder, NodeCache},
    element::{GreenElement, GreenElementRef},
    iter::{Children, Slots},
    node::GreenNode,
    token::GreenToken,
    trivia::{GreenTrivia, GreenTriviaList},
};
