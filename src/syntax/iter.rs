//! Iterators over the children and ancestors of a syntax node.

use std::iter::FusedIterator;

use crate::{
    syntax::{tree::RawNode, SyntaxElement, SyntaxNode},
    Language,
};

/// Slot cursor shared by the child iterators.
#[derive(Clone)]
struct SlotRange {
    parent: RawNode,
    front:  usize,
    back:   usize,
}

impl SlotRange {
    fn new(parent: RawNode) -> Self {
        let back = parent.green.slot_count();
        Self { parent, front: 0, back }
    }

    fn next_with<T>(&mut self, mut f: impl FnMut(&RawNode, usize) -> Option<T>) -> Option<T> {
        while self.front < self.back {
            let slot = self.front;
            self.front += 1;
            if let Some(it) = f(&self.parent, slot) {
                return Some(it);
            }
        }
        None
    }

    fn next_back_with<T>(&mut self, mut f: impl FnMut(&RawNode, usize) -> Option<T>) -> Option<T> {
        while self.front < self.back {
            self.back -= 1;
            if let Some(it) = f(&self.parent, self.back) {
                return Some(it);
            }
        }
        None
    }
}

/// An iterator over the child nodes of a [`SyntaxNode`].
#[derive(Clone)]
pub struct SyntaxNodeChildren<L: Language> {
    slots: SlotRange,
    _lang: std::marker::PhantomData<L>,
}

impl<L: Language> SyntaxNodeChildren<L> {
    pub(super) fn new(parent: RawNode) -> Self {
        Self {
            slots: SlotRange::new(parent),
            _lang: std::marker::PhantomData,
        }
    }
}

impl<L: Language> Iterator for SyntaxNodeChildren<L> {
    type Item = SyntaxNode<L>;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .next_with(|parent, slot| parent.child_node(slot))
            .map(SyntaxNode::from_raw)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.back - self.slots.front))
    }
}

impl<L: Language> DoubleEndedIterator for SyntaxNodeChildren<L> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots
            .next_back_with(|parent, slot| parent.child_node(slot))
            .map(SyntaxNode::from_raw)
    }
}

impl<L: Language> FusedIterator for SyntaxNodeChildren<L> {}

/// Position of a child, as the slot and the index within that slot.
type Position = (usize, usize);

/// An iterator over the child nodes and tokens of a [`SyntaxNode`].
///
/// The tokens of a token list are yielded one by one, in place of the list.
#[derive(Clone)]
pub struct SyntaxElementChildren<L: Language> {
    parent: RawNode,
    front:  Position,
    /// Exclusive.
    back:   Position,
    _lang:  std::marker::PhantomData<L>,
}

impl<L: Language> SyntaxElementChildren<L> {
    pub(super) fn new(parent: RawNode) -> Self {
        let back = (parent.green.slot_count(), 0);
        Self {
            parent,
            front: (0, 0),
            back,
            _lang: std::marker::PhantomData,
        }
    }
}

impl<L: Language> Iterator for SyntaxElementChildren<L> {
    type Item = SyntaxElement<L>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let (slot, item) = self.front;
            if item >= self.parent.slot_len(slot) {
                self.front = (slot + 1, 0);
                continue;
            }
            self.front = (slot, item + 1);
            if let Some(child) = self.parent.child_in_slot(slot, item) {
                return Some(SyntaxElement::from_raw(child));
            }
        }
        None
    }
}

impl<L: Language> DoubleEndedIterator for SyntaxElementChildren<L> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let (slot, item) = self.back;
            if item == 0 {
                let prev = slot - 1;
                self.back = (prev, self.parent.slot_len(prev));
                continue;
            }
            self.back = (slot, item - 1);
            if let Some(child) = self.parent.child_in_slot(slot, item - 1) {
                return Some(SyntaxElement::from_raw(child));
            }
        }
        None
    }
}

impl<L: Language> FusedIterator for SyntaxElementChildren<L> {}

/// An iterator over a node and its ancestors.
///
/// Created by [`SyntaxNode::ancestors`] and [`SyntaxNode::ancestors_through_trivia`].
#[derive(Clone)]
pub struct Ancestors<L: Language> {
    next:           Option<SyntaxNode<L>>,
    through_trivia: bool,
}

impl<L: Language> Ancestors<L> {
    pub(super) fn new(start: SyntaxNode<L>, through_trivia: bool) -> Self {
        Self {
            next: Some(start),
            through_trivia,
        }
    }
}

impl<L: Language> Iterator for Ancestors<L> {
    type Item = SyntaxNode<L>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next.take()?;
        self.next = match node.parent() {
            Some(parent) => Some(parent),
            None if self.through_trivia => node
                .parent_trivia()
                .and_then(|trivia| trivia.token())
                .and_then(|token| token.parent()),
            None => None,
        };
        Some(node)
    }
}

impl<L: Language> FusedIterator for Ancestors<L> {}
