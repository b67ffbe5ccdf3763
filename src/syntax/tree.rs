//! Untyped red handles.
//!
//! A positioned node is a green node together with its absolute offset and *how* it was reached (its [`Origin`]).
//! The origin of a child holds a handle to its parent, so parent links point upwards only: nodes never reference their
//! children, which means there are no cycles and a child is released as soon as its last handle is dropped. Handles are
//! created anew on every navigation. Two handles are equal if they stand for the same position in the same tree.
//!
//! Token lists with more than one token are stored as [`SyntaxKind::LIST`](crate::SyntaxKind::LIST) nodes in the green
//! tree. This module never hands out such a node: the tokens of a list are children of the node owning the list slot,
//! and carry their index within the list next to the slot index.
//!
//! The typed `SyntaxNode<L>`, `SyntaxToken<L>` and `SyntaxTrivia<L>` are thin wrappers around the handles in this
//! module. The traversal engine works on the handles directly, which lets its stacks be pooled independently of `L`.

use std::{
    hash::{Hash, Hasher},
    mem,
    ops::Deref,
    sync::Arc,
};

use crate::{
    green::{GreenElement, GreenElementRef, GreenNode, GreenToken, GreenTrivia},
    NodeOrToken, TextRange, TextSize,
};

/// How a node was reached.
#[derive(Clone)]
enum Origin {
    Root,
    Child { parent: RawNode, slot: usize },
    /// Root of the structure of a trivia.
    Structure(RawTrivia),
}

pub(crate) struct NodeData {
    pub(crate) green:  GreenNode,
    pub(crate) offset: TextSize,
    origin:            Origin,
}

impl Drop for NodeData {
    fn drop(&mut self) {
        // unlink the ancestors one at a time, dropping a long chain must not recurse once per level
        let mut origin = mem::replace(&mut self.origin, Origin::Root);
        loop {
            let parent = match origin {
                Origin::Root => return,
                Origin::Child { parent, .. } => parent,
                Origin::Structure(trivia) => match trivia.token.and_then(|token| token.parent) {
                    Some(parent) => parent,
                    None => return,
                },
            };
            match Arc::try_unwrap(parent.0) {
                Ok(mut data) => origin = mem::replace(&mut data.origin, Origin::Root),
                // someone else still holds the parent
                Err(_) => return,
            }
        }
    }
}

/// An untyped positioned node.
#[derive(Clone)]
pub(crate) struct RawNode(Arc<NodeData>);

impl Deref for RawNode {
    type Target = NodeData;

    #[inline]
    fn deref(&self) -> &NodeData {
        &self.0
    }
}

/// An untyped positioned token. `parent` is `None` for tokens that are not part of any tree.
#[derive(Clone)]
pub(crate) struct RawToken {
    pub(crate) parent: Option<RawNode>,
    pub(crate) green:  GreenToken,
    pub(crate) offset: TextSize,
    /// Slot of the token in `parent`.
    pub(crate) index:  usize,
    /// Index within the token list in that slot, `0` if the slot holds only this token.
    pub(crate) item:   usize,
}

/// An untyped positioned trivia. `index` counts through the leading and then the trailing trivia of `token`.
#[derive(Clone)]
pub(crate) struct RawTrivia {
    pub(crate) token:  Option<RawToken>,
    pub(crate) green:  GreenTrivia,
    pub(crate) offset: TextSize,
    pub(crate) index:  usize,
}

pub(crate) type RawElement = NodeOrToken<RawNode, RawToken>;

impl RawNode {
    pub(crate) fn new_root(green: GreenNode) -> RawNode {
        Self::new(green, 0.into(), Origin::Root)
    }

    #[inline]
    fn new(green: GreenNode, offset: TextSize, origin: Origin) -> RawNode {
        RawNode(Arc::new(NodeData { green, offset, origin }))
    }

    #[inline]
    pub(crate) fn full_span(&self) -> TextRange {
        TextRange::at(self.offset, self.green.full_len())
    }

    #[inline]
    pub(crate) fn is_root(&self) -> bool {
        matches!(self.origin, Origin::Root)
    }

    /// Number of red children in `slot`: none if it is absent, every token of a token list, one otherwise.
    ///
    /// ## Panics
    /// If `slot` is out of range for this node.
    pub(crate) fn slot_len(&self, slot: usize) -> usize {
        match self.green.slot(slot) {
            None => 0,
            Some(NodeOrToken::Node(node)) if node.kind().is_list() => node.slot_count(),
            Some(_) => 1,
        }
    }

    /// Child number `item` of `slot`, see [`slot_len`](RawNode::slot_len).
    ///
    /// ## Panics
    /// If `slot` is out of range for this node.
    pub(crate) fn child_in_slot(&self, slot: usize, item: usize) -> Option<RawElement> {
        let offset = self.offset + self.green.slot_offset(slot);
        match self.green.slot(slot)? {
            NodeOrToken::Node(list) if list.kind().is_list() => {
                if item >= list.slot_count() {
                    return None;
                }
                let token = match list.slot(item)? {
                    NodeOrToken::Token(token) => token,
                    NodeOrToken::Node(node) => {
                        debug_assert!(false, "token list holds a `{:?}` node", node.kind());
                        return None;
                    }
                };
                Some(NodeOrToken::Token(RawToken {
                    parent: Some(self.clone()),
                    green: token.clone(),
                    offset: offset + list.slot_offset(item),
                    index: slot,
                    item,
                }))
            }
            _ if item > 0 => None,
            NodeOrToken::Node(node) => Some(NodeOrToken::Node(self.child_at(node, offset, slot))),
            NodeOrToken::Token(token) => Some(NodeOrToken::Token(RawToken {
                parent: Some(self.clone()),
                green: token.clone(),
                offset,
                index: slot,
                item: 0,
            })),
        }
    }

    fn child_at(&self, green: &GreenNode, offset: TextSize, slot: usize) -> RawNode {
        RawNode::new(green.clone(), offset, Origin::Child {
            parent: self.clone(),
            slot,
        })
    }

    /// The first child in `slot`, or `None` if the slot is absent.
    ///
    /// ## Panics
    /// If `slot` is out of range for this node.
    #[inline]
    pub(crate) fn child(&self, slot: usize) -> Option<RawElement> {
        self.child_in_slot(slot, 0)
    }

    /// The child node in `slot`, without creating token handles. Token lists are not nodes.
    pub(crate) fn child_node(&self, slot: usize) -> Option<RawNode> {
        match self.green.slot(slot)? {
            NodeOrToken::Node(node) if !node.kind().is_list() => {
                let offset = self.offset + self.green.slot_offset(slot);
                Some(self.child_at(node, offset, slot))
            }
            _ => None,
        }
    }

    /// Whether a green slot element is a node of the red tree, that is, a node other than a token list.
    #[inline]
    pub(crate) fn is_red_node(green: GreenElementRef<'_>) -> bool {
        matches!(green, NodeOrToken::Node(node) if !node.kind().is_list())
    }

    /// The first child after position `(slot, item)`.
    pub(crate) fn next_child_after(&self, slot: usize, item: usize) -> Option<RawElement> {
        if item + 1 < self.slot_len(slot) {
            return self.child_in_slot(slot, item + 1);
        }
        (slot + 1..self.green.slot_count()).find_map(|slot| self.child(slot))
    }

    /// The last child before position `(slot, item)`.
    pub(crate) fn prev_child_before(&self, slot: usize, item: usize) -> Option<RawElement> {
        if item > 0 {
            return self.child_in_slot(slot, item - 1);
        }
        (0..slot).rev().find_map(|slot| {
            let len = self.slot_len(slot);
            self.child_in_slot(slot, len.checked_sub(1)?)
        })
    }

    pub(crate) fn parent(&self) -> Option<RawNode> {
        match &self.origin {
            Origin::Child { parent, .. } => Some(parent.clone()),
            Origin::Root | Origin::Structure(_) => None,
        }
    }

    /// Slot of this node in its parent, if it has one.
    pub(crate) fn index(&self) -> Option<usize> {
        match self.origin {
            Origin::Child { slot, .. } => Some(slot),
            Origin::Root | Origin::Structure(_) => None,
        }
    }

    /// The trivia this node is the structure of.
    pub(crate) fn parent_trivia(&self) -> Option<RawTrivia> {
        match &self.origin {
            Origin::Structure(trivia) => Some(trivia.clone()),
            Origin::Root | Origin::Child { .. } => None,
        }
    }

    /// The outermost node reachable through parents and the tokens owning structured trivia.
    pub(crate) fn root(&self) -> RawNode {
        let mut node = self.clone();
        loop {
            let next = match &node.origin {
                Origin::Root => return node,
                Origin::Child { parent, .. } => parent.clone(),
                Origin::Structure(trivia) => match trivia.token.as_ref().and_then(|token| token.parent.as_ref()) {
                    Some(parent) => parent.clone(),
                    None => return node,
                },
            };
            node = next;
        }
    }

    /// The green root that results from putting `token` into position `(slot, item)` of this node.
    pub(crate) fn replace_token(&self, slot: usize, item: usize, token: GreenToken) -> GreenNode {
        let replacement: GreenElement = match self.green.slot(slot) {
            Some(NodeOrToken::Node(list)) if list.kind().is_list() => list.replace_slot(item, Some(token.into())).into(),
            _ => token.into(),
        };
        self.green.replace_slot(slot, Some(replacement))
    }
}

impl PartialEq for RawNode {
    fn eq(&self, other: &Self) -> bool {
        let (mut this, mut other) = (self, other);
        loop {
            if Arc::ptr_eq(&this.0, &other.0) {
                return true;
            }
            if this.offset != other.offset || !this.green.ptr_eq(&other.green) {
                return false;
            }
            match (&this.origin, &other.origin) {
                (Origin::Child { parent: a, slot: i }, Origin::Child { parent: b, slot: j }) if i == j => {
                    this = a;
                    other = b;
                }
                (Origin::Structure(a), Origin::Structure(b)) => return a == b,
                // distinct roots are distinct trees
                _ => return false,
            }
        }
    }
}

impl Eq for RawNode {}

impl Hash for RawNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.green.kind().hash(state);
        self.offset.hash(state);
        self.index().hash(state);
    }
}

impl RawToken {
    /// A token that does not belong to any tree, positioned at zero.
    pub(crate) fn detached(green: GreenToken) -> RawToken {
        Self::detached_at(green, 0.into(), 0)
    }

    pub(crate) fn detached_at(green: GreenToken, offset: TextSize, item: usize) -> RawToken {
        RawToken {
            parent: None,
            green,
            offset,
            index: 0,
            item,
        }
    }

    #[inline]
    pub(crate) fn full_span(&self) -> TextRange {
        TextRange::at(self.offset, self.green.full_len())
    }

    /// Offset of the first trailing trivia.
    #[inline]
    pub(crate) fn trailing_offset(&self) -> TextSize {
        self.offset + self.green.leading_trivia().full_len() + self.green.width()
    }

    /// Trivia number `index`, counting leading trivia first.
    pub(crate) fn trivia(&self, index: usize) -> Option<RawTrivia> {
        let leading = self.green.leading_trivia();
        let (list, mut offset, local) = if index < leading.len() {
            (leading, self.offset, index)
        } else {
            (self.green.trailing_trivia(), self.trailing_offset(), index - leading.len())
        };
        let green = list.get(local)?;
        for before in &list.as_slice()[..local] {
            offset += before.full_len();
        }
        Some(RawTrivia {
            token: Some(self.clone()),
            green: green.clone(),
            offset,
            index,
        })
    }

    /// The next sibling of this token in its parent.
    pub(crate) fn next_sibling(&self) -> Option<RawElement> {
        self.parent.as_ref()?.next_child_after(self.index, self.item)
    }

    /// The previous sibling of this token in its parent.
    pub(crate) fn prev_sibling(&self) -> Option<RawElement> {
        self.parent.as_ref()?.prev_child_before(self.index, self.item)
    }
}

impl PartialEq for RawToken {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.index == other.index
            && self.item == other.item
            && self.green.ptr_eq(&other.green)
            && self.parent == other.parent
    }
}

impl Eq for RawToken {}

impl Hash for RawToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent.hash(state);
        self.offset.hash(state);
        self.index.hash(state);
        self.item.hash(state);
    }
}

impl RawTrivia {
    /// A trivia that does not belong to any token, positioned at zero.
    pub(crate) fn detached(green: GreenTrivia) -> RawTrivia {
        RawTrivia {
            token: None,
            green,
            offset: 0.into(),
            index: 0,
        }
    }

    #[inline]
    pub(crate) fn full_span(&self) -> TextRange {
        TextRange::at(self.offset, self.green.full_len())
    }

    /// The positioned root of this trivia's structure. The root remembers this trivia as its parent trivia, also if
    /// the trivia is not attached to a token.
    pub(crate) fn structure(&self) -> Option<RawNode> {
        let structure = self.green.structure()?;
        Some(RawNode::new(structure.clone(), self.offset, Origin::Structure(self.clone())))
    }
}

impl PartialEq for RawTrivia {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.index == other.index
            && self.green.ptr_eq(&other.green)
            && self.token == other.token
    }
}

impl Eq for RawTrivia {}

impl Hash for RawTrivia {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.offset.hash(state);
        self.index.hash(state);
    }
}
