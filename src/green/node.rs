use std::{
    fmt::{self, Write as _},
    hash::{Hash, Hasher},
    ptr,
};

use fxhash::FxHasher32;
use triomphe::ThinArc;

use crate::{
    annotation::{AnnotationSet, SyntaxAnnotation},
    green::{iter::Slots, Children, GreenElement, GreenElementRef, GreenFlags, GreenToken, GreenTrivia},
    NodeOrToken, SyntaxKind, TextSize,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct GreenNodeHead {
    pub(super) kind:        SyntaxKind,
    pub(super) full_len:    TextSize,
    pub(super) child_hash:  u32,
    pub(super) flags:       GreenFlags,
    pub(super) annotations: AnnotationSet,
}

/// A child slot of a green node.
///
/// Slots may be empty, which represents an absent optional element. The offset of the slot relative to the start of
/// its node is stored next to it, so that positioned children can be created without summing up their siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct GreenSlot {
    pub(crate) rel_offset: TextSize,
    pub(crate) element:    Option<GreenElement>,
}

/// Internal node in the immutable "green" tree.
/// It contains other nodes and tokens as its children.
#[derive(Clone)]
pub struct GreenNode {
    pub(super) data: ThinArc<GreenNodeHead, GreenSlot>,
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head();
        let mut s = f.debug_struct("GreenNode");
        s.field("kind", &head.kind).field("full_len", &head.full_len);
        if !head.annotations.is_empty() {
            s.field("annotations", &head.annotations);
        }
        s.field("slots", &self.data.slice.iter().map(|slot| &slot.element).collect::<Vec<_>>())
            .finish()
    }
}

impl GreenNode {
    /// Creates a new node from its children. There are no absent slots.
    #[inline]
    pub fn new<I>(kind: SyntaxKind, children: I) -> GreenNode
    where
        I: IntoIterator<Item = GreenElement>,
    {
        Self::with_slots(kind, children.into_iter().map(Some))
    }

    /// Creates a new node from its slots, which may be absent (`None`).
    pub fn with_slots<I>(kind: SyntaxKind, slots: I) -> GreenNode
    where
        I: IntoIterator<Item = Option<GreenElement>>,
    {
        let slots: Vec<Option<GreenElement>> = slots.into_iter().collect();
        let (full_len, child_hash) = measure(&slots);
        Self::from_parts(kind, slots, full_len, child_hash, AnnotationSet::EMPTY)
    }

    /// Creates a new node from its slots and a width computed by the caller.
    ///
    /// ## Panics
    /// In debug builds, if `full_len` is not the sum of the widths of all present slots.
    pub fn with_width<I>(kind: SyntaxKind, slots: I, full_len: TextSize) -> GreenNode
    where
        I: IntoIterator<Item = Option<GreenElement>>,
    {
        let slots: Vec<Option<GreenElement>> = slots.into_iter().collect();
        let (computed, child_hash) = measure(&slots);
        debug_assert_eq!(computed, full_len, "width of a `{kind:?}` node must equal the sum of its slots");
        Self::from_parts(kind, slots, full_len, child_hash, AnnotationSet::EMPTY)
    }

    pub(super) fn from_parts(
        kind: SyntaxKind,
        slots: Vec<Option<GreenElement>>,
        full_len: TextSize,
        child_hash: u32,
        annotations: AnnotationSet,
    ) -> GreenNode {
        let mut flags = GreenFlags::NONE;
        let mut rel_offset = TextSize::from(0);
        let slots: Vec<GreenSlot> = slots
            .into_iter()
            .map(|element| {
                let slot = GreenSlot { rel_offset, element };
                if let Some(element) = &slot.element {
                    rel_offset += element.full_len();
                    flags |= element.flags().inherited();
                }
                slot
            })
            .collect();
        debug_assert_eq!(rel_offset, full_len);
        if !annotations.is_empty() {
            flags |= GreenFlags::CONTAINS_ANNOTATIONS;
        }
        let head = GreenNodeHead {
            kind,
            full_len,
            child_hash,
            flags,
            annotations,
        };
        GreenNode {
            data: ThinArc::from_header_and_iter(head, slots.into_iter()),
        }
    }

    #[inline]
    pub(super) fn head(&self) -> &GreenNodeHead {
        &self.data.header.header
    }

    #[inline]
    pub(crate) fn raw_slots(&self) -> &[GreenSlot] {
        &self.data.slice
    }

    /// [`SyntaxKind`] of this node.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.head().kind
    }

    /// Returns the length of the text covered by this node, including all trivia.
    #[inline]
    pub fn full_len(&self) -> TextSize {
        self.head().full_len
    }

    /// Returns the length of the text covered by this node, without the leading trivia of its first token and the
    /// trailing trivia of its last token.
    pub fn width(&self) -> TextSize {
        let full_len = self.full_len();
        if full_len == 0.into() {
            return full_len;
        }
        full_len - self.leading_trivia_len() - self.trailing_trivia_len()
    }

    #[inline]
    pub(crate) fn flags(&self) -> GreenFlags {
        self.head().flags
    }

    /// Number of slots of this node, including absent ones.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.slice.len()
    }

    /// The element in slot `index`, or `None` if the slot is absent.
    ///
    /// ## Panics
    /// If `index` is not smaller than [`slot_count`](GreenNode::slot_count).
    #[inline]
    pub fn slot(&self, index: usize) -> Option<GreenElementRef<'_>> {
        self.checked_slot(index).element.as_ref().map(GreenElement::as_ref)
    }

    /// Offset of slot `index` relative to the start of this node.
    ///
    /// ## Panics
    /// If `index` is not smaller than [`slot_count`](GreenNode::slot_count).
    #[inline]
    pub fn slot_offset(&self, index: usize) -> TextSize {
        self.checked_slot(index).rel_offset
    }

    fn checked_slot(&self, index: usize) -> &GreenSlot {
        let count = self.slot_count();
        match self.data.slice.get(index) {
            Some(slot) => slot,
            None => panic!("slot index {index} out of range for `{:?}` node with {count} slots", self.kind()),
        }
    }

    /// Iterator over all slots of this node, including absent ones.
    #[inline]
    pub fn slots(&self) -> Slots<'_> {
        Slots::new(self.data.slice.iter())
    }

    /// Iterator over all present children of this node.
    #[inline]
    pub fn children(&self) -> Children<'_> {
        Children::new(self.data.slice.iter())
    }

    /// Whether this node or any element below it carries annotations.
    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.flags().contains(GreenFlags::CONTAINS_ANNOTATIONS)
    }

    /// Whether any token below this node has structured trivia.
    #[inline]
    pub fn contains_structured_trivia(&self) -> bool {
        self.flags().contains(GreenFlags::CONTAINS_STRUCTURED_TRIVIA)
    }

    /// Whether both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &GreenNode) -> bool {
        ptr::eq(self.head(), other.head())
    }

    /// The first token of this node, descending through first present slots.
    pub fn first_token(&self) -> Option<&GreenToken> {
        let mut node = self;
        loop {
            match node.children().next()? {
                NodeOrToken::Node(child) => node = child,
                NodeOrToken::Token(token) => return Some(token),
            }
        }
    }

    /// The last token of this node, descending through last present slots.
    pub fn last_token(&self) -> Option<&GreenToken> {
        let mut node = self;
        loop {
            match node.children().next_back()? {
                NodeOrToken::Node(child) => node = child,
                NodeOrToken::Token(token) => return Some(token),
            }
        }
    }

    /// Width of the leading trivia of [`first_token`](GreenNode::first_token).
    pub fn leading_trivia_len(&self) -> TextSize {
        self.first_token()
            .map(|token| token.leading_trivia().full_len())
            .unwrap_or_default()
    }

    /// Width of the trailing trivia of [`last_token`](GreenNode::last_token).
    pub fn trailing_trivia_len(&self) -> TextSize {
        self.last_token()
            .map(|token| token.trailing_trivia().full_len())
            .unwrap_or_default()
    }

    /// Returns a node of the same shape with `element` in slot `index`.
    ///
    /// ## Panics
    /// If `index` is not smaller than [`slot_count`](GreenNode::slot_count).
    pub fn replace_slot(&self, index: usize, element: Option<GreenElement>) -> GreenNode {
        self.checked_slot(index);
        let mut slots: Vec<Option<GreenElement>> = self.data.slice.iter().map(|slot| slot.element.clone()).collect();
        slots[index] = element;
        let (full_len, child_hash) = measure(&slots);
        Self::from_parts(self.kind(), slots, full_len, child_hash, self.head().annotations.clone())
    }

    /// Writes the text of this node to `out`.
    ///
    /// `leading` and `trailing` control whether the leading trivia of the first token and the trailing trivia of the
    /// last token are included.
    pub fn write_to(&self, out: &mut impl fmt::Write, leading: bool, trailing: bool) -> fmt::Result {
        let mut stack = vec![WriteItem::Node(self, leading, trailing)];
        while let Some(item) = stack.pop() {
            match item {
                WriteItem::Node(node, leading, trailing) => {
                    let first = node.data.slice.iter().position(|slot| slot.element.is_some());
                    let last = node.data.slice.iter().rposition(|slot| slot.element.is_some());
                    let (Some(first), Some(last)) = (first, last) else {
                        continue;
                    };
                    for (index, slot) in node.data.slice.iter().enumerate().rev() {
                        let leading = leading || index != first;
                        let trailing = trailing || index != last;
                        match &slot.element {
                            Some(NodeOrToken::Node(child)) => stack.push(WriteItem::Node(child, leading, trailing)),
                            Some(NodeOrToken::Token(token)) => stack.push(WriteItem::Token(token, leading, trailing)),
                            None => {}
                        }
                    }
                }
                WriteItem::Token(token, leading, trailing) => {
                    if trailing {
                        stack.extend(token.trailing_trivia().iter().rev().map(WriteItem::Trivia));
                    }
                    stack.push(WriteItem::Text(token.text()));
                    if leading {
                        stack.extend(token.leading_trivia().iter().rev().map(WriteItem::Trivia));
                    }
                }
                WriteItem::Trivia(trivia) => match trivia.structure() {
                    Some(structure) => stack.push(WriteItem::Node(structure, true, true)),
                    None => stack.push(WriteItem::Text(trivia.text().unwrap_or_default())),
                },
                WriteItem::Text(text) => out.write_str(text)?,
            }
        }
        Ok(())
    }

    /// The complete text of this node, including all trivia.
    pub fn to_full_string(&self) -> String {
        let mut buf = String::with_capacity(u32::from(self.full_len()) as usize);
        let _ = self.write_to(&mut buf, true, true);
        buf
    }

    /// Structural equality that ignores annotations.
    pub fn is_equivalent_to(&self, other: &GreenNode) -> bool {
        let mut stack: Vec<(GreenElementRef<'_>, GreenElementRef<'_>)> = vec![(self.into(), other.into())];
        while let Some(pair) = stack.pop() {
            match pair {
                (NodeOrToken::Node(a), NodeOrToken::Node(b)) => {
                    if a.ptr_eq(b) {
                        continue;
                    }
                    if a.kind() != b.kind() || a.full_len() != b.full_len() || a.slot_count() != b.slot_count() {
                        return false;
                    }
                    for (a, b) in a.slots().zip(b.slots()) {
                        match (a, b) {
                            (None, None) => {}
                            (Some(a), Some(b)) => stack.push((a, b)),
                            _ => return false,
                        }
                    }
                }
                (NodeOrToken::Token(a), NodeOrToken::Token(b)) => {
                    if !a.is_equivalent_to(b) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    /// The annotations attached to this node itself.
    #[inline]
    pub fn annotations(&self) -> &[SyntaxAnnotation] {
        self.head().annotations.as_slice()
    }

    pub fn has_annotation(&self, annotation: &SyntaxAnnotation) -> bool {
        self.head().annotations.contains(annotation)
    }

    pub fn has_annotations_of_kind(&self, kind: &str) -> bool {
        self.head().annotations.has_kind(kind)
    }

    pub fn annotations_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SyntaxAnnotation> + 'a {
        self.head().annotations.of_kind(kind)
    }

    /// Returns this node with `annotations` attached in addition to the ones already present.
    pub fn with_additional_annotations<I>(&self, annotations: I) -> GreenNode
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        match self.head().annotations.with_added(annotations) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    /// Returns this node without any of the given `annotations`.
    pub fn without_annotations<'a, I>(&self, annotations: I) -> GreenNode
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        let remove: Vec<&SyntaxAnnotation> = annotations.into_iter().collect();
        match self.head().annotations.with_removed(|a| remove.contains(&a)) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    /// Returns this node without any annotations of the given `kind`.
    pub fn without_annotations_of_kind(&self, kind: &str) -> GreenNode {
        match self.head().annotations.with_removed(|a| a.is_kind(kind)) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    fn with_annotation_set(&self, annotations: AnnotationSet) -> GreenNode {
        let head = self.head();
        let slots = self.data.slice.iter().map(|slot| slot.element.clone()).collect();
        Self::from_parts(head.kind, slots, head.full_len, head.child_hash, annotations)
    }
}

enum WriteItem<'a> {
    Node(&'a GreenNode, bool, bool),
    Token(&'a GreenToken, bool, bool),
    Trivia(&'a GreenTrivia),
    Text(&'a str),
}

/// Total width and child hash of a list of slots.
pub(super) fn measure(slots: &[Option<GreenElement>]) -> (TextSize, u32) {
    let mut hasher = FxHasher32::default();
    let mut full_len = TextSize::from(0);
    for slot in slots {
        if let Some(element) = slot {
            full_len += element.full_len();
        }
        slot.hash(&mut hasher);
    }
    (full_len, hasher.finish() as u32)
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, true, true)
    }
}

impl Hash for GreenNode {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.head().hash(state);
    }
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.head() == other.head() && self.data.slice == other.data.slice)
    }
}

impl Eq for GreenNode {}
