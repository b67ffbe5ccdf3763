use std::{
    fmt,
    hash::{Hash, Hasher},
    ptr, slice,
};

use triomphe::{Arc, ThinArc};

use crate::{
    annotation::{AnnotationSet, SyntaxAnnotation},
    green::{GreenFlags, GreenNode},
    SyntaxKind, TextLen, TextSize,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) enum TriviaContent {
    Text(Box<str>),
    Structure(GreenNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct GreenTriviaData {
    pub(super) kind:        SyntaxKind,
    pub(super) content:     TriviaContent,
    pub(super) flags:       GreenFlags,
    pub(super) annotations: AnnotationSet,
}

/// Whitespace, comments and other text without meaning to the grammar, attached to one side of a token.
///
/// *Structured* trivia holds a [`GreenNode`] instead of plain text, e.g. for preprocessor directives or
/// documentation comments that have a syntax of their own.
#[derive(Clone)]
pub struct GreenTrivia {
    data: Arc<GreenTriviaData>,
}

impl GreenTrivia {
    /// Creates plain text trivia.
    pub fn new(kind: SyntaxKind, text: &str) -> GreenTrivia {
        Self::from_data(GreenTriviaData {
            kind,
            content: TriviaContent::Text(text.into()),
            flags: GreenFlags::NONE,
            annotations: AnnotationSet::EMPTY,
        })
    }

    /// Creates trivia whose content is the syntax tree `structure`.
    pub fn structured(kind: SyntaxKind, structure: GreenNode) -> GreenTrivia {
        let flags = structure.flags().inherited() | GreenFlags::CONTAINS_STRUCTURED_TRIVIA;
        Self::from_data(GreenTriviaData {
            kind,
            content: TriviaContent::Structure(structure),
            flags,
            annotations: AnnotationSet::EMPTY,
        })
    }

    /// Creates plain text trivia marked with the [elastic](SyntaxAnnotation::elastic) annotation.
    pub fn elastic(kind: SyntaxKind, text: &str) -> GreenTrivia {
        Self::new(kind, text).with_additional_annotations([SyntaxAnnotation::elastic()])
    }

    #[inline]
    pub(super) fn from_data(data: GreenTriviaData) -> GreenTrivia {
        GreenTrivia { data: Arc::new(data) }
    }

    #[inline]
    pub(super) fn data(&self) -> &GreenTriviaData {
        &self.data
    }

    /// [`SyntaxKind`] of this trivia.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// The text of plain trivia, `None` for structured trivia.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match &self.data.content {
            TriviaContent::Text(text) => Some(text),
            TriviaContent::Structure(_) => None,
        }
    }

    /// The syntax tree of structured trivia.
    #[inline]
    pub fn structure(&self) -> Option<&GreenNode> {
        match &self.data.content {
            TriviaContent::Text(_) => None,
            TriviaContent::Structure(node) => Some(node),
        }
    }

    #[inline]
    pub fn has_structure(&self) -> bool {
        self.structure().is_some()
    }

    /// Length of all text covered by this trivia.
    #[inline]
    pub fn full_len(&self) -> TextSize {
        match &self.data.content {
            TriviaContent::Text(text) => text.text_len(),
            TriviaContent::Structure(node) => node.full_len(),
        }
    }

    /// Length of the text covered by this trivia without the outer trivia of its structure.
    ///
    /// Equal to [`full_len`](GreenTrivia::full_len) for plain trivia.
    #[inline]
    pub fn width(&self) -> TextSize {
        match &self.data.content {
            TriviaContent::Text(text) => text.text_len(),
            TriviaContent::Structure(node) => node.width(),
        }
    }

    /// Length of the leading trivia of the structure, or zero for plain trivia.
    #[inline]
    pub fn leading_len(&self) -> TextSize {
        self.structure().map(GreenNode::leading_trivia_len).unwrap_or_default()
    }

    #[inline]
    pub(crate) fn flags(&self) -> GreenFlags {
        self.data.flags
    }

    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.flags().contains(GreenFlags::CONTAINS_ANNOTATIONS)
    }

    /// Whether this trivia carries the [elastic](SyntaxAnnotation::elastic) annotation.
    pub fn is_elastic(&self) -> bool {
        self.annotations().iter().any(SyntaxAnnotation::is_elastic)
    }

    /// Whether both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &GreenTrivia) -> bool {
        ptr::eq(self.data(), other.data())
    }

    /// Structural equality that ignores annotations.
    pub fn is_equivalent_to(&self, other: &GreenTrivia) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.kind() == other.kind()
            && match (&self.data.content, &other.data.content) {
                (TriviaContent::Text(a), TriviaContent::Text(b)) => a == b,
                (TriviaContent::Structure(a), TriviaContent::Structure(b)) => a.is_equivalent_to(b),
                _ => false,
            }
    }

    pub(crate) fn write_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        match &self.data.content {
            TriviaContent::Text(text) => out.write_str(text),
            TriviaContent::Structure(node) => node.write_to(out, true, true),
        }
    }

    /// The annotations attached to this trivia itself.
    #[inline]
    pub fn annotations(&self) -> &[SyntaxAnnotation] {
        self.data.annotations.as_slice()
    }

    pub fn has_annotation(&self, annotation: &SyntaxAnnotation) -> bool {
        self.data.annotations.contains(annotation)
    }

    pub fn has_annotations_of_kind(&self, kind: &str) -> bool {
        self.data.annotations.has_kind(kind)
    }

    pub fn annotations_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SyntaxAnnotation> + 'a {
        self.data.annotations.of_kind(kind)
    }

    /// Returns this trivia with `annotations` attached in addition to the ones already present.
    pub fn with_additional_annotations<I>(&self, annotations: I) -> GreenTrivia
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        match self.data.annotations.with_added(annotations) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    /// Returns this trivia without any of the given `annotations`.
    pub fn without_annotations<'a, I>(&self, annotations: I) -> GreenTrivia
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        let remove: Vec<&SyntaxAnnotation> = annotations.into_iter().collect();
        match self.data.annotations.with_removed(|a| remove.contains(&a)) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    /// Returns this trivia without any annotations of the given `kind`.
    pub fn without_annotations_of_kind(&self, kind: &str) -> GreenTrivia {
        match self.data.annotations.with_removed(|a| a.is_kind(kind)) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    fn with_annotation_set(&self, annotations: AnnotationSet) -> GreenTrivia {
        let mut data = self.data().clone();
        data.flags = match &data.content {
            TriviaContent::Text(_) => GreenFlags::NONE,
            TriviaContent::Structure(node) => node.flags().inherited() | GreenFlags::CONTAINS_STRUCTURED_TRIVIA,
        };
        if !annotations.is_empty() {
            data.flags |= GreenFlags::CONTAINS_ANNOTATIONS;
        }
        data.annotations = annotations;
        Self::from_data(data)
    }
}

impl fmt::Debug for GreenTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        let mut s = f.debug_struct("GreenTrivia");
        s.field("kind", &data.kind);
        match &data.content {
            TriviaContent::Text(text) => s.field("text", text),
            TriviaContent::Structure(node) => s.field("structure", node),
        };
        if !data.annotations.is_empty() {
            s.field("annotations", &data.annotations);
        }
        s.finish()
    }
}

impl fmt::Display for GreenTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl Eq for GreenTrivia {}
impl PartialEq for GreenTrivia {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.data() == other.data()
    }
}

impl Hash for GreenTrivia {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data().hash(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct TriviaListHead {
    full_len: TextSize,
    flags:    GreenFlags,
}

#[derive(Clone)]
enum TriviaRepr {
    Empty,
    One(GreenTrivia),
    Many(ThinArc<TriviaListHead, GreenTrivia>),
}

/// An immutable sequence of trivia.
///
/// The list is stored in the smallest of three shapes: empty, a single inline element, or a shared slice for two or
/// more elements. Operations that change the list return a new list and never touch the original.
#[derive(Clone)]
pub struct GreenTriviaList {
    repr: TriviaRepr,
}

impl GreenTriviaList {
    /// The empty list. Does not allocate.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            repr: TriviaRepr::Empty,
        }
    }

    /// A list holding exactly `trivia`. Does not allocate.
    #[inline]
    pub fn single(trivia: GreenTrivia) -> Self {
        Self {
            repr: TriviaRepr::One(trivia),
        }
    }

    /// Builds a list in the smallest shape for the number of elements.
    pub fn from_vec(mut trivia: Vec<GreenTrivia>) -> Self {
        let repr = match trivia.len() {
            0 => TriviaRepr::Empty,
            1 => match trivia.pop() {
                Some(trivia) => TriviaRepr::One(trivia),
                None => TriviaRepr::Empty,
            },
            _ => {
                let mut head = TriviaListHead {
                    full_len: 0.into(),
                    flags:    GreenFlags::NONE,
                };
                for trivia in &trivia {
                    head.full_len += trivia.full_len();
                    head.flags |= trivia.flags().inherited();
                }
                TriviaRepr::Many(ThinArc::from_header_and_iter(head, trivia.into_iter()))
            }
        };
        Self { repr }
    }

    /// The elements of this list as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[GreenTrivia] {
        match &self.repr {
            TriviaRepr::Empty => &[],
            TriviaRepr::One(trivia) => slice::from_ref(trivia),
            TriviaRepr::Many(many) => &many.slice,
        }
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, GreenTrivia> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.repr, TriviaRepr::Empty)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&GreenTrivia> {
        self.as_slice().get(index)
    }

    /// Sum of the full widths of all elements.
    #[inline]
    pub fn full_len(&self) -> TextSize {
        match &self.repr {
            TriviaRepr::Empty => 0.into(),
            TriviaRepr::One(trivia) => trivia.full_len(),
            TriviaRepr::Many(many) => many.header.header.full_len,
        }
    }

    #[inline]
    pub(crate) fn flags(&self) -> GreenFlags {
        match &self.repr {
            TriviaRepr::Empty => GreenFlags::NONE,
            TriviaRepr::One(trivia) => trivia.flags(),
            TriviaRepr::Many(many) => many.header.header.flags,
        }
    }

    /// Returns a new list with `remove` elements starting at `index` replaced by `insert`.
    ///
    /// ## Panics
    /// If the removed range does not lie within the list.
    pub fn splice<I>(&self, index: usize, remove: usize, insert: I) -> GreenTriviaList
    where
        I: IntoIterator<Item = GreenTrivia>,
    {
        let len = self.len();
        assert!(
            index <= len && remove <= len - index,
            "range {index}..{} out of bounds for trivia list of length {len}",
            index + remove
        );
        let mut insert = insert.into_iter().peekable();
        if remove == 0 && insert.peek().is_none() {
            return self.clone();
        }
        let mut buffer: Vec<GreenTrivia> = self.as_slice().to_vec();
        buffer.splice(index..index + remove, insert);
        Self::from_vec(buffer)
    }

    pub fn is_equivalent_to(&self, other: &GreenTriviaList) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.is_equivalent_to(b))
    }

    pub(crate) fn write_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        self.iter().try_for_each(|trivia| trivia.write_to(out))
    }
}

impl Default for GreenTriviaList {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<GreenTrivia> for GreenTriviaList {
    fn from_iter<T: IntoIterator<Item = GreenTrivia>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a GreenTriviaList {
    type IntoIter = slice::Iter<'a, GreenTrivia>;
    type Item = &'a GreenTrivia;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for GreenTriviaList {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for GreenTriviaList {}

impl Hash for GreenTriviaList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl fmt::Debug for GreenTriviaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
