use std::{fmt, hash, ptr};

use triomphe::Arc;

use crate::{
    annotation::{AnnotationSet, SyntaxAnnotation},
    green::{GreenFlags, GreenTriviaList},
    SyntaxKind, TextLen, TextSize,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct GreenTokenData {
    pub(super) kind:        SyntaxKind,
    pub(super) text:        Box<str>,
    pub(super) leading:     GreenTriviaList,
    pub(super) trailing:    GreenTriviaList,
    pub(super) full_len:    TextSize,
    pub(super) flags:       GreenFlags,
    pub(super) annotations: AnnotationSet,
}

impl GreenTokenData {
    pub(super) fn new(kind: SyntaxKind, text: &str, leading: GreenTriviaList, trailing: GreenTriviaList) -> Self {
        let full_len = leading.full_len() + text.text_len() + trailing.full_len();
        let flags = leading.flags().inherited() | trailing.flags().inherited();
        Self {
            kind,
            text: text.into(),
            leading,
            trailing,
            full_len,
            flags,
            annotations: AnnotationSet::EMPTY,
        }
    }

    /// Recomputes the flags from the trivia, keeping the element-local bits of `previous` and taking `annotations`
    /// as the token's own.
    fn with_local_flags(mut self, previous: GreenFlags, annotations: AnnotationSet) -> Self {
        self.flags = self.leading.flags().inherited() | self.trailing.flags().inherited() | previous.local();
        if !annotations.is_empty() {
            self.flags |= GreenFlags::CONTAINS_ANNOTATIONS;
        }
        self.annotations = annotations;
        self
    }
}

/// Leaf node in the immutable "green" tree.
///
/// A token owns its text and the trivia on either side of it.
#[derive(Clone)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

impl GreenToken {
    /// Creates a new token without trivia.
    pub fn new(kind: SyntaxKind, text: &str) -> GreenToken {
        Self::with_trivia(kind, text, GreenTriviaList::empty(), GreenTriviaList::empty())
    }

    /// Creates a new token with leading and trailing trivia.
    pub fn with_trivia(
        kind: SyntaxKind,
        text: &str,
        leading: GreenTriviaList,
        trailing: GreenTriviaList,
    ) -> GreenToken {
        Self::from_data(GreenTokenData::new(kind, text, leading, trailing))
    }

    /// Creates a zero-width token standing in for one the parser expected but did not find.
    pub fn missing(kind: SyntaxKind) -> GreenToken {
        let mut data = GreenTokenData::new(kind, "", GreenTriviaList::empty(), GreenTriviaList::empty());
        data.flags |= GreenFlags::IS_MISSING;
        Self::from_data(data)
    }

    #[inline]
    pub(super) fn from_data(data: GreenTokenData) -> GreenToken {
        GreenToken { data: Arc::new(data) }
    }

    #[inline]
    pub(super) fn data(&self) -> &GreenTokenData {
        &self.data
    }

    /// [`SyntaxKind`] of this token.
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// The source text of this token, without trivia.
    #[inline]
    pub fn text(&self) -> &str {
        &self.data.text
    }

    /// Length of [`text`](GreenToken::text).
    #[inline]
    pub fn width(&self) -> TextSize {
        self.data.text.text_len()
    }

    /// Length of the text and all trivia of this token.
    #[inline]
    pub fn full_len(&self) -> TextSize {
        self.data.full_len
    }

    #[inline]
    pub fn leading_trivia(&self) -> &GreenTriviaList {
        &self.data.leading
    }

    #[inline]
    pub fn trailing_trivia(&self) -> &GreenTriviaList {
        &self.data.trailing
    }

    #[inline]
    pub(crate) fn flags(&self) -> GreenFlags {
        self.data.flags
    }

    /// Whether this token was inserted by the parser in place of one it did not find.
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags().contains(GreenFlags::IS_MISSING)
    }

    /// Whether this token or any of its trivia carries annotations.
    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.flags().contains(GreenFlags::CONTAINS_ANNOTATIONS)
    }

    #[inline]
    pub fn contains_structured_trivia(&self) -> bool {
        self.flags().contains(GreenFlags::CONTAINS_STRUCTURED_TRIVIA)
    }

    /// Whether both handles point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &GreenToken) -> bool {
        ptr::eq(self.data(), other.data())
    }

    /// Structural equality that ignores annotations on the token and its trivia.
    pub fn is_equivalent_to(&self, other: &GreenToken) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.kind() == other.kind()
            && self.text() == other.text()
            && self.leading_trivia().is_equivalent_to(other.leading_trivia())
            && self.trailing_trivia().is_equivalent_to(other.trailing_trivia())
    }

    /// Returns this token with its leading trivia replaced by `trivia`.
    pub fn with_leading_trivia(&self, trivia: GreenTriviaList) -> GreenToken {
        let data = self.data();
        let new = GreenTokenData::new(data.kind, &data.text, trivia, data.trailing.clone());
        self.with_annotations_of(new)
    }

    /// Returns this token with its trailing trivia replaced by `trivia`.
    pub fn with_trailing_trivia(&self, trivia: GreenTriviaList) -> GreenToken {
        let data = self.data();
        let new = GreenTokenData::new(data.kind, &data.text, data.leading.clone(), trivia);
        self.with_annotations_of(new)
    }

    fn with_annotations_of(&self, new: GreenTokenData) -> GreenToken {
        Self::from_data(new.with_local_flags(self.flags(), self.data.annotations.clone()))
    }

    /// The text of this token including its trivia.
    pub fn to_full_string(&self) -> String {
        self.to_string()
    }

    pub(crate) fn write_to(&self, out: &mut impl fmt::Write, leading: bool, trailing: bool) -> fmt::Result {
        if leading {
            self.leading_trivia().write_to(out)?;
        }
        out.write_str(self.text())?;
        if trailing {
            self.trailing_trivia().write_to(out)?;
        }
        Ok(())
    }

    /// The annotations attached to this token itself.
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

    /// Returns this token with `annotations` attached in addition to the ones already present.
    pub fn with_additional_annotations<I>(&self, annotations: I) -> GreenToken
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        match self.data.annotations.with_added(annotations) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    /// Returns this token without any of the given `annotations`.
    pub fn without_annotations<'a, I>(&self, annotations: I) -> GreenToken
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        let remove: Vec<&SyntaxAnnotation> = annotations.into_iter().collect();
        match self.data.annotations.with_removed(|a| remove.contains(&a)) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    /// Returns this token without any annotations of the given `kind`.
    pub fn without_annotations_of_kind(&self, kind: &str) -> GreenToken {
        match self.data.annotations.with_removed(|a| a.is_kind(kind)) {
            Some(set) => self.with_annotation_set(set),
            None => self.clone(),
        }
    }

    fn with_annotation_set(&self, annotations: AnnotationSet) -> GreenToken {
        Self::from_data(self.data().clone().with_local_flags(self.flags(), annotations))
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        let mut s = f.debug_struct("GreenToken");
        s.field("kind", &data.kind).field("text", &data.text);
        if !data.leading.is_empty() {
            s.field("leading", &data.leading);
        }
        if !data.trailing.is_empty() {
            s.field("trailing", &data.trailing);
        }
        if !data.annotations.is_empty() {
            s.field("annotations", &data.annotations);
        }
        s.finish()
    }
}

/// Writes the full text of the token, trivia included.
impl fmt::Display for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, true, true)
    }
}

impl Eq for GreenToken {}
impl PartialEq for GreenToken {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.data() == other.data()
    }
}

impl hash::Hash for GreenToken {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        self.data().hash(state)
    }
}
