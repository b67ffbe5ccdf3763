//! Durable markers that can be attached to any node, token or trivia.
//!
//! A [`SyntaxAnnotation`] is identified by an integer that is unique for the lifetime of the process. Copying an
//! annotation, sending it across threads, or serializing and deserializing it (with the `serde1` feature) keeps that
//! integer, and two annotations are equal exactly when their integers are. Attaching an annotation never mutates a
//! tree: it creates a new green element that references the annotation, and the old element stays as it was.
//!
//! Rewrite passes that copy elements into new trees are responsible for carrying annotations forward. Once they do,
//! the annotation can be used to find "the same" element in the new tree:
//!
//! ```
//! # use greenwood::*;
//! let marker = SyntaxAnnotation::with_kind("rename");
//! let token = GreenToken::new(SyntaxKind(1), "foo").with_additional_annotations([marker.clone()]);
//! assert!(token.has_annotation(&marker));
//! assert!(!token.has_annotation(&SyntaxAnnotation::with_kind("rename")));
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, OnceLock,
    },
};

use fxhash::FxBuildHasher;
use lasso::{Spur, ThreadedRodeo};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

static ELASTIC: OnceLock<SyntaxAnnotation> = OnceLock::new();

type KindInterner = ThreadedRodeo<Spur, FxBuildHasher>;

static KINDS: OnceLock<KindInterner> = OnceLock::new();

fn kinds() -> &'static KindInterner {
    KINDS.get_or_init(|| ThreadedRodeo::with_hasher(FxBuildHasher::default()))
}

/// A value-identity tag for tree elements.
///
/// The optional kind is interned process-wide, so comparing kinds is an integer comparison and
/// [`kind`](SyntaxAnnotation::kind) hands out a `&'static str`.
#[derive(Clone)]
pub struct SyntaxAnnotation {
    id:   u64,
    kind: Option<Spur>,
    data: Option<Arc<str>>,
}

impl SyntaxAnnotation {
    /// Creates a fresh annotation without kind or data.
    pub fn new() -> Self {
        Self::from_parts(None, None)
    }

    /// Creates a fresh annotation of the given kind.
    pub fn with_kind(kind: &str) -> Self {
        Self::from_parts(Some(kind), None)
    }

    /// Creates a fresh annotation of the given kind carrying opaque `data`.
    pub fn with_data(kind: &str, data: &str) -> Self {
        Self::from_parts(Some(kind), Some(data))
    }

    fn from_parts(kind: Option<&str>, data: Option<&str>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            kind: kind.map(|kind| kinds().get_or_intern(kind)),
            data: data.map(Arc::from),
        }
    }

    /// Reconstructs an annotation with a known identity, e.g. after deserialization.
    ///
    /// Annotations created afterwards get larger ids, so they never collide with `id`.
    #[cfg_attr(not(feature = "serde1"), allow(dead_code))]
    pub(crate) fn from_raw_parts(id: u64, kind: Option<&str>, data: Option<&str>) -> Self {
        NEXT_ID.fetch_max(id.saturating_add(1), Ordering::Relaxed);
        Self {
            id,
            kind: kind.map(|kind| kinds().get_or_intern(kind)),
            data: data.map(Arc::from),
        }
    }

    /// The annotation marking trivia that a formatter is free to replace.
    ///
    /// Every call returns the same annotation.
    pub fn elastic() -> Self {
        ELASTIC.get_or_init(SyntaxAnnotation::new).clone()
    }

    /// Whether this is the [`elastic`](SyntaxAnnotation::elastic) annotation.
    pub fn is_elastic(&self) -> bool {
        ELASTIC.get().map_or(false, |elastic| elastic.id == self.id)
    }

    /// The process-unique identity of this annotation.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> Option<&'static str> {
        self.kind.map(|key| kinds().resolve(&key))
    }

    #[inline]
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Whether this annotation has the given kind, without interning `kind`.
    pub fn is_kind(&self, kind: &str) -> bool {
        match (self.kind, kinds().get(kind)) {
            (Some(own), Some(other)) => own == other,
            _ => false,
        }
    }
}

impl Default for SyntaxAnnotation {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SyntaxAnnotation {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SyntaxAnnotation {}

impl Hash for SyntaxAnnotation {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SyntaxAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SyntaxAnnotation");
        s.field("id", &self.id);
        if let Some(kind) = self.kind() {
            s.field("kind", &kind);
        }
        if let Some(data) = self.data() {
            s.field("data", &data);
        }
        s.finish()
    }
}

/// The set of annotations attached to a single green element.
///
/// Sets preserve insertion order and never contain two annotations with the same identity. The empty set does not
/// allocate.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct AnnotationSet(Option<Arc<[SyntaxAnnotation]>>);

impl AnnotationSet {
    pub(crate) const EMPTY: AnnotationSet = AnnotationSet(None);

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[SyntaxAnnotation] {
        match &self.0 {
            Some(annotations) => annotations,
            None => &[],
        }
    }

    #[inline]
    pub(crate) fn contains(&self, annotation: &SyntaxAnnotation) -> bool {
        self.as_slice().contains(annotation)
    }

    pub(crate) fn has_kind(&self, kind: &str) -> bool {
        self.as_slice().iter().any(|annotation| annotation.is_kind(kind))
    }

    pub(crate) fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SyntaxAnnotation> + 'a {
        self.as_slice().iter().filter(move |annotation| annotation.is_kind(kind))
    }

    /// Returns `None` if nothing was added, so callers can keep their element as is.
    pub(crate) fn with_added<I>(&self, annotations: I) -> Option<AnnotationSet>
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        let mut new: Vec<SyntaxAnnotation> = self.as_slice().to_vec();
        let before = new.len();
        for annotation in annotations {
            if !new.contains(&annotation) {
                new.push(annotation);
            }
        }
        if new.len() == before {
            return None;
        }
        Some(Self::from_vec(new))
    }

    /// Returns `None` if nothing was removed.
    pub(crate) fn with_removed(&self, mut remove: impl FnMut(&SyntaxAnnotation) -> bool) -> Option<AnnotationSet> {
        if self.is_empty() {
            return None;
        }
        let current = self.as_slice();
        let kept: Vec<SyntaxAnnotation> = current.iter().filter(|a| !remove(*a)).cloned().collect();
        if kept.len() == current.len() {
            return None;
        }
        Some(Self::from_vec(kept))
    }

    fn from_vec(annotations: Vec<SyntaxAnnotation>) -> AnnotationSet {
        if annotations.is_empty() {
            AnnotationSet(None)
        } else {
            AnnotationSet(Some(annotations.into()))
        }
    }
}

impl fmt::Debug for AnnotationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
