use std::{fmt, marker::PhantomData};

use crate::{
    annotation::SyntaxAnnotation,
    green::GreenTrivia,
    syntax::{tree::RawTrivia, SyntaxNode, SyntaxToken},
    Language, SyntaxKind, TextRange, TextSize,
};

/// Whitespace, comments and other text attached to a token.
///
/// A trivia may have *structure*: a node tree describing its content, like a documentation comment or a
/// preprocessor directive. See [`structure`](SyntaxTrivia::structure).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxTrivia<L: Language> {
    raw:   RawTrivia,
    _lang: PhantomData<L>,
}

impl<L: Language> SyntaxTrivia<L> {
    /// Creates a trivia that does not belong to a token, at offset zero.
    pub fn new_detached(green: GreenTrivia) -> Self {
        Self::from_raw(RawTrivia::detached(green))
    }

    #[inline]
    pub(crate) fn from_raw(raw: RawTrivia) -> Self {
        Self {
            raw,
            _lang: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn raw(&self) -> &RawTrivia {
        &self.raw
    }

    #[inline]
    pub fn green(&self) -> &GreenTrivia {
        &self.raw.green
    }

    #[inline]
    pub fn kind(&self) -> L::Kind {
        L::kind_from_raw(self.syntax_kind())
    }

    #[inline]
    pub fn syntax_kind(&self) -> SyntaxKind {
        self.raw.green.kind()
    }

    /// The text of an unstructured trivia.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.raw.green.text()
    }

    /// The token this trivia is attached to.
    #[inline]
    pub fn token(&self) -> Option<SyntaxToken<L>> {
        self.raw.token.clone().map(SyntaxToken::from_raw)
    }

    /// Position of this trivia among the leading and then the trailing trivia of its token.
    #[inline]
    pub fn index(&self) -> usize {
        self.raw.index
    }

    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.raw.full_span()
    }

    /// The range of this trivia. For structured trivia, this excludes the outer trivia of the structure.
    pub fn span(&self) -> TextRange {
        let span = TextRange::at(self.raw.offset + self.raw.green.leading_len(), self.raw.green.width());
        debug_assert!(
            self.full_span().contains_range(span),
            "span {span:?} of trivia escapes its full span {:?}",
            self.full_span(),
        );
        span
    }

    #[inline]
    pub fn span_start(&self) -> TextSize {
        self.span().start()
    }

    #[inline]
    pub fn has_structure(&self) -> bool {
        self.raw.green.has_structure()
    }

    /// The root of this trivia's structure, positioned where the trivia is.
    ///
    /// The root has no [`parent`](SyntaxNode::parent). Its [`parent_trivia`](SyntaxNode::parent_trivia) is this trivia.
    pub fn structure(&self) -> Option<SyntaxNode<L>> {
        let structure = self.raw.structure()?;
        debug_assert!(
            self.full_span().contains_range(structure.full_span()),
            "structure {:?} escapes the full span {:?} of its trivia",
            structure.full_span(),
            self.full_span(),
        );
        Some(SyntaxNode::from_raw(structure))
    }

    /// Whether this is elastic trivia, which formatters may replace freely.
    #[inline]
    pub fn is_elastic(&self) -> bool {
        self.raw.green.is_elastic()
    }

    #[inline]
    pub fn annotations(&self) -> &[SyntaxAnnotation] {
        self.green().annotations()
    }

    #[inline]
    pub fn has_annotation(&self, annotation: &SyntaxAnnotation) -> bool {
        self.green().has_annotation(annotation)
    }

    #[inline]
    pub fn has_annotations_of_kind(&self, kind: &str) -> bool {
        self.green().has_annotations_of_kind(kind)
    }

    #[inline]
    pub fn has_any_annotations(&self) -> bool {
        !self.annotations().is_empty()
    }

    pub fn annotations_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SyntaxAnnotation> + 'a {
        self.green().annotations_of_kind(kind)
    }

    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.green().contains_annotations()
    }

    pub fn with_additional_annotations<I>(&self, annotations: I) -> SyntaxTrivia<L>
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        SyntaxTrivia::new_detached(self.green().with_additional_annotations(annotations))
    }

    pub fn without_annotations<'a, I>(&self, annotations: I) -> SyntaxTrivia<L>
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        SyntaxTrivia::new_detached(self.green().without_annotations(annotations))
    }

    pub fn without_annotations_of_kind(&self, kind: &str) -> SyntaxTrivia<L> {
        SyntaxTrivia::new_detached(self.green().without_annotations_of_kind(kind))
    }

    pub fn to_full_string(&self) -> String {
        self.green().to_string()
    }
}

impl<L: Language> fmt::Debug for SyntaxTrivia<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.full_span())?;
        match self.text() {
            Some(text) => write!(f, " {text:?}"),
            None => f.write_str(" <structured>"),
        }
    }
}

/// Writes the trivia text. For structured trivia, the outer trivia of the structure is left out.
impl<L: Language> fmt::Display for SyntaxTrivia<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.green().structure() {
            Some(structure) => structure.write_to(f, false, false),
            None => fmt::Display::fmt(self.green(), f),
        }
    }
}
