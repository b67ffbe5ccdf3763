use std::{fmt, marker::PhantomData};

use crate::{
    annotation::SyntaxAnnotation,
    green::{GreenToken, GreenTrivia, GreenTriviaList},
    syntax::{tree::RawToken, SyntaxElement, SyntaxNode, SyntaxTrivia, SyntaxTriviaList},
    Direction, Language, NodeOrToken, SyntaxKind, TextRange, TextSize,
};

/// Syntax tree token.
///
/// Tokens are leaves of the tree. They own their text and the trivia on either side of it. A token either sits in a
/// tree, in which case it knows its parent, or is freestanding, as produced by list and annotation operations.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken<L: Language> {
    raw:   RawToken,
    _lang: PhantomData<L>,
}

impl<L: Language> SyntaxToken<L> {
    /// Creates a freestanding token at offset zero.
    pub fn new_detached(green: GreenToken) -> Self {
        Self::from_raw(RawToken::detached(green))
    }

    #[inline]
    pub(crate) fn from_raw(raw: RawToken) -> Self {
        Self {
            raw,
            _lang: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn raw(&self) -> &RawToken {
        &self.raw
    }

    #[inline]
    pub fn green(&self) -> &GreenToken {
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

    /// The text of this token, without trivia.
    #[inline]
    pub fn text(&self) -> &str {
        self.raw.green.text()
    }

    /// Length of [`text`](SyntaxToken::text).
    #[inline]
    pub fn width(&self) -> TextSize {
        self.raw.green.width()
    }

    /// Whether the parser inserted this token without any source text.
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.raw.green.is_missing()
    }

    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.raw.full_span()
    }

    /// The range of the token text, excluding trivia.
    #[inline]
    pub fn span(&self) -> TextRange {
        TextRange::at(self.span_start(), self.width())
    }

    #[inline]
    pub fn span_start(&self) -> TextSize {
        self.raw.offset + self.raw.green.leading_trivia().full_len()
    }

    /// The node containing this token, or `None` for a freestanding token.
    ///
    /// For a token in a token list, this is the node owning the list.
    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode<L>> {
        self.raw.parent.clone().map(SyntaxNode::from_raw)
    }

    /// The slot of this token in its parent.
    #[inline]
    pub fn index(&self) -> usize {
        self.raw.index
    }

    /// The position of this token within the token list in its slot, `0` if the slot holds just this token.
    #[inline]
    pub fn index_in_list(&self) -> usize {
        self.raw.item
    }

    /// Iterator over the parent of this token and its ancestors.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<L>> {
        self.parent().into_iter().flat_map(|parent| parent.ancestors())
    }

    pub fn leading_trivia(&self) -> SyntaxTriviaList<L> {
        SyntaxTriviaList::of_token(self.raw.clone(), self.raw.green.leading_trivia().clone(), self.raw.offset, 0)
    }

    pub fn trailing_trivia(&self) -> SyntaxTriviaList<L> {
        let leading = self.raw.green.leading_trivia().len();
        SyntaxTriviaList::of_token(
            self.raw.clone(),
            self.raw.green.trailing_trivia().clone(),
            self.raw.trailing_offset(),
            leading,
        )
    }

    #[inline]
    pub fn has_leading_trivia(&self) -> bool {
        !self.raw.green.leading_trivia().is_empty()
    }

    #[inline]
    pub fn has_trailing_trivia(&self) -> bool {
        !self.raw.green.trailing_trivia().is_empty()
    }

    /// Whether any trivia of this token has structure.
    #[inline]
    pub fn has_structured_trivia(&self) -> bool {
        self.raw.green.contains_structured_trivia()
    }

    /// The trivia of this token whose full span contains `position`, if any.
    pub fn trivia_at(&self, position: TextSize) -> Option<SyntaxTrivia<L>> {
        if self.span().contains(position) {
            return None;
        }
        let leading = self.leading_trivia();
        let list = if position < self.span_start() { leading } else { self.trailing_trivia() };
        list.iter().find(|trivia| trivia.full_span().contains(position))
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement<L>> {
        self.raw.next_sibling().map(SyntaxElement::from_raw)
    }

    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement<L>> {
        self.raw.prev_sibling().map(SyntaxElement::from_raw)
    }

    /// The next token in document order that is not zero-width.
    pub fn next_token(&self) -> Option<SyntaxToken<L>> {
        self.sibling_token(Direction::Next)
    }

    /// The previous token in document order that is not zero-width.
    pub fn prev_token(&self) -> Option<SyntaxToken<L>> {
        self.sibling_token(Direction::Prev)
    }

    fn sibling_token(&self, direction: Direction) -> Option<SyntaxToken<L>> {
        let has_width = |token: &SyntaxToken<L>| u32::from(token.width()) != 0;
        let mut element: SyntaxElement<L> = NodeOrToken::Token(self.clone());
        loop {
            let mut sibling = element.sibling_or_token(direction);
            while let Some(current) = sibling {
                let found = match &current {
                    NodeOrToken::Token(token) => Some(token.clone()).filter(has_width),
                    NodeOrToken::Node(node) => match direction {
                        Direction::Next => node.first_token_where(has_width),
                        Direction::Prev => node.last_token_where(has_width),
                    },
                };
                if found.is_some() {
                    return found;
                }
                sibling = current.sibling_or_token(direction);
            }
            element = NodeOrToken::Node(element.parent()?);
        }
    }

    /// Returns a freestanding copy of this token with its leading trivia replaced.
    pub fn with_leading_trivia<I>(&self, trivia: I) -> SyntaxToken<L>
    where
        I: IntoIterator<Item = GreenTrivia>,
    {
        let trivia: GreenTriviaList = trivia.into_iter().collect();
        SyntaxToken::new_detached(self.green().with_leading_trivia(trivia))
    }

    /// Returns a freestanding copy of this token with its trailing trivia replaced.
    pub fn with_trailing_trivia<I>(&self, trivia: I) -> SyntaxToken<L>
    where
        I: IntoIterator<Item = GreenTrivia>,
    {
        let trivia: GreenTriviaList = trivia.into_iter().collect();
        SyntaxToken::new_detached(self.green().with_trailing_trivia(trivia))
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

    /// Whether this token or any of its trivia carries annotations.
    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.green().contains_annotations()
    }

    pub fn with_additional_annotations<I>(&self, annotations: I) -> SyntaxToken<L>
    where
        I: IntoIterator<Item = SyntaxAnnotation>,
    {
        SyntaxToken::new_detached(self.green().with_additional_annotations(annotations))
    }

    pub fn without_annotations<'a, I>(&self, annotations: I) -> SyntaxToken<L>
    where
        I: IntoIterator<Item = &'a SyntaxAnnotation>,
    {
        SyntaxToken::new_detached(self.green().without_annotations(annotations))
    }

    pub fn without_annotations_of_kind(&self, kind: &str) -> SyntaxToken<L> {
        SyntaxToken::new_detached(self.green().without_annotations_of_kind(kind))
    }

    /// The text of this token including its trivia.
    pub fn to_full_string(&self) -> String {
        self.green().to_full_string()
    }
}

impl<L: Language> fmt::Debug for SyntaxToken<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.span())?;
        if self.is_missing() {
            return f.write_str(" <missing>");
        }
        let text = self.text();
        if text.len() < 25 {
            return write!(f, " {text:?}");
        }
        for idx in 21..25 {
            if text.is_char_boundary(idx) {
                let text = format!("{} ...", &text[..idx]);
                return write!(f, " {text:?}");
            }
        }
        unreachable!()
    }
}

/// Writes the token text without trivia.
impl<L: Language> fmt::Display for SyntaxToken<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
