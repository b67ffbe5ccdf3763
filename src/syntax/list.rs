//! Positioned lists of tokens and trivia.
//!
//! Both lists come in three shapes: empty, a single element stored inline, or many elements backed by a shared green
//! list. They behave like ordered sequences. Mutations never change a list; they return a new, freestanding list in
//! the smallest shape for its length.

use std::{fmt, iter::FusedIterator, marker::PhantomData};

use crate::{
    green::{token_list_slot, GreenElementRef, GreenNode, GreenToken, GreenTrivia, GreenTriviaList},
    syntax::{
        tree::{RawNode, RawToken, RawTrivia},
        SyntaxToken, SyntaxTrivia,
    },
    Language, NodeOrToken, TextRange, TextSize,
};

#[derive(Clone, PartialEq, Eq, Hash)]
enum TokenListRepr {
    Empty,
    Single(RawToken),
    /// A [`SyntaxKind::LIST`](crate::SyntaxKind::LIST) node whose slots are the tokens, stored in `slot` of `owner`.
    Many {
        owner: Option<RawNode>,
        slot:  usize,
        green: GreenNode,
    },
}

/// A list of tokens occupying one slot of a node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxTokenList<L: Language> {
    repr:     TokenListRepr,
    position: TextSize,
    _lang:    PhantomData<L>,
}

impl<L: Language> SyntaxTokenList<L> {
    /// A freestanding empty list.
    pub fn empty() -> Self {
        Self::empty_at(0.into())
    }

    pub(crate) fn empty_at(position: TextSize) -> Self {
        Self {
            repr: TokenListRepr::Empty,
            position,
            _lang: PhantomData,
        }
    }

    pub(crate) fn single(token: RawToken) -> Self {
        Self {
            position: token.offset,
            repr: TokenListRepr::Single(token),
            _lang: PhantomData,
        }
    }

    pub(crate) fn many(owner: Option<RawNode>, slot: usize, green: GreenNode, position: TextSize) -> Self {
        debug_assert!(green.kind().is_list());
        debug_assert!(green.slot_count() > 1, "token list nodes hold at least two tokens");
        Self {
            repr: TokenListRepr::Many { owner, slot, green },
            position,
            _lang: PhantomData,
        }
    }

    fn detached(tokens: Vec<GreenToken>) -> Self {
        match token_list_slot(tokens) {
            None => Self::empty(),
            Some(NodeOrToken::Token(token)) => Self::single(RawToken::detached(token)),
            Some(NodeOrToken::Node(green)) => Self::many(None, 0, green, 0.into()),
        }
    }

    /// A freestanding list sharing this list's storage.
    fn detach(&self) -> Self {
        match &self.repr {
            TokenListRepr::Empty => Self::empty(),
            TokenListRepr::Single(token) => Self::single(RawToken::detached(token.green.clone())),
            TokenListRepr::Many { green, .. } => Self::many(None, 0, green.clone(), 0.into()),
        }
    }

    /// The green storage of the list: nothing, a token or a [`SyntaxKind::LIST`](crate::SyntaxKind::LIST) node.
    pub fn green(&self) -> Option<GreenElementRef<'_>> {
        match &self.repr {
            TokenListRepr::Empty => None,
            TokenListRepr::Single(token) => Some(NodeOrToken::Token(&token.green)),
            TokenListRepr::Many { green, .. } => Some(NodeOrToken::Node(green)),
        }
    }

    /// Number of tokens in the list.
    pub fn len(&self) -> usize {
        match &self.repr {
            TokenListRepr::Empty => 0,
            TokenListRepr::Single(_) => 1,
            TokenListRepr::Many { green, .. } => green.slot_count(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self.repr, TokenListRepr::Empty)
    }

    /// Whether the list has at least one token.
    #[inline]
    pub fn any(&self) -> bool {
        !self.is_empty()
    }

    /// The token at `index`, or `None` if `index` is out of range.
    pub fn get(&self, index: usize) -> Option<SyntaxToken<L>> {
        let raw = match &self.repr {
            TokenListRepr::Empty => None,
            TokenListRepr::Single(token) => (index == 0).then(|| token.clone()),
            TokenListRepr::Many { owner, slot, green } if index < green.slot_count() => {
                green.slot(index).and_then(NodeOrToken::into_token).map(|token| RawToken {
                    parent: owner.clone(),
                    green:  token.clone(),
                    offset: self.position + green.slot_offset(index),
                    index:  *slot,
                    item:   index,
                })
            }
            TokenListRepr::Many { .. } => None,
        };
        raw.map(SyntaxToken::from_raw)
    }

    /// The token at `index`.
    ///
    /// ## Panics
    /// If `index` is out of range.
    pub fn at(&self, index: usize) -> SyntaxToken<L> {
        match self.get(index) {
            Some(token) => token,
            None => panic!("index {index} out of range for token list of length {}", self.len()),
        }
    }

    /// ## Panics
    /// If the list is empty.
    pub fn first(&self) -> SyntaxToken<L> {
        match self.get(0) {
            Some(token) => token,
            None => panic!("invalid operation: `first` on an empty token list"),
        }
    }

    /// ## Panics
    /// If the list is empty.
    pub fn last(&self) -> SyntaxToken<L> {
        match self.len().checked_sub(1).and_then(|last| self.get(last)) {
            Some(token) => token,
            None => panic!("invalid operation: `last` on an empty token list"),
        }
    }

    /// Position of `token` in this list, or `-1` if it is not an element.
    pub fn index_of(&self, token: &SyntaxToken<L>) -> isize {
        self.iter()
            .position(|candidate| &candidate == token)
            .map_or(-1, |index| index as isize)
    }

    pub fn iter(&self) -> SyntaxTokenListIter<'_, L> {
        SyntaxTokenListIter {
            list:  self,
            front: 0,
            back:  self.len(),
        }
    }

    /// A view of this list in reverse order.
    #[inline]
    pub fn reverse(&self) -> ReversedTokenList<'_, L> {
        ReversedTokenList { list: self }
    }

    /// The range of the list without the leading trivia of the first token and the trailing trivia of the last.
    pub fn span(&self) -> TextRange {
        match &self.repr {
            TokenListRepr::Empty => TextRange::empty(self.position),
            TokenListRepr::Single(token) => SyntaxToken::<L>::from_raw(token.clone()).span(),
            TokenListRepr::Many { green, .. } => {
                TextRange::at(self.position + green.leading_trivia_len(), green.width())
            }
        }
    }

    pub fn full_span(&self) -> TextRange {
        match &self.repr {
            TokenListRepr::Empty => TextRange::empty(self.position),
            TokenListRepr::Single(token) => token.full_span(),
            TokenListRepr::Many { green, .. } => TextRange::at(self.position, green.full_len()),
        }
    }

    /// The text of the list including all trivia.
    pub fn to_full_string(&self) -> String {
        match &self.repr {
            TokenListRepr::Empty => String::new(),
            TokenListRepr::Single(token) => token.green.to_full_string(),
            TokenListRepr::Many { green, .. } => green.to_full_string(),
        }
    }

    /// Returns a new list with `remove` tokens at `index` replaced by `insert`.
    fn splice(&self, index: usize, remove: usize, insert: Vec<GreenToken>) -> SyntaxTokenList<L> {
        if remove == 0 && insert.is_empty() {
            return self.detach();
        }
        let mut greens: Vec<GreenToken> = match &self.repr {
            TokenListRepr::Empty => Vec::new(),
            TokenListRepr::Single(token) => vec![token.green.clone()],
            TokenListRepr::Many { green, .. } => green.children().filter_map(NodeOrToken::into_token).cloned().collect(),
        };
        greens.splice(index..index + remove, insert);
        if greens.len() > 1 {
            log::trace!("rebuilding token list with {} tokens", greens.len());
        }
        Self::detached(greens)
    }

    fn expect_index(&self, token: &SyntaxToken<L>) -> usize {
        match self.index_of(token) {
            -1 => panic!("token {token:?} is not an element of this list"),
            index => index as usize,
        }
    }

    fn assert_insert_index(&self, index: usize) {
        assert!(
            index <= self.len(),
            "insertion index {index} out of range for token list of length {}",
            self.len()
        );
    }

    /// Returns a new list with `token` appended.
    pub fn push(&self, token: SyntaxToken<L>) -> SyntaxTokenList<L> {
        self.insert(self.len(), token)
    }

    /// Returns a new list with `token` inserted at `index`.
    ///
    /// ## Panics
    /// If `index > len`.
    pub fn insert(&self, index: usize, token: SyntaxToken<L>) -> SyntaxTokenList<L> {
        self.insert_range(index, [token])
    }

    /// Returns a new list with `tokens` inserted at `index`.
    ///
    /// ## Panics
    /// If `index > len`.
    pub fn insert_range<I>(&self, index: usize, tokens: I) -> SyntaxTokenList<L>
    where
        I: IntoIterator<Item = SyntaxToken<L>>,
    {
        self.assert_insert_index(index);
        self.splice(index, 0, tokens.into_iter().map(|token| token.green().clone()).collect())
    }

    /// Returns a new list without `token`.
    ///
    /// ## Panics
    /// If `token` is not an element of this list.
    pub fn remove(&self, token: &SyntaxToken<L>) -> SyntaxTokenList<L> {
        self.remove_at(self.expect_index(token))
    }

    /// Returns a new list without the token at `index`.
    ///
    /// ## Panics
    /// If `index` is out of range.
    pub fn remove_at(&self, index: usize) -> SyntaxTokenList<L> {
        assert!(
            index < self.len(),
            "index {index} out of range for token list of length {}",
            self.len()
        );
        self.splice(index, 1, Vec::new())
    }

    /// Returns a new list with `old` replaced by `new`.
    ///
    /// ## Panics
    /// If `old` is not an element of this list.
    pub fn replace(&self, old: &SyntaxToken<L>, new: SyntaxToken<L>) -> SyntaxTokenList<L> {
        self.replace_range(old, [new])
    }

    /// Returns a new list with `old` replaced by all of `new`.
    ///
    /// ## Panics
    /// If `old` is not an element of this list.
    pub fn replace_range<I>(&self, old: &SyntaxToken<L>, new: I) -> SyntaxTokenList<L>
    where
        I: IntoIterator<Item = SyntaxToken<L>>,
    {
        let index = self.expect_index(old);
        self.splice(index, 1, new.into_iter().map(|token| token.green().clone()).collect())
    }
}

impl<L: Language> Default for SyntaxTokenList<L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<L: Language> FromIterator<SyntaxToken<L>> for SyntaxTokenList<L> {
    fn from_iter<T: IntoIterator<Item = SyntaxToken<L>>>(iter: T) -> Self {
        Self::detached(iter.into_iter().map(|token| token.green().clone()).collect())
    }
}

impl<'a, L: Language> IntoIterator for &'a SyntaxTokenList<L> {
    type IntoIter = SyntaxTokenListIter<'a, L>;
    type Item = SyntaxToken<L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<L: Language> fmt::Debug for SyntaxTokenList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Writes the text of the list without the outer trivia.
impl<L: Language> fmt::Display for SyntaxTokenList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            TokenListRepr::Empty => Ok(()),
            TokenListRepr::Single(token) => f.write_str(token.green.text()),
            TokenListRepr::Many { green, .. } => green.write_to(f, false, false),
        }
    }
}

/// Iterator over the tokens of a [`SyntaxTokenList`].
#[derive(Clone)]
pub struct SyntaxTokenListIter<'a, L: Language> {
    list:  &'a SyntaxTokenList<L>,
    front: usize,
    back:  usize,
}

impl<L: Language> Iterator for SyntaxTokenListIter<'_, L> {
    type Item = SyntaxToken<L>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.front += 1;
        self.list.get(self.front - 1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<L: Language> DoubleEndedIterator for SyntaxTokenListIter<'_, L> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.list.get(self.back)
    }
}

impl<L: Language> ExactSizeIterator for SyntaxTokenListIter<'_, L> {}
impl<L: Language> FusedIterator for SyntaxTokenListIter<'_, L> {}

/// A [`SyntaxTokenList`] seen back to front. Borrows the list; nothing is copied.
#[derive(Clone, Copy)]
pub struct ReversedTokenList<'a, L: Language> {
    list: &'a SyntaxTokenList<L>,
}

impl<'a, L: Language> ReversedTokenList<'a, L> {
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::iter::Rev<SyntaxTokenListIter<'a, L>> {
        self.list.iter().rev()
    }
}

impl<'a, L: Language> IntoIterator for ReversedTokenList<'a, L> {
    type IntoIter = std::iter::Rev<SyntaxTokenListIter<'a, L>>;
    type Item = SyntaxToken<L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The leading or trailing trivia of a token, or a freestanding list of trivia.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxTriviaList<L: Language> {
    token:    Option<RawToken>,
    green:    GreenTriviaList,
    position: TextSize,
    /// Trivia index of the first element within its token.
    base:     usize,
    _lang:    PhantomData<L>,
}

impl<L: Language> SyntaxTriviaList<L> {
    /// A freestanding empty list.
    pub fn empty() -> Self {
        Self::detached(GreenTriviaList::empty())
    }

    /// A freestanding list of `green`, positioned at zero.
    pub fn detached(green: GreenTriviaList) -> Self {
        Self {
            token: None,
            green,
            position: 0.into(),
            base: 0,
            _lang: PhantomData,
        }
    }

    pub(crate) fn of_token(token: RawToken, green: GreenTriviaList, position: TextSize, base: usize) -> Self {
        Self {
            token: Some(token),
            green,
            position,
            base,
            _lang: PhantomData,
        }
    }

    #[inline]
    pub fn green(&self) -> &GreenTriviaList {
        &self.green
    }

    /// The token this list belongs to.
    pub fn token(&self) -> Option<SyntaxToken<L>> {
        self.token.clone().map(SyntaxToken::from_raw)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.green.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.green.is_empty()
    }

    #[inline]
    pub fn any(&self) -> bool {
        !self.is_empty()
    }

    fn make(&self, index: usize, offset: TextSize) -> Option<SyntaxTrivia<L>> {
        let green = self.green.get(index)?.clone();
        Some(SyntaxTrivia::from_raw(RawTrivia {
            token: self.token.clone(),
            green,
            offset,
            index: self.base + index,
        }))
    }

    /// The trivia at `index`, or `None` if `index` is out of range.
    pub fn get(&self, index: usize) -> Option<SyntaxTrivia<L>> {
        let before = self.green.as_slice().get(..index)?;
        let offset = before
            .iter()
            .fold(self.position, |offset, trivia| offset + trivia.full_len());
        self.make(index, offset)
    }

    /// The trivia at `index`.
    ///
    /// ## Panics
    /// If `index` is out of range.
    pub fn at(&self, index: usize) -> SyntaxTrivia<L> {
        match self.get(index) {
            Some(trivia) => trivia,
            None => panic!("index {index} out of range for trivia list of length {}", self.len()),
        }
    }

    /// ## Panics
    /// If the list is empty.
    pub fn first(&self) -> SyntaxTrivia<L> {
        match self.get(0) {
            Some(trivia) => trivia,
            None => panic!("invalid operation: `first` on an empty trivia list"),
        }
    }

    /// ## Panics
    /// If the list is empty.
    pub fn last(&self) -> SyntaxTrivia<L> {
        match self.iter().next_back() {
            Some(trivia) => trivia,
            None => panic!("invalid operation: `last` on an empty trivia list"),
        }
    }

    /// Position of `trivia` in this list, or `-1` if it is not an element.
    pub fn index_of(&self, trivia: &SyntaxTrivia<L>) -> isize {
        self.iter()
            .position(|candidate| &candidate == trivia)
            .map_or(-1, |index| index as isize)
    }

    pub fn iter(&self) -> SyntaxTriviaListIter<'_, L> {
        SyntaxTriviaListIter {
            list:         self,
            front:        0,
            back:         self.len(),
            front_offset: self.position,
            back_offset:  self.position + self.green.full_len(),
        }
    }

    /// A view of this list in reverse order.
    #[inline]
    pub fn reverse(&self) -> ReversedTriviaList<'_, L> {
        ReversedTriviaList { list: self }
    }

    /// From the start of the first trivia's span to the end of the last trivia's span.
    pub fn span(&self) -> TextRange {
        let mut iter = self.iter();
        match (iter.next(), iter.next_back()) {
            (None, _) => TextRange::empty(self.position),
            (Some(first), None) => first.span(),
            (Some(first), Some(last)) => first.span().cover(last.span()),
        }
    }

    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.position, self.green.full_len())
    }

    pub fn to_full_string(&self) -> String {
        let mut out = String::new();
        // `fmt::Write` for `String` never fails
        let _ = self.green.write_to(&mut out);
        out
    }

    fn assert_insert_index(&self, index: usize) {
        assert!(
            index <= self.len(),
            "insertion index {index} out of range for trivia list of length {}",
            self.len()
        );
    }

    fn expect_index(&self, trivia: &SyntaxTrivia<L>) -> usize {
        match self.index_of(trivia) {
            -1 => panic!("trivia {trivia:?} is not an element of this list"),
            index => index as usize,
        }
    }

    /// Returns a new list with `trivia` appended.
    pub fn push(&self, trivia: SyntaxTrivia<L>) -> SyntaxTriviaList<L> {
        self.insert(self.len(), trivia)
    }

    /// Returns a new list with `trivia` inserted at `index`.
    ///
    /// ## Panics
    /// If `index > len`.
    pub fn insert(&self, index: usize, trivia: SyntaxTrivia<L>) -> SyntaxTriviaList<L> {
        self.insert_range(index, [trivia])
    }

    /// Returns a new list with all of `trivia` inserted at `index`.
    ///
    /// ## Panics
    /// If `index > len`.
    pub fn insert_range<I>(&self, index: usize, trivia: I) -> SyntaxTriviaList<L>
    where
        I: IntoIterator<Item = SyntaxTrivia<L>>,
    {
        self.assert_insert_index(index);
        let inserted = trivia.into_iter().map(|trivia| trivia.green().clone());
        Self::detached(self.green.splice(index, 0, inserted))
    }

    /// Returns a new list without `trivia`.
    ///
    /// ## Panics
    /// If `trivia` is not an element of this list.
    pub fn remove(&self, trivia: &SyntaxTrivia<L>) -> SyntaxTriviaList<L> {
        self.remove_at(self.expect_index(trivia))
    }

    /// Returns a new list without the trivia at `index`.
    ///
    /// ## Panics
    /// If `index` is out of range.
    pub fn remove_at(&self, index: usize) -> SyntaxTriviaList<L> {
        assert!(
            index < self.len(),
            "index {index} out of range for trivia list of length {}",
            self.len()
        );
        Self::detached(self.green.splice(index, 1, []))
    }

    /// Returns a new list with `old` replaced by `new`.
    ///
    /// ## Panics
    /// If `old` is not an element of this list.
    pub fn replace(&self, old: &SyntaxTrivia<L>, new: SyntaxTrivia<L>) -> SyntaxTriviaList<L> {
        self.replace_range(old, [new])
    }

    /// Returns a new list with `old` replaced by all of `new`.
    ///
    /// ## Panics
    /// If `old` is not an element of this list.
    pub fn replace_range<I>(&self, old: &SyntaxTrivia<L>, new: I) -> SyntaxTriviaList<L>
    where
        I: IntoIterator<Item = SyntaxTrivia<L>>,
    {
        let index = self.expect_index(old);
        let inserted = new.into_iter().map(|trivia| trivia.green().clone());
        Self::detached(self.green.splice(index, 1, inserted))
    }
}

impl<L: Language> Default for SyntaxTriviaList<L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<L: Language> FromIterator<SyntaxTrivia<L>> for SyntaxTriviaList<L> {
    fn from_iter<T: IntoIterator<Item = SyntaxTrivia<L>>>(iter: T) -> Self {
        Self::detached(iter.into_iter().map(|trivia| trivia.green().clone()).collect())
    }
}

impl<L: Language> FromIterator<GreenTrivia> for SyntaxTriviaList<L> {
    fn from_iter<T: IntoIterator<Item = GreenTrivia>>(iter: T) -> Self {
        Self::detached(iter.into_iter().collect())
    }
}

impl<'a, L: Language> IntoIterator for &'a SyntaxTriviaList<L> {
    type IntoIter = SyntaxTriviaListIter<'a, L>;
    type Item = SyntaxTrivia<L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<L: Language> fmt::Debug for SyntaxTriviaList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Writes the full text of every trivia, including the outer trivia of structured trivia.
impl<L: Language> fmt::Display for SyntaxTriviaList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.green.write_to(f)
    }
}

/// Iterator over the trivia of a [`SyntaxTriviaList`].
#[derive(Clone)]
pub struct SyntaxTriviaListIter<'a, L: Language> {
    list:         &'a SyntaxTriviaList<L>,
    front:        usize,
    back:         usize,
    front_offset: TextSize,
    back_offset:  TextSize,
}

impl<L: Language> Iterator for SyntaxTriviaListIter<'_, L> {
    type Item = SyntaxTrivia<L>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let trivia = self.list.make(self.front, self.front_offset)?;
        self.front += 1;
        self.front_offset += trivia.green().full_len();
        Some(trivia)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<L: Language> DoubleEndedIterator for SyntaxTriviaListIter<'_, L> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        let full_len = self.list.green.get(self.back)?.full_len();
        self.back_offset -= full_len;
        self.list.make(self.back, self.back_offset)
    }
}

impl<L: Language> ExactSizeIterator for SyntaxTriviaListIter<'_, L> {}
impl<L: Language> FusedIterator for SyntaxTriviaListIter<'_, L> {}

/// A [`SyntaxTriviaList`] seen back to front. Borrows the list; nothing is copied.
#[derive(Clone, Copy)]
pub struct ReversedTriviaList<'a, L: Language> {
    list: &'a SyntaxTriviaList<L>,
}

impl<'a, L: Language> ReversedTriviaList<'a, L> {
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::iter::Rev<SyntaxTriviaListIter<'a, L>> {
        self.list.iter().rev()
    }
}

impl<'a, L: Language> IntoIterator for ReversedTriviaList<'a, L> {
    type IntoIter = std::iter::Rev<SyntaxTriviaListIter<'a, L>>;
    type Item = SyntaxTrivia<L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
