//! Green tree iterators.

use std::{iter::FusedIterator, slice};

use super::{node::GreenSlot, GreenElement, GreenElementRef};

/// An iterator over all slots of a [`GreenNode`](crate::GreenNode), including absent ones.
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    inner: slice::Iter<'a, GreenSlot>,
}

impl<'a> Slots<'a> {
    #[inline]
    pub(super) fn new(inner: slice::Iter<'a, GreenSlot>) -> Self {
        Self { inner }
    }
}

#[inline]
fn element(slot: &GreenSlot) -> Option<GreenElementRef<'_>> {
    slot.element.as_ref().map(GreenElement::as_ref)
}

impl ExactSizeIterator for Slots<'_> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<'a> Iterator for Slots<'a> {
    type Item = Option<GreenElementRef<'a>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    #[inline]
    fn count(self) -> usize {
        self.inner.count()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.inner.nth(n).map(element)
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl DoubleEndedIterator for Slots<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(element)
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.inner.nth_back(n).map(element)
    }
}

impl FusedIterator for Slots<'_> {}

/// An iterator over the present children of a [`GreenNode`](crate::GreenNode).
#[derive(Debug, Clone)]
pub struct Children<'a> {
    inner: slice::Iter<'a, GreenSlot>,
}

impl<'a> Children<'a> {
    #[inline]
    pub(super) fn new(inner: slice::Iter<'a, GreenSlot>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = GreenElementRef<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(element)
    }
}

impl FusedIterator for Children<'_> {}
