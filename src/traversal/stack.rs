use crate::{
    green::GreenTriviaList,
    syntax::tree::{RawElement, RawNode, RawToken, RawTrivia},
    traversal::{
        is_in_span,
        pool::{Pooled, PooledVec, StackPool},
    },
    NodeOrToken, TextRange, TextSize,
};

/// Walks the children of one node, entering token lists.
pub(crate) struct ChildCursor {
    parent: RawNode,
    slot:   usize,
    /// Position within the token list in `slot`.
    item:   usize,
    end:    usize,
}

impl ChildCursor {
    fn new(parent: RawNode) -> Self {
        let end = parent.green.slot_count();
        Self {
            parent,
            slot: 0,
            item: 0,
            end,
        }
    }

    /// The next present child whose full span is in `span`, or `None` once no further child can be.
    fn next_in_span(&mut self, span: TextRange) -> Option<RawElement> {
        while self.slot < self.end {
            let (slot, item) = (self.slot, self.item);
            let Some(element) = self.parent.green.slot(slot) else {
                self.slot += 1;
                continue;
            };
            let mut start = self.parent.offset + self.parent.green.slot_offset(slot);
            let full_len = match element {
                NodeOrToken::Node(list) if list.kind().is_list() => {
                    let Some(token) = (item < list.slot_count()).then(|| list.slot(item)).flatten() else {
                        self.slot += 1;
                        self.item = 0;
                        continue;
                    };
                    self.item += 1;
                    if self.item == list.slot_count() {
                        self.slot += 1;
                        self.item = 0;
                    }
                    start += list.slot_offset(item);
                    token.full_len()
                }
                _ => {
                    self.slot += 1;
                    element.full_len()
                }
            };
            if start > span.end() {
                // children are ordered, nothing after this one can be in the span either
                self.slot = self.end;
                return None;
            }
            if is_in_span(span, TextRange::at(start, full_len)) {
                return self.parent.child_in_slot(slot, item);
            }
        }
        None
    }

    /// Like [`next_in_span`](ChildCursor::next_in_span), skipping tokens.
    fn next_node_in_span(&mut self, span: TextRange) -> Option<RawNode> {
        while self.slot < self.end {
            let slot = self.slot;
            self.slot += 1;
            self.item = 0;
            let Some(element) = self.parent.green.slot(slot) else {
                continue;
            };
            let start = self.parent.offset + self.parent.green.slot_offset(slot);
            if start > span.end() {
                self.slot = self.end;
                return None;
            }
            if RawNode::is_red_node(element) && is_in_span(span, TextRange::at(start, element.full_len())) {
                return self.parent.child_node(slot);
            }
        }
        None
    }
}

/// Walks one trivia list of a token.
pub(crate) struct TriviaCursor {
    token:  RawToken,
    list:   GreenTriviaList,
    /// Trivia index of the first list element within the token.
    base:   usize,
    next:   usize,
    offset: TextSize,
}

impl TriviaCursor {
    fn leading(token: &RawToken) -> Self {
        Self {
            token:  token.clone(),
            list:   token.green.leading_trivia().clone(),
            base:   0,
            next:   0,
            offset: token.offset,
        }
    }

    fn trailing(token: &RawToken) -> Self {
        Self {
            token:  token.clone(),
            list:   token.green.trailing_trivia().clone(),
            base:   token.green.leading_trivia().len(),
            next:   0,
            offset: token.trailing_offset(),
        }
    }

    fn next(&mut self) -> Option<RawTrivia> {
        let green = self.list.get(self.next)?.clone();
        let trivia = RawTrivia {
            token: Some(self.token.clone()),
            offset: self.offset,
            index: self.base + self.next,
            green,
        };
        self.next += 1;
        self.offset += trivia.green.full_len();
        Some(trivia)
    }
}

/// Which of the typed stacks holds the next frame to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Which {
    Node,
    Trivia,
    Token,
}

static CHILD_CURSORS: StackPool<ChildCursor> = StackPool::new();
static TRIVIA_CURSORS: StackPool<TriviaCursor> = StackPool::new();
static TOKENS: StackPool<RawToken> = StackPool::new();
static DISCRIMINATORS: StackPool<Which> = StackPool::new();

impl Pooled for ChildCursor {
    fn pool() -> &'static StackPool<Self> {
        &CHILD_CURSORS
    }
}

impl Pooled for TriviaCursor {
    fn pool() -> &'static StackPool<Self> {
        &TRIVIA_CURSORS
    }
}

impl Pooled for RawToken {
    fn pool() -> &'static StackPool<Self> {
        &TOKENS
    }
}

impl Pooled for Which {
    fn pool() -> &'static StackPool<Self> {
        &DISCRIMINATORS
    }
}

/// The explicit stack of a traversal.
///
/// Frames live on three typed stacks. `which` records, for every frame in push order, which typed stack it is on, so
/// the frame to continue with is always the top of the stack named by the top of `which`.
pub(crate) struct TraversalStack {
    nodes:  PooledVec<ChildCursor>,
    trivia: PooledVec<TriviaCursor>,
    tokens: PooledVec<RawToken>,
    which:  PooledVec<Which>,
}

impl TraversalStack {
    pub(crate) const fn new() -> Self {
        Self {
            nodes:  PooledVec::new(),
            trivia: PooledVec::new(),
            tokens: PooledVec::new(),
            which:  PooledVec::new(),
        }
    }

    #[inline]
    fn check_lock_step(&self) {
        debug_assert_eq!(
            self.which.len(),
            self.nodes.len() + self.trivia.len() + self.tokens.len(),
            "traversal stacks out of sync"
        );
    }

    /// The kind of the frame on top, or `None` if the traversal is done.
    #[inline]
    pub(crate) fn peek(&self) -> Option<Which> {
        self.check_lock_step();
        self.which.last().copied()
    }

    pub(crate) fn push_children(&mut self, parent: RawNode) {
        if parent.green.slot_count() == 0 {
            return;
        }
        self.nodes.push(ChildCursor::new(parent));
        self.which.push(Which::Node);
    }

    pub(crate) fn push_leading_trivia(&mut self, token: &RawToken) {
        if token.green.leading_trivia().is_empty() {
            return;
        }
        self.trivia.push(TriviaCursor::leading(token));
        self.which.push(Which::Trivia);
    }

    pub(crate) fn push_trailing_trivia(&mut self, token: &RawToken) {
        if token.green.trailing_trivia().is_empty() {
            return;
        }
        self.trivia.push(TriviaCursor::trailing(token));
        self.which.push(Which::Trivia);
    }

    pub(crate) fn push_token(&mut self, token: RawToken) {
        self.tokens.push(token);
        self.which.push(Which::Token);
    }

    fn pop_which(&mut self, expected: Which) {
        let popped = self.which.pop();
        debug_assert_eq!(popped, Some(expected));
    }

    /// Advances the node frame on top. Pops it and returns `None` once it is exhausted.
    pub(crate) fn next_in_span(&mut self, span: TextRange) -> Option<RawElement> {
        debug_assert_eq!(self.peek(), Some(Which::Node));
        let next = self.nodes.last_mut().and_then(|cursor| cursor.next_in_span(span));
        if next.is_none() {
            self.nodes.pop();
            self.pop_which(Which::Node);
        }
        next
    }

    /// Like [`next_in_span`](TraversalStack::next_in_span), skipping tokens.
    pub(crate) fn next_node_in_span(&mut self, span: TextRange) -> Option<RawNode> {
        debug_assert_eq!(self.peek(), Some(Which::Node));
        let next = self.nodes.last_mut().and_then(|cursor| cursor.next_node_in_span(span));
        if next.is_none() {
            self.nodes.pop();
            self.pop_which(Which::Node);
        }
        next
    }

    /// Advances the trivia frame on top. Pops it and returns `None` once it is exhausted.
    pub(crate) fn next_trivia(&mut self) -> Option<RawTrivia> {
        debug_assert_eq!(self.peek(), Some(Which::Trivia));
        let next = self.trivia.last_mut().and_then(TriviaCursor::next);
        if next.is_none() {
            self.trivia.pop();
            self.pop_which(Which::Trivia);
        }
        next
    }

    pub(crate) fn pop_token(&mut self) -> Option<RawToken> {
        debug_assert_eq!(self.peek(), Some(Which::Token));
        let token = self.tokens.pop();
        self.pop_which(Which::Token);
        token
    }
}
