use fxhash::FxHashMap;

use crate::{
    annotation::AnnotationSet,
    green::{
        node::measure, token::GreenTokenData, GreenElement, GreenNode, GreenToken, GreenTrivia,
        GreenTriviaList,
    },
    utility_types::MaybeOwned,
    Language, NodeOrToken, SyntaxKind, TextSize,
};

/// If `node.children() <= CHILDREN_CACHE_THRESHOLD`, we will not create
/// a new [`GreenNode`], but instead lookup in the cache if this node is
/// already present. If so we use the one in the cache, otherwise we insert
/// this node into the cache.
const CHILDREN_CACHE_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey {
    kind:       SyntaxKind,
    full_len:   TextSize,
    child_hash: u32,
}

/// A `NodeCache` deduplicates identical tokens, trivia and small nodes during tree construction.
///
/// Common leaves like punctuation, keywords or a single space end up as one shared allocation no matter how often
/// they occur. You can re-use the same cache for multiple similar trees with [`GreenNodeBuilder::with_cache`].
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes:  FxHashMap<NodeKey, GreenNode>,
    tokens: FxHashMap<GreenTokenData, GreenToken>,
    trivia: FxHashMap<SyntaxKind, FxHashMap<Box<str>, GreenTrivia>>,
}

impl NodeCache {
    /// Constructs a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node from its slots, re-using an identical node from the cache if it has few enough slots.
    pub fn node<I>(&mut self, kind: SyntaxKind, slots: I) -> GreenNode
    where
        I: IntoIterator<Item = Option<GreenElement>>,
    {
        let mut slots: Vec<Option<GreenElement>> = slots.into_iter().collect();
        self.node_from(kind, &mut slots, 0)
    }

    /// Creates a token without trivia, re-using an identical token from the cache.
    pub fn token(&mut self, kind: SyntaxKind, text: &str) -> GreenToken {
        self.token_with_trivia(kind, text, GreenTriviaList::empty(), GreenTriviaList::empty())
    }

    /// Creates a token with trivia, re-using an identical token from the cache.
    pub fn token_with_trivia(
        &mut self,
        kind: SyntaxKind,
        text: &str,
        leading: GreenTriviaList,
        trailing: GreenTriviaList,
    ) -> GreenToken {
        let data = GreenTokenData::new(kind, text, leading, trailing);
        self.tokens
            .entry(data)
            .or_insert_with_key(|data| GreenToken::from_data(data.clone()))
            .clone()
    }

    /// Creates plain text trivia, re-using identical trivia from the cache.
    pub fn trivia(&mut self, kind: SyntaxKind, text: &str) -> GreenTrivia {
        let by_text = self.trivia.entry(kind).or_default();
        if let Some(trivia) = by_text.get(text) {
            return trivia.clone();
        }
        let trivia = GreenTrivia::new(kind, text);
        by_text.insert(text.into(), trivia.clone());
        trivia
    }

    /// Number of distinct nodes, tokens and trivia held by the cache.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.tokens.len() + self.trivia.values().map(FxHashMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node_from(&mut self, kind: SyntaxKind, all_children: &mut Vec<Option<GreenElement>>, first: usize) -> GreenNode {
        // NOTE: this fn must remove all children starting at `first` from `all_children` before returning
        let (full_len, child_hash) = measure(&all_children[first..]);
        let slots: Vec<Option<GreenElement>> = all_children.drain(first..).collect();

        // Green nodes are fully immutable, so it's ok to deduplicate them.
        if slots.len() > CHILDREN_CACHE_THRESHOLD {
            return GreenNode::from_parts(kind, slots, full_len, child_hash, AnnotationSet::EMPTY);
        }
        let key = NodeKey {
            kind,
            full_len,
            child_hash,
        };
        if let Some(cached) = self.nodes.get(&key) {
            let same = cached.raw_slots().len() == slots.len()
                && cached.raw_slots().iter().zip(&slots).all(|(slot, element)| slot.element == *element);
            if same {
                log::trace!("node cache hit for {kind:?}");
                return cached.clone();
            }
            log::trace!("node cache hash collision for {kind:?}, building an uncached node");
            return GreenNode::from_parts(kind, slots, full_len, child_hash, AnnotationSet::EMPTY);
        }
        log::trace!("node cache miss for {kind:?}");
        let node = GreenNode::from_parts(kind, slots, full_len, child_hash, AnnotationSet::EMPTY);
        self.nodes.insert(key, node.clone());
        node
    }
}

/// A checkpoint for maybe wrapping a node. See [`GreenNodeBuilder::checkpoint`] for details.
#[derive(Clone, Copy, Debug)]
pub struct Checkpoint(usize);

#[derive(Debug)]
enum Frame<K> {
    Node {
        kind:        K,
        first_child: usize,
    },
    List {
        first_child: usize,
    },
    Structure {
        trivia_kind: K,
        node_kind:   K,
        first_child: usize,
        leading:     Vec<GreenTrivia>,
    },
}

impl<K> Frame<K> {
    fn first_child(&self) -> usize {
        match self {
            Frame::Node { first_child, .. } | Frame::List { first_child } | Frame::Structure { first_child, .. } => {
                *first_child
            }
        }
    }
}

/// A builder for green trees.
/// Construct with [`new`](GreenNodeBuilder::new), [`with_cache`](GreenNodeBuilder::with_cache), or
/// [`from_cache`](GreenNodeBuilder::from_cache). To add tree nodes, start them with
/// [`start_node`](GreenNodeBuilder::start_node), add [`token`](GreenNodeBuilder::token)s and then
/// [`finish_node`](GreenNodeBuilder::finish_node). When the whole tree is constructed, call
/// [`finish`](GreenNodeBuilder::finish) to obtain the root.
///
/// Trivia added with [`trivia`](GreenNodeBuilder::trivia) is held back and becomes the leading trivia of the next
/// token. [`trailing_trivia`](GreenNodeBuilder::trailing_trivia) attaches to the token added last.
///
/// # Examples
/// ```
/// # use greenwood::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// # enum Lang {}
/// # impl Language for Lang {
/// #     type Kind = SyntaxKind;
/// #     fn kind_from_raw(raw: SyntaxKind) -> SyntaxKind { raw }
/// #     fn kind_to_raw(kind: SyntaxKind) -> SyntaxKind { kind }
/// # }
/// const ROOT: SyntaxKind = SyntaxKind(0);
/// const INT: SyntaxKind = SyntaxKind(1);
/// const WHITESPACE: SyntaxKind = SyntaxKind(2);
///
/// let mut builder: GreenNodeBuilder<Lang> = GreenNodeBuilder::new();
/// builder.start_node(ROOT);
/// builder.trivia(WHITESPACE, "  ");
/// builder.token(INT, "42");
/// builder.trailing_trivia(WHITESPACE, "\n");
/// builder.finish_node();
/// let (tree, _cache) = builder.finish();
///
/// assert_eq!(tree.kind(), ROOT);
/// assert_eq!(tree.to_full_string(), "  42\n");
/// assert_eq!(tree.width(), 2.into());
/// ```
#[derive(Debug)]
pub struct GreenNodeBuilder<'cache, L: Language> {
    cache:    MaybeOwned<'cache, NodeCache>,
    parents:  Vec<Frame<L::Kind>>,
    children: Vec<Option<GreenElement>>,
    leading:  Vec<GreenTrivia>,
}

impl<L: Language> GreenNodeBuilder<'static, L> {
    /// Creates new builder with an empty [`NodeCache`].
    pub fn new() -> Self {
        Self::from_cache(NodeCache::new())
    }

    /// Reusing a [`NodeCache`] between multiple builders saves memory, as it allows to structurally
    /// share underlying trees.
    /// The `cache` given will be returned on [`finish`](GreenNodeBuilder::finish).
    pub fn from_cache(cache: NodeCache) -> Self {
        Self {
            cache:    MaybeOwned::Owned(cache),
            parents:  Vec::with_capacity(8),
            children: Vec::with_capacity(8),
            leading:  Vec::new(),
        }
    }
}

impl<L: Language> Default for GreenNodeBuilder<'static, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cache, L: Language> GreenNodeBuilder<'cache, L> {
    /// Reusing a [`NodeCache`] between multiple builders saves memory, as it allows to structurally
    /// share underlying trees.
    pub fn with_cache(cache: &'cache mut NodeCache) -> Self {
        Self {
            cache:    MaybeOwned::Borrowed(cache),
            parents:  Vec::with_capacity(8),
            children: Vec::with_capacity(8),
            leading:  Vec::new(),
        }
    }

    /// The cache used to deduplicate tree elements.
    #[inline]
    pub fn cache(&mut self) -> &mut NodeCache {
        &mut self.cache
    }

    /// Add plain trivia to be used as leading trivia of the next token.
    #[inline]
    pub fn trivia(&mut self, kind: L::Kind, text: &str) {
        let trivia = self.cache.trivia(L::kind_to_raw(kind), text);
        self.leading.push(trivia);
    }

    /// Add pre-built trivia to be used as leading trivia of the next token.
    #[inline]
    pub fn push_trivia(&mut self, trivia: GreenTrivia) {
        self.leading.push(trivia);
    }

    /// Add a new token to the current branch, with all pending trivia as its leading trivia.
    #[inline]
    pub fn token(&mut self, kind: L::Kind, text: &str) {
        let leading = GreenTriviaList::from_vec(std::mem::take(&mut self.leading));
        let token = self
            .cache
            .token_with_trivia(L::kind_to_raw(kind), text, leading, GreenTriviaList::empty());
        self.children.push(Some(token.into()));
    }

    /// Add a zero-width token for one the parser expected but did not find.
    ///
    /// Pending trivia is kept for the next real token.
    #[inline]
    pub fn missing_token(&mut self, kind: L::Kind) {
        self.children.push(Some(GreenToken::missing(L::kind_to_raw(kind)).into()));
    }

    /// Add an absent slot for an optional element that is not there.
    #[inline]
    pub fn absent(&mut self) {
        self.children.push(None);
    }

    /// Add a pre-built token. Pending trivia is prepended to its leading trivia.
    pub fn push_token(&mut self, token: GreenToken) {
        let token = if self.leading.is_empty() {
            token
        } else {
            let mut leading = std::mem::take(&mut self.leading);
            leading.extend(token.leading_trivia().iter().cloned());
            token.with_leading_trivia(GreenTriviaList::from_vec(leading))
        };
        self.children.push(Some(token.into()));
    }

    /// Add a pre-built node, e.g. a subtree taken from an older tree.
    #[inline]
    pub fn push_node(&mut self, node: GreenNode) {
        self.children.push(Some(node.into()));
    }

    /// Add trailing trivia to the token that was added last.
    ///
    /// ## Panics
    /// If the last child of the current branch is not a token.
    pub fn trailing_trivia(&mut self, kind: L::Kind, text: &str) {
        let trivia = self.cache.trivia(L::kind_to_raw(kind), text);
        let first_child = self.parents.last().map_or(0, Frame::first_child);
        let token = match self.children.pop() {
            Some(Some(NodeOrToken::Token(token))) if self.children.len() >= first_child => token,
            _ => panic!("`trailing_trivia` must directly follow a token of the current node"),
        };
        let data = token.data();
        let mut trailing = data.trailing.as_slice().to_vec();
        trailing.push(trivia);
        let token = if token.is_missing() {
            token.with_trailing_trivia(GreenTriviaList::from_vec(trailing))
        } else {
            self.cache.token_with_trivia(
                data.kind,
                &data.text,
                data.leading.clone(),
                GreenTriviaList::from_vec(trailing),
            )
        };
        self.children.push(Some(token.into()));
    }

    /// Start new node of the given `kind` and make it current.
    #[inline]
    pub fn start_node(&mut self, kind: L::Kind) {
        let first_child = self.children.len();
        self.parents.push(Frame::Node { kind, first_child });
    }

    /// Finish the current branch and restore the previous branch as current.
    ///
    /// ## Panics
    /// If the current branch was not started with [`start_node`](GreenNodeBuilder::start_node) or
    /// [`start_node_at`](GreenNodeBuilder::start_node_at).
    #[inline]
    pub fn finish_node(&mut self) {
        let (kind, first_child) = match self.parents.pop() {
            Some(Frame::Node { kind, first_child }) => (kind, first_child),
            Some(_) => panic!("`finish_node` called on an open token list or structured trivia"),
            None => panic!("`finish_node` called without a matching `start_node`"),
        };
        // NOTE: we rely on the node cache to remove all children starting at `first_child` from `self.children`
        let node = self.cache.node_from(L::kind_to_raw(kind), &mut self.children, first_child);
        self.children.push(Some(node.into()));
    }

    /// Start a token list. All children until [`finish_token_list`](GreenNodeBuilder::finish_token_list) must be
    /// tokens.
    #[inline]
    pub fn start_token_list(&mut self) {
        let first_child = self.children.len();
        self.parents.push(Frame::List { first_child });
    }

    /// Finish the current token list and add it as a single slot of the enclosing node.
    ///
    /// Empty lists become an absent slot, lists of one token the token itself, and longer lists a node of kind
    /// [`SyntaxKind::LIST`].
    pub fn finish_token_list(&mut self) {
        let first_child = match self.parents.pop() {
            Some(Frame::List { first_child }) => first_child,
            _ => panic!("`finish_token_list` called without a matching `start_token_list`"),
        };
        let mut tokens: Vec<GreenToken> = self
            .children
            .drain(first_child..)
            .map(|child| match child {
                Some(NodeOrToken::Token(token)) => token,
                _ => panic!("token lists may only contain tokens"),
            })
            .collect();
        let slot = match tokens.len() {
            0 => None,
            1 => tokens.pop().map(GreenElement::from),
            _ => {
                let slots = tokens.into_iter().map(|token| Some(token.into()));
                Some(self.cache.node(SyntaxKind::LIST, slots).into())
            }
        };
        self.children.push(slot);
    }

    /// Start a node whose content becomes structured trivia of kind `trivia_kind` when it is finished with
    /// [`finish_structured_trivia`](GreenNodeBuilder::finish_structured_trivia).
    ///
    /// Trivia pending before this call stays in front of the structured trivia.
    pub fn start_structured_trivia(&mut self, trivia_kind: L::Kind, node_kind: L::Kind) {
        let first_child = self.children.len();
        let leading = std::mem::take(&mut self.leading);
        self.parents.push(Frame::Structure {
            trivia_kind,
            node_kind,
            first_child,
            leading,
        });
    }

    /// Finish the current structured trivia and add it to the pending leading trivia of the next token.
    ///
    /// ## Panics
    /// If the current branch was not started with
    /// [`start_structured_trivia`](GreenNodeBuilder::start_structured_trivia).
    pub fn finish_structured_trivia(&mut self) {
        let (trivia_kind, node_kind, first_child, mut leading) = match self.parents.pop() {
            Some(Frame::Structure {
                trivia_kind,
                node_kind,
                first_child,
                leading,
            }) => (trivia_kind, node_kind, first_child, leading),
            _ => panic!("`finish_structured_trivia` called without a matching `start_structured_trivia`"),
        };
        assert!(
            self.leading.is_empty(),
            "structured trivia must end with a token, but there is trivia left over"
        );
        let structure = self.cache.node_from(L::kind_to_raw(node_kind), &mut self.children, first_child);
        leading.push(GreenTrivia::structured(L::kind_to_raw(trivia_kind), structure));
        self.leading = leading;
    }

    /// Prepare for maybe wrapping the next node with a surrounding node.
    ///
    /// The way wrapping works is that you first get a checkpoint, then you add nodes and tokens as
    /// normal, and then you *maybe* call [`start_node_at`](GreenNodeBuilder::start_node_at).
    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.children.len())
    }

    /// Wrap the previous branch marked by [`checkpoint`](GreenNodeBuilder::checkpoint) in a new
    /// branch and make it current.
    #[inline]
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: L::Kind) {
        let Checkpoint(checkpoint) = checkpoint;
        assert!(
            checkpoint <= self.children.len(),
            "checkpoint no longer valid, was finish_node called early?"
        );

        if let Some(parent) = self.parents.last() {
            assert!(
                checkpoint >= parent.first_child(),
                "checkpoint no longer valid, was an unmatched start_node_at called?"
            );
        }

        self.parents.push(Frame::Node {
            kind,
            first_child: checkpoint,
        });
    }

    /// Complete building the tree.
    ///
    /// Make sure that calls to [`start_node`](GreenNodeBuilder::start_node) /
    /// [`start_node_at`](GreenNodeBuilder::start_node_at) and
    /// [`finish_node`](GreenNodeBuilder::finish_node) are balanced, i.e. that every started node has
    /// been completed, and that all trivia has been attached to a token. Trivia at the end of a file belongs to an
    /// end-of-file token.
    ///
    /// If this builder was constructed with [`new`](GreenNodeBuilder::new) or
    /// [`from_cache`](GreenNodeBuilder::from_cache), this method returns the cache used to deduplicate tree nodes
    /// as its second return value to allow re-using the cache.
    #[inline]
    pub fn finish(mut self) -> (GreenNode, Option<NodeCache>) {
        assert!(self.parents.is_empty(), "called `finish` with unfinished nodes");
        assert!(self.leading.is_empty(), "called `finish` with trivia that was never attached to a token");
        assert_eq!(self.children.len(), 1, "the tree must have exactly one root");
        let cache = self.cache.into_owned();
        match self.children.pop() {
            Some(Some(NodeOrToken::Node(node))) => (node, cache),
            _ => panic!("called `finish` on a `GreenNodeBuilder` which did not contain a root node"),
        }
    }
}
