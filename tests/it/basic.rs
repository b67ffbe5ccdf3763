use super::{build_tree, build_tree_with_cache, two_level_tree, Element, SyntaxNode, TestLang};
use greenwood::{GreenNodeBuilder, NodeCache, NodeOrToken, SyntaxError, SyntaxKind, TextRange, TextSize};

#[test]
fn create() {
    let tree = two_level_tree();
    let tree = build_tree(&tree);
    assert_eq!(tree.syntax_kind(), SyntaxKind(0));
    assert_eq!(tree.kind(), SyntaxKind(0));
    {
        let leaf1_0 = tree.children().nth(1).unwrap().children_with_tokens().next().unwrap();
        let leaf1_0 = leaf1_0.into_token().unwrap();
        assert_eq!(leaf1_0.syntax_kind(), SyntaxKind(5));
        assert_eq!(leaf1_0.kind(), SyntaxKind(5));
        assert_eq!(leaf1_0.text(), "1.0");
        assert_eq!(leaf1_0.span(), TextRange::at(6.into(), 3.into()));
    }
    {
        let node2 = tree.children().nth(2).unwrap();
        assert_eq!(node2.syntax_kind(), SyntaxKind(6));
        assert_eq!(node2.kind(), SyntaxKind(6));
        assert_eq!(node2.children_with_tokens().count(), 3);
        assert_eq!(node2.to_full_string(), "2.02.12.2");
    }
}

#[test]
fn with_cache() {
    let mut cache = NodeCache::new();
    let tree = two_level_tree();
    let tree = build_tree_with_cache(&tree, &mut cache);
    let tree: SyntaxNode = SyntaxNode::new_root(tree);
    assert!(!cache.is_empty());
    {
        let leaf1_0 = tree.children().nth(1).unwrap().children_with_tokens().next().unwrap();
        let leaf1_0 = leaf1_0.into_token().unwrap();
        assert_eq!(leaf1_0.text(), "1.0");
        assert_eq!(leaf1_0.span(), TextRange::at(6.into(), 3.into()));
    }
    {
        let node2 = tree.children().nth(2).unwrap();
        assert_eq!(node2.to_full_string(), "2.02.12.2");
    }
}

#[test]
fn cache_shares_identical_subtrees() {
    use Element::*;
    let mut cache = NodeCache::new();
    let first = build_tree_with_cache(&Node(vec![Token("a")]), &mut cache);
    let second = build_tree_with_cache(&Node(vec![Token("a")]), &mut cache);
    assert!(first.ptr_eq(&second));

    let first = SyntaxNode::new_root(first);
    let second = SyntaxNode::new_root(second);
    assert!(first.is_identical_to(&second));
    // same green, but different trees
    assert_ne!(first, second);
}

#[test]
fn red_nodes_are_stable() {
    let tree = build_tree(&two_level_tree());
    let a = tree.children().nth(1).unwrap();
    let b = tree.first_child().unwrap().next_sibling().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.parent().unwrap(), tree);
    assert_eq!(a.index(), Some(1));
    assert!(tree.is_root());
    assert!(!a.is_root());
    assert_eq!(a.root(), tree);
}

#[test]
fn siblings_and_children() {
    let tree = build_tree(&two_level_tree());
    let kinds: Vec<_> = tree.children().rev().map(|node| node.kind()).collect();
    assert_eq!(kinds, [SyntaxKind(6), SyntaxKind(4), SyntaxKind(1)]);

    let last = tree.last_child().unwrap();
    assert_eq!(last.prev_sibling().unwrap().kind(), SyntaxKind(4));
    assert!(last.next_sibling().is_none());
    assert!(tree.first_child().unwrap().prev_sibling_or_token().is_none());

    let first_token = last.first_child_or_token().unwrap().into_token().unwrap();
    assert_eq!(first_token.text(), "2.0");
    assert_eq!(first_token.index(), 0);
    let next = first_token.next_sibling_or_token().unwrap();
    assert_eq!(next.as_token().unwrap().text(), "2.1");
    assert_eq!(last.last_token().unwrap().text(), "2.2");
    assert_eq!(tree.first_token().unwrap().text(), "0.0");
}

#[test]
fn next_and_prev_token_cross_nodes() {
    let tree = build_tree(&two_level_tree());
    let mut texts = Vec::new();
    let mut token = tree.first_token();
    while let Some(current) = token {
        texts.push(current.text().to_string());
        token = current.next_token();
    }
    assert_eq!(texts, ["0.0", "0.1", "1.0", "2.0", "2.1", "2.2"]);

    let last = tree.last_token().unwrap();
    assert_eq!(last.prev_token().unwrap().text(), "2.1");
    let middle = tree.children().nth(1).unwrap().first_token().unwrap();
    assert_eq!(middle.prev_token().unwrap().text(), "0.1");
    assert_eq!(middle.next_token().unwrap().text(), "2.0");
}

#[test]
fn missing_and_absent_slots() {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind(0));
    builder.token(SyntaxKind(1), "a");
    builder.absent();
    builder.missing_token(SyntaxKind(2));
    builder.token(SyntaxKind(3), "b");
    builder.finish_node();
    let (green, _) = builder.finish();
    let root = SyntaxNode::new_root(green);

    assert_eq!(root.slot_count(), 4);
    assert!(root.child_at_slot(1).is_none());
    let missing = root.child_at_slot(2).unwrap().into_token().unwrap();
    assert!(missing.is_missing());
    assert_eq!(missing.span(), TextRange::empty(1.into()));
    // absent slots are not children
    assert_eq!(root.children_with_tokens().count(), 3);

    // zero-width tokens are skipped by token navigation
    let a = root.first_token().unwrap();
    assert_eq!(a.next_token().unwrap().text(), "b");
    assert_eq!(root.first_token_including_zero_width().unwrap().text(), "a");
    assert_eq!(missing.next_token().unwrap().text(), "b");
}

#[test]
fn find_token() {
    let tree = build_tree(&two_level_tree());
    assert_eq!(tree.find_token(0.into()).unwrap().text(), "0.0");
    assert_eq!(tree.find_token(7.into()).unwrap().text(), "1.0");
    assert_eq!(tree.find_token(9.into()).unwrap().text(), "2.0");
    // the end of the tree belongs to its last token
    assert_eq!(tree.find_token(18.into()).unwrap().text(), "2.2");
    assert_eq!(tree.find_token(19.into()), Err(SyntaxError::PositionOutOfRange {
        position:  19.into(),
        full_span: TextRange::up_to(18.into()),
    }));

    let node2 = tree.children().nth(2).unwrap();
    assert!(node2.find_token(3.into()).is_err());
    assert_eq!(node2.find_token(13.into()).unwrap().text(), "2.1");
}

#[test]
fn find_node() {
    let tree = build_tree(&two_level_tree());
    let node = tree.find_node(TextRange::new(10.into(), 14.into())).unwrap();
    assert_eq!(node.kind(), SyntaxKind(6));
    // spanning two children finds the parent
    let node = tree.find_node(TextRange::new(5.into(), 7.into())).unwrap();
    assert_eq!(node, tree);
    let err = tree.find_node(TextRange::new(17.into(), 20.into())).unwrap_err();
    assert!(matches!(err, SyntaxError::SpanOutOfRange { .. }));
}

#[test]
fn covering_element() {
    let tree = build_tree(&two_level_tree());
    let element = tree.covering_element(TextRange::new(12.into(), 14.into()));
    assert_eq!(element.as_token().unwrap().text(), "2.1");
    let element = tree.covering_element(TextRange::new(12.into(), 17.into()));
    assert_eq!(element.kind(), SyntaxKind(6));
    assert!(matches!(element, NodeOrToken::Node(_)));
}

#[test]
fn contains() {
    let tree = build_tree(&two_level_tree());
    let node0 = tree.first_child().unwrap();
    let node2 = tree.last_child().unwrap();
    assert!(tree.contains(&node2));
    assert!(node2.contains(&node2));
    assert!(!node0.contains(&node2));
    assert!(!node2.contains(&tree));
}

#[test]
fn equivalence() {
    let a = build_tree(&two_level_tree());
    let b = build_tree(&two_level_tree());
    assert!(a.is_equivalent_to(&b));
    assert!(!a.is_identical_to(&b));

    let c = build_tree(&Element::Node(vec![Element::Token("0.0")]));
    assert!(!a.is_equivalent_to(&c));
}

#[test]
fn replace_with() {
    let tree = build_tree(&two_level_tree());
    let node1 = tree.children().nth(1).unwrap();

    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind(4));
    builder.token(SyntaxKind(5), "one");
    builder.finish_node();
    let (replacement, _) = builder.finish();

    let new_root = SyntaxNode::new_root(node1.replace_with(replacement));
    assert_eq!(new_root.to_full_string(), "0.00.1one2.02.12.2");
    // untouched siblings are shared with the old tree
    assert!(new_root.first_child().unwrap().is_identical_to(&tree.first_child().unwrap()));
    assert!(new_root.last_child().unwrap().is_identical_to(&tree.last_child().unwrap()));
    assert_eq!(new_root.last_child().unwrap().span_start(), TextSize::from(9));
    // the old tree is unchanged
    assert_eq!(tree.to_full_string(), "0.00.11.02.02.12.2");
}

#[test]
fn checkpoint_wraps_previous_children() {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind(0));
    let checkpoint = builder.checkpoint();
    builder.token(SyntaxKind(1), "a");
    builder.token(SyntaxKind(2), "b");
    builder.start_node_at(checkpoint, SyntaxKind(3));
    builder.finish_node();
    builder.token(SyntaxKind(4), "c");
    builder.finish_node();
    let (green, _) = builder.finish();
    let root = SyntaxNode::new_root(green);
    let wrapped = root.first_child().unwrap();
    assert_eq!(wrapped.kind(), SyntaxKind(3));
    assert_eq!(wrapped.to_full_string(), "ab");
    assert_eq!(root.children_with_tokens().count(), 2);
}

#[test]
fn deep_trees_do_not_overflow() {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    let depth = 2_000;
    for _ in 0..depth {
        builder.start_node(SyntaxKind(0));
    }
    builder.token(SyntaxKind(1), "x");
    for _ in 0..depth {
        builder.finish_node();
    }
    let (green, _) = builder.finish();
    let root = SyntaxNode::new_root(green);
    assert_eq!(root.descendant_nodes().count(), depth - 1);
    assert_eq!(root.descendant_tokens().count(), 1);
    assert_eq!(root.first_token().unwrap().text(), "x");
    assert_eq!(root.last_token().unwrap().ancestors().count(), depth);
}

#[test]
fn debug_output() {
    let tree = build_tree(&two_level_tree());
    let node0 = tree.first_child().unwrap();
    assert_eq!(format!("{node0:?}"), "SyntaxKind(1)@0..6");
    assert_eq!(format!("{node0}"), "0.00.1");
    let debug = tree.debug_tree();
    assert_eq!(debug.lines().count(), 10);
    assert!(debug.starts_with("SyntaxKind(0)@0..18"));
}
