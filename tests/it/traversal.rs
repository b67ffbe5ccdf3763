use super::{build_tree, sexp, two_level_tree, SyntaxNode, TestLang};
use greenwood::{
    GreenNode, GreenToken, GreenTrivia, GreenTriviaList, NodeOrToken, SyntaxKind, TextRange, TraversalOptions,
};
use test_log::test;

fn kinds(nodes: impl Iterator<Item = SyntaxNode>) -> Vec<u16> {
    nodes.map(|node| node.kind().0).collect()
}

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn document_order() {
    let tree = build_tree(&two_level_tree());
    assert_eq!(kinds(tree.descendant_nodes()), [1, 4, 6]);
    assert_eq!(kinds(tree.descendant_nodes_and_self()), [0, 1, 4, 6]);

    let elements: Vec<_> = tree.descendant_nodes_and_tokens().map(|element| element.kind().0).collect();
    assert_eq!(elements, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    let elements: Vec<_> = tree
        .descendant_nodes_and_tokens_and_self()
        .map(|element| element.kind().0)
        .collect();
    assert_eq!(elements, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

    let tokens: Vec<_> = tree.descendant_tokens().map(|token| token.text().to_string()).collect();
    assert_eq!(tokens, ["0.0", "0.1", "1.0", "2.0", "2.1", "2.2"]);
}

#[test]
fn traversal_of_a_subtree() {
    let tree = build_tree(&two_level_tree());
    let node2 = tree.last_child().unwrap();
    let tokens: Vec<_> = node2.descendant_tokens().map(|token| token.text().to_string()).collect();
    assert_eq!(tokens, ["2.0", "2.1", "2.2"]);
    assert_eq!(node2.descendant_nodes().count(), 0);
    assert_eq!(kinds(node2.descendant_nodes_and_self()), [6]);
}

#[test]
fn span_filter() {
    let tree = build_tree(&two_level_tree());
    let in_span = |span| {
        tree.descendant_tokens_with(TraversalOptions::new().within(span))
            .map(|token| token.text().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(in_span(range(6, 9)), ["1.0"]);
    assert_eq!(in_span(range(7, 13)), ["1.0", "2.0", "2.1"]);
    assert_eq!(in_span(range(17, 18)), ["2.2"]);
    // non-empty elements must overlap, touching is not enough
    assert!(in_span(range(18, 18)).is_empty());

    let nodes = tree.descendant_nodes_with(TraversalOptions::new().within(range(6, 9)));
    assert_eq!(kinds(nodes), [4]);
    let nodes = tree.descendant_nodes_with(TraversalOptions::new().within(range(5, 10)).include_self(true));
    assert_eq!(kinds(nodes), [0, 1, 4, 6]);
}

#[test]
fn zero_width_elements_touching_the_span() {
    let green = GreenNode::new(SyntaxKind(0), [
        GreenToken::new(SyntaxKind(1), "abc").into(),
        GreenToken::missing(SyntaxKind(2)).into(),
        GreenToken::new(SyntaxKind(3), "def").into(),
    ]);
    let tree = SyntaxNode::new_root(green);
    let in_span = |span| {
        tree.descendant_tokens_with(TraversalOptions::new().within(span))
            .map(|token| token.kind().0)
            .collect::<Vec<_>>()
    };
    assert_eq!(in_span(TextRange::empty(3.into())), [2]);
    assert_eq!(in_span(range(0, 3)), [1, 2]);
    assert_eq!(in_span(range(3, 6)), [2, 3]);
    assert_eq!(in_span(range(0, 6)), [1, 2, 3]);
    // an empty span inside a token still overlaps it
    assert_eq!(in_span(TextRange::empty(1.into())), [1]);
}

#[test]
fn descend_predicate_prunes_children_only() {
    let tree = build_tree(&two_level_tree());
    let options = TraversalOptions::new().descend_into_children(|node: &SyntaxNode| node.kind() != SyntaxKind(1));
    let elements: Vec<_> = tree
        .descendant_nodes_and_tokens_with(options)
        .map(|element| element.kind().0)
        .collect();
    // the pruned node is still visited
    assert_eq!(elements, [1, 4, 5, 6, 7, 8, 9]);

    let mut asked = Vec::new();
    let options = TraversalOptions::new().descend_into_children(|node: &SyntaxNode| {
        asked.push(node.kind().0);
        true
    });
    assert_eq!(tree.descendant_nodes_with(options).count(), 3);
    // the start node is asked as well
    assert_eq!(asked, [0, 1, 4, 6]);
}

#[test]
fn rejected_nodes_are_yielded_but_not_entered() {
    let leaf = |kind: u16, text: &str| GreenNode::new(SyntaxKind(kind), [GreenToken::new(SyntaxKind(20), text).into()]);
    // A(B(D, E), C)
    let b = GreenNode::new(SyntaxKind(11), [leaf(13, "d").into(), leaf(14, "e").into()]);
    let a = GreenNode::new(SyntaxKind(10), [b.into(), leaf(12, "c").into()]);
    let tree = SyntaxNode::new_root(a);
    let options = TraversalOptions::new()
        .descend_into_children(|node: &SyntaxNode| node.kind() != SyntaxKind(11))
        .include_self(true);
    assert_eq!(kinds(tree.descendant_nodes_with(options)), [10, 11, 12]);
}

#[test]
fn token_lists_are_walked_token_by_token() {
    let list = GreenNode::new(SyntaxKind::LIST, [
        GreenToken::new(SyntaxKind(2), "ab").into(),
        GreenToken::new(SyntaxKind(3), "cd").into(),
    ]);
    let inner = GreenNode::new(SyntaxKind(4), [GreenToken::new(SyntaxKind(5), "ef").into()]);
    let tree = SyntaxNode::new_root(GreenNode::new(SyntaxKind(0), [list.into(), inner.into()]));

    assert_eq!(kinds(tree.descendant_nodes()), [4]);
    let elements: Vec<_> = tree.descendant_nodes_and_tokens().map(|element| element.kind().0).collect();
    assert_eq!(elements, [2, 3, 4, 5]);
    let in_span: Vec<_> = tree
        .descendant_tokens_with(TraversalOptions::new().within(range(2, 4)))
        .map(|token| token.text().to_string())
        .collect();
    assert_eq!(in_span, ["cd"]);
    let parents: Vec<_> = tree.descendant_tokens().map(|token| token.parent().unwrap()).collect();
    assert_eq!(parents[0], tree);
    assert_eq!(parents[1], tree);
}

#[test]
fn predicate_rejecting_the_start_node() {
    let tree = build_tree(&two_level_tree());
    let never = |_: &SyntaxNode| false;
    let visited: Vec<_> = tree
        .descendant_nodes_and_tokens_with(TraversalOptions::new().descend_into_children(never).include_self(true))
        .collect();
    assert_eq!(visited.len(), 1);
    assert_eq!(visited[0], NodeOrToken::Node(tree.clone()));
    assert_eq!(
        tree.descendant_nodes_with(TraversalOptions::new().descend_into_children(never))
            .count(),
        0
    );
    assert_eq!(
        tree.descendant_tokens_with(TraversalOptions::new().descend_into_children(never))
            .count(),
        0
    );
}

#[test]
fn start_node_outside_the_span() {
    let tree = build_tree(&two_level_tree());
    let node2 = tree.last_child().unwrap();
    let options = TraversalOptions::new().within(range(0, 3)).include_self(true);
    assert_eq!(node2.descendant_nodes_with(options).count(), 0);
}

#[test]
fn interleaved_traversals() {
    let tree = build_tree(&two_level_tree());
    let a = tree.descendant_nodes_and_tokens();
    let b = tree.descendant_nodes_and_tokens();
    for (a, b) in a.zip(b) {
        assert_eq!(a, b);
        // a nested walk on every step
        if let NodeOrToken::Node(node) = &a {
            assert_eq!(
                node.descendant_tokens().count(),
                node.children_with_tokens().filter(NodeOrToken::is_token).count()
            );
        }
    }
}

#[test]
fn abandoned_traversals_release_their_stacks() {
    let tree = build_tree(&two_level_tree());
    for _ in 0..100 {
        let mut walk = tree.descendant_nodes_and_tokens();
        walk.next();
        walk.next();
    }
    assert_eq!(tree.descendant_nodes_and_tokens().count(), 9);
}

#[test]
fn trivia_order() {
    let tree = sexp::parse("a #(b c) d");
    let texts: Vec<_> = tree.descendant_trivia().map(|trivia| trivia.to_full_string()).collect();
    assert_eq!(texts, [" ", "#(b c) "]);

    let options = TraversalOptions::new().descend_into_trivia(true);
    let texts: Vec<_> = tree
        .descendant_trivia_with(options)
        .map(|trivia| trivia.to_full_string())
        .collect();
    // the structured trivia comes before the trivia inside it
    assert_eq!(texts, [" ", "#(b c) ", " ", " "]);

    let spans: Vec<_> = tree
        .descendant_trivia_with(TraversalOptions::new().descend_into_trivia(true))
        .map(|trivia| trivia.full_span())
        .collect();
    assert_eq!(spans, [range(1, 2), range(2, 9), range(5, 6), range(8, 9)]);
}

#[test]
fn trivia_within_a_span() {
    let tree = sexp::parse("a #(b c) d");
    let options = TraversalOptions::new().descend_into_trivia(true).within(range(4, 7));
    let texts: Vec<_> = tree
        .descendant_trivia_with(options)
        .map(|trivia| trivia.to_full_string())
        .collect();
    assert_eq!(texts, ["#(b c) ", " "]);
}

#[test]
fn tokens_inside_structured_trivia() {
    let tree = sexp::parse("a #(b c) d");
    let texts = |options: TraversalOptions<sexp::Sexp>| {
        tree.descendant_tokens_with(options)
            .map(|token| token.text().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(texts(TraversalOptions::new()), ["a", "d", ""]);
    assert_eq!(texts(TraversalOptions::new().descend_into_trivia(true)), [
        "a", "#", "(", "b", "c", ")", "d", ""
    ]);
}

#[test]
fn nodes_inside_structured_trivia() {
    use sexp::Kind::*;

    let tree = sexp::parse("a #(b c) d");
    let plain: Vec<_> = tree.descendant_nodes().map(|node| node.kind()).collect();
    assert_eq!(plain, [Atom, Atom]);

    let options = TraversalOptions::new().descend_into_trivia(true);
    let all: Vec<_> = tree.descendant_nodes_with(options).map(|node| node.kind()).collect();
    assert_eq!(all, [Atom, Atom, Directive, List, Atom, Atom]);

    let options = TraversalOptions::new().descend_into_trivia(true);
    let elements: Vec<_> = tree
        .descendant_nodes_and_tokens_with(options)
        .map(|element| element.kind())
        .collect();
    assert_eq!(elements, [
        Atom, Word, Atom, Directive, Hash, List, LParen, Atom, Word, Atom, Word, RParen, Word, Eof
    ]);

    // pruning the structure keeps the structure itself
    let options = TraversalOptions::new()
        .descend_into_trivia(true)
        .descend_into_children(|node: &sexp::SyntaxNode| node.kind() != Directive);
    let pruned: Vec<_> = tree.descendant_nodes_with(options).map(|node| node.kind()).collect();
    assert_eq!(pruned, [Atom, Atom, Directive]);
}

/// A token with structured trivia on both sides: `<#l> x <#t>`.
fn token_with_structures() -> SyntaxNode {
    let structure = |text: &str| GreenNode::new(SyntaxKind(10), [GreenToken::new(SyntaxKind(11), text).into()]);
    let token = GreenToken::with_trivia(
        SyntaxKind(1),
        "x",
        GreenTriviaList::from_vec(vec![
            GreenTrivia::structured(SyntaxKind(12), structure("#l")),
            GreenTrivia::new(SyntaxKind(13), " "),
        ]),
        GreenTriviaList::from_vec(vec![
            GreenTrivia::new(SyntaxKind(13), " "),
            GreenTrivia::structured(SyntaxKind(12), structure("#t")),
        ]),
    );
    SyntaxNode::new_root(GreenNode::new(SyntaxKind(0), [token.into()]))
}

#[test]
fn leading_structure_then_token_then_trailing_structure() {
    let tree = token_with_structures();
    assert_eq!(tree.to_full_string(), "#l x #t");

    let options = TraversalOptions::<TestLang>::new().descend_into_trivia(true);
    let visited: Vec<_> = tree
        .descendant_nodes_and_tokens_with(options)
        .map(|element| match element {
            NodeOrToken::Node(node) => format!("node {}", node.kind().0),
            NodeOrToken::Token(token) => format!("token {}", token.text()),
        })
        .collect();
    assert_eq!(visited, ["node 10", "token #l", "token x", "node 10", "token #t"]);

    let options = TraversalOptions::<TestLang>::new().descend_into_trivia(true);
    let tokens: Vec<_> = tree
        .descendant_tokens_with(options)
        .map(|token| token.span())
        .collect();
    assert_eq!(tokens, [range(0, 2), range(3, 4), range(5, 7)]);
}

#[test]
fn structures_are_only_entered_in_span() {
    let tree = token_with_structures();
    let options = TraversalOptions::<TestLang>::new().descend_into_trivia(true).within(range(3, 6));
    let tokens: Vec<_> = tree
        .descendant_tokens_with(options)
        .map(|token| token.text().to_string())
        .collect();
    assert_eq!(tokens, ["x", "#t"]);
}
