use super::{SyntaxNode, TestLang};
use greenwood::{GreenNode, GreenNodeBuilder, GreenToken, GreenTrivia, NodeOrToken, SyntaxAnnotation, SyntaxKind};
use test_log::test;

const ROOT: SyntaxKind = SyntaxKind(0);
const INNER: SyntaxKind = SyntaxKind(1);
const WORD: SyntaxKind = SyntaxKind(2);
const WS: SyntaxKind = SyntaxKind(3);
const DIRECTIVE: SyntaxKind = SyntaxKind(4);
const DIRECTIVE_TRIVIA: SyntaxKind = SyntaxKind(5);

/// `a b c`, where `c` carries `mark` and the space before `b` is elastic.
fn annotated_tree(mark: &SyntaxAnnotation) -> SyntaxNode {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(ROOT);
    builder.start_node(INNER);
    builder.token(WORD, "a");
    builder.finish_node();
    builder.push_trivia(GreenTrivia::elastic(WS, " "));
    builder.token(WORD, "b");
    builder.trivia(WS, " ");
    builder.push_token(GreenToken::new(WORD, "c").with_additional_annotations([mark.clone()]));
    builder.finish_node();
    let (green, _) = builder.finish();
    SyntaxNode::new_root(green)
}

fn plain_tree() -> SyntaxNode {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(ROOT);
    builder.start_node(INNER);
    builder.token(WORD, "a");
    builder.finish_node();
    builder.trivia(WS, " ");
    builder.token(WORD, "b");
    builder.finish_node();
    let (green, _) = builder.finish();
    SyntaxNode::new_root(green)
}

#[test]
fn identity() {
    let a = SyntaxAnnotation::with_kind("rename");
    let b = SyntaxAnnotation::with_kind("rename");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(a.kind(), Some("rename"));
    assert!(a.is_kind("rename"));
    assert!(!a.is_kind("format"));
    assert!(!a.is_kind("never interned"));

    let with_data = SyntaxAnnotation::with_data("rename", "new_name");
    assert_eq!(with_data.data(), Some("new_name"));
    let bare = SyntaxAnnotation::new();
    assert_eq!(bare.kind(), None);
    assert_eq!(bare.data(), None);
    assert!(!bare.is_kind("rename"));
}

#[test]
fn elastic_is_a_singleton() {
    let elastic = SyntaxAnnotation::elastic();
    assert_eq!(elastic, SyntaxAnnotation::elastic());
    assert!(elastic.is_elastic());
    assert!(!SyntaxAnnotation::new().is_elastic());

    let trivia = GreenTrivia::elastic(WS, " ");
    assert!(trivia.is_elastic());
    assert!(trivia.has_annotation(&elastic));
    assert!(!GreenTrivia::new(WS, " ").is_elastic());
}

#[test]
fn attaching_does_not_mutate() {
    let mark = SyntaxAnnotation::with_kind("mark");
    let token = GreenToken::new(WORD, "x");
    let marked = token.with_additional_annotations([mark.clone()]);
    assert!(!token.has_annotation(&mark));
    assert!(marked.has_annotation(&mark));
    assert!(marked.contains_annotations());
    assert!(!token.contains_annotations());
    // annotations do not take part in equivalence
    assert!(marked.is_equivalent_to(&token));

    let twice = marked.with_additional_annotations([mark.clone(), mark.clone()]);
    assert_eq!(twice.annotations().len(), 1);

    let removed = marked.without_annotations([&mark]);
    assert!(!removed.contains_annotations());
    assert!(marked.has_annotation(&mark));
}

#[test]
fn fast_path_flag_propagates() {
    let mark = SyntaxAnnotation::with_kind("mark");
    let tree = annotated_tree(&mark);
    assert!(tree.contains_annotations());
    assert!(!tree.has_any_annotations());
    let inner = tree.first_child().unwrap();
    assert!(!inner.contains_annotations());

    let plain = plain_tree();
    assert!(!plain.contains_annotations());
    assert_eq!(plain.annotated_nodes_and_tokens("mark").count(), 0);
    assert_eq!(plain.annotated_trivia("mark").count(), 0);
}

#[test]
fn find_annotated_elements() {
    let mark = SyntaxAnnotation::with_kind("mark");
    let tree = annotated_tree(&mark);

    let tokens: Vec<_> = tree.annotated_tokens("mark").collect();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text(), "c");
    assert!(tokens[0].has_annotation(&mark));
    assert_eq!(tokens[0].annotations_of_kind("mark").count(), 1);
    assert_eq!(tree.annotated_nodes("mark").count(), 0);
    assert_eq!(tree.annotated_tokens("other").count(), 0);

    let elastic: Vec<_> = tree.descendant_trivia().filter(|trivia| trivia.is_elastic()).collect();
    assert_eq!(elastic.len(), 1);
    assert_eq!(elastic[0].token().unwrap().text(), "b");
}

#[test]
fn annotated_trivia() {
    let comment = SyntaxAnnotation::with_kind("comment");
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(ROOT);
    builder.push_trivia(GreenTrivia::new(WS, "// keep").with_additional_annotations([comment.clone()]));
    builder.trivia(WS, "\n");
    builder.token(WORD, "a");
    builder.finish_node();
    let (green, _) = builder.finish();
    let tree = SyntaxNode::new_root(green);

    let found: Vec<_> = tree.annotated_trivia("comment").collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), Some("// keep"));
    assert!(found[0].has_annotation(&comment));
    assert!(tree.first_token().unwrap().contains_annotations());
}

#[test]
fn annotated_nodes_include_self() {
    let mark = SyntaxAnnotation::with_kind("mark");
    let tree = plain_tree().with_additional_annotations([mark.clone()]);
    assert!(tree.has_annotation(&mark));
    let nodes: Vec<_> = tree.annotated_nodes("mark").collect();
    assert_eq!(nodes, [tree.clone()]);

    let cleared = tree.without_annotations_of_kind("mark");
    assert!(!cleared.has_any_annotations());
    assert!(tree.has_annotation(&mark));
}

#[test]
fn annotations_inside_structured_trivia() {
    let mark = SyntaxAnnotation::with_kind("mark");
    let hash = GreenToken::new(WORD, "#x").with_additional_annotations([mark.clone()]);
    let structure = GreenNode::new(DIRECTIVE, [hash.into()]);
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(ROOT);
    builder.push_trivia(GreenTrivia::structured(DIRECTIVE_TRIVIA, structure));
    builder.trivia(WS, " ");
    builder.token(WORD, "a");
    builder.finish_node();
    let (green, _) = builder.finish();
    let tree = SyntaxNode::new_root(green);
    assert!(tree.contains_annotations());
    assert_eq!(tree.to_full_string(), "#x a");

    let found: Vec<_> = tree.annotated_nodes_and_tokens("mark").collect();
    assert_eq!(found.len(), 1);
    let token = match &found[0] {
        NodeOrToken::Token(token) => token.clone(),
        NodeOrToken::Node(node) => panic!("expected a token, found {node:?}"),
    };
    assert_eq!(token.text(), "#x");
    assert_eq!(token.span_start(), 0.into());
    let structure = token.parent().unwrap();
    assert_eq!(structure.kind(), DIRECTIVE);
    assert!(structure.parent().is_none());
    assert_eq!(structure.parent_trivia().unwrap().kind(), DIRECTIVE_TRIVIA);
}

#[test]
fn annotations_survive_rewrites() {
    let mark = SyntaxAnnotation::with_kind("mark");
    let tree = annotated_tree(&mark);
    let inner = tree.first_child().unwrap();

    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(INNER);
    builder.token(WORD, "alpha");
    builder.finish_node();
    let (replacement, _) = builder.finish();
    let rewritten = SyntaxNode::new_root(inner.replace_with(replacement));
    assert_eq!(rewritten.to_full_string(), "alpha b c");

    let c = rewritten.annotated_tokens("mark").next().unwrap();
    assert!(c.has_annotation(&mark));
    assert_eq!(c.span_start(), 8.into());
}

#[test]
fn detached_red_annotations() {
    let mark = SyntaxAnnotation::new();
    let tree = plain_tree();
    let b = tree.last_token().unwrap();
    let marked = b.with_additional_annotations([mark.clone()]);
    assert!(marked.has_annotation(&mark));
    assert!(marked.parent().is_none());
    assert!(!b.has_annotation(&mark));
    let unmarked = marked.without_annotations([&mark]);
    assert!(!unmarked.has_any_annotations());

    let space = b.leading_trivia().first();
    let marked = space.with_additional_annotations([SyntaxAnnotation::elastic()]);
    assert!(marked.is_elastic());
    assert!(marked.token().is_none());
    assert!(!marked.without_annotations_of_kind("anything").has_annotations_of_kind("anything"));
}
