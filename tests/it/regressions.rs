use greenwood::{GreenNodeBuilder, Language, SyntaxNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
enum SyntaxKind {
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Lang {}
impl Language for Lang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: greenwood::SyntaxKind) -> Self::Kind {
        assert_eq!(raw.0, SyntaxKind::Root as u16);
        SyntaxKind::Root
    }

    fn kind_to_raw(kind: Self::Kind) -> greenwood::SyntaxKind {
        greenwood::SyntaxKind(kind as u16)
    }
}

#[test]
fn empty_tree_arc() {
    // a root `GreenNode` without any slots must still be a valid `ThinArc`
    let mut builder: GreenNodeBuilder<Lang> = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind::Root);
    builder.finish_node();
    let (green, _) = builder.finish();
    let root: SyntaxNode<Lang> = SyntaxNode::new_root(green);
    assert_eq!(root.kind(), SyntaxKind::Root);
    assert_eq!(root.slot_count(), 0);
    assert!(root.first_token().is_none());
    assert_eq!(root.descendant_nodes_and_tokens_and_self().count(), 1);
    assert_eq!(root.descendant_trivia().count(), 0);
}

#[test]
fn find_token_in_empty_tree() {
    let mut builder: GreenNodeBuilder<Lang> = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind::Root);
    builder.finish_node();
    let (green, _) = builder.finish();
    let root: SyntaxNode<Lang> = SyntaxNode::new_root(green);
    assert!(root.find_token(0.into()).is_err());
}
