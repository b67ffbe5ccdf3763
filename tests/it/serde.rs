use super::{SyntaxNode, TestLang};
use greenwood::{GreenNodeBuilder, GreenToken, SyntaxAnnotation, SyntaxKind};
use serde_test::Token;

#[test]
fn annotation_tokens() {
    let annotation = SyntaxAnnotation::with_kind("rename");
    let id = annotation.id();
    serde_test::assert_tokens(&annotation, &[
        Token::Struct {
            name: "SyntaxAnnotation",
            len:  3,
        },
        Token::Str("id"),
        Token::U64(id),
        Token::Str("kind"),
        Token::Some,
        Token::Str("rename"),
        Token::Str("data"),
        Token::None,
        Token::StructEnd,
    ]);
}

#[test]
fn annotation_with_data_tokens() {
    let annotation = SyntaxAnnotation::with_data("rename", "new_name");
    let id = annotation.id();
    serde_test::assert_tokens(&annotation, &[
        Token::Struct {
            name: "SyntaxAnnotation",
            len:  3,
        },
        Token::Str("id"),
        Token::U64(id),
        Token::Str("kind"),
        Token::Some,
        Token::Str("rename"),
        Token::Str("data"),
        Token::Some,
        Token::Str("new_name"),
        Token::StructEnd,
    ]);
}

#[test]
fn json_round_trip_keeps_identity() {
    let mark = SyntaxAnnotation::with_data("mark", "payload");
    let json = serde_json::to_string(&mark).unwrap();
    let back: SyntaxAnnotation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mark);
    assert_eq!(back.kind(), Some("mark"));
    assert_eq!(back.data(), Some("payload"));

    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind(0));
    builder.push_token(GreenToken::new(SyntaxKind(1), "x").with_additional_annotations([mark]));
    builder.finish_node();
    let (green, _) = builder.finish();
    let tree = SyntaxNode::new_root(green);
    assert!(tree.first_token().unwrap().has_annotation(&back));
}

#[test]
fn deserialized_ids_are_never_reissued() {
    let far_ahead = SyntaxAnnotation::new().id() + 1_000_000;
    let json = format!(r#"{{"id":{far_ahead},"kind":null,"data":null}}"#);
    let restored: SyntaxAnnotation = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.id(), far_ahead);
    let fresh = SyntaxAnnotation::new();
    assert!(fresh.id() > far_ahead);
    assert_ne!(fresh, restored);
}
