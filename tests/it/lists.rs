use super::{SyntaxNode, SyntaxToken, SyntaxTokenList, SyntaxTrivia, SyntaxTriviaList, TestLang};
use greenwood::{GreenNodeBuilder, GreenTrivia, SyntaxKind, TextRange};

const ROOT: SyntaxKind = SyntaxKind(0);
const PUB: SyntaxKind = SyntaxKind(2);
const STATIC: SyntaxKind = SyntaxKind(3);
const NAME: SyntaxKind = SyntaxKind(4);
const FN: SyntaxKind = SyntaxKind(5);
const COMMENT: SyntaxKind = SyntaxKind(8);
const WS: SyntaxKind = SyntaxKind(9);

/// `pub static fn // c\nname `, with modifiers in a token list, an empty token list and a single-token list.
fn declaration() -> SyntaxNode {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(ROOT);
    builder.start_token_list();
    builder.token(PUB, "pub");
    builder.trailing_trivia(WS, " ");
    builder.token(STATIC, "static");
    builder.trailing_trivia(WS, " ");
    builder.finish_token_list();
    builder.start_token_list();
    builder.finish_token_list();
    builder.start_token_list();
    builder.token(FN, "fn");
    builder.trailing_trivia(WS, " ");
    builder.finish_token_list();
    builder.trivia(COMMENT, "// c");
    builder.trivia(WS, "\n");
    builder.token(NAME, "name");
    builder.trailing_trivia(WS, " ");
    builder.finish_node();
    let (green, _) = builder.finish();
    SyntaxNode::new_root(green)
}

fn texts(list: &SyntaxTokenList) -> Vec<String> {
    list.iter().map(|token| token.text().to_string()).collect()
}

fn name_token(root: &SyntaxNode) -> SyntaxToken {
    root.child_at_slot(3).unwrap().into_token().unwrap()
}

#[test]
fn list_shapes() {
    let root = declaration();
    assert_eq!(root.to_full_string(), "pub static fn // c\nname ");
    assert_eq!(root.slot_count(), 4);

    let modifiers = root.token_list(0);
    assert_eq!(modifiers.len(), 2);
    assert_eq!(texts(&modifiers), ["pub", "static"]);
    assert_eq!(modifiers.span(), TextRange::new(0.into(), 10.into()));
    assert_eq!(modifiers.full_span(), TextRange::new(0.into(), 11.into()));
    assert_eq!(modifiers.to_full_string(), "pub static ");

    let empty = root.token_list(1);
    assert!(empty.is_empty());
    assert!(!empty.any());
    assert_eq!(empty.full_span(), TextRange::empty(11.into()));
    assert!(root.child_at_slot(1).is_none());

    let single = root.token_list(2);
    assert_eq!(single.len(), 1);
    assert_eq!(single.first(), single.last());
    assert_eq!(single.at(0).text(), "fn");
    assert_eq!(single.span(), TextRange::new(11.into(), 13.into()));

    // a single token is stored directly in its slot
    assert!(root.child_at_slot(2).unwrap().is_token());
}

#[test]
fn list_tokens_are_children_of_the_owner() {
    let root = declaration();
    let pub_token = root.token_list(0).first();
    assert_eq!(pub_token.parent().unwrap(), root);
    assert_eq!((pub_token.index(), pub_token.index_in_list()), (0, 0));
    let static_token = root.token_list(0).at(1);
    assert_eq!(static_token.parent().unwrap(), root);
    assert_eq!((static_token.index(), static_token.index_in_list()), (0, 1));

    assert_eq!(pub_token.next_token().unwrap().text(), "static");
    assert_eq!(root.token_list(0).last().next_token().unwrap().text(), "fn");
    assert_eq!(pub_token.next_sibling_or_token().unwrap().into_token().unwrap(), static_token);
    assert_eq!(static_token.prev_sibling_or_token().unwrap().into_token().unwrap(), pub_token);

    assert!(root.children().all(|node| !node.syntax_kind().is_list()));
    assert!(root.descendant_nodes().all(|node| !node.syntax_kind().is_list()));
    assert!(root.first_child().is_none());
    assert!(root.node_at_slot(0).is_none());
    assert_eq!(root.child_at_slot(0).unwrap().into_token().unwrap(), pub_token);

    let children: Vec<_> = root
        .children_with_tokens()
        .map(|element| element.into_token().unwrap().text().to_string())
        .collect();
    assert_eq!(children, ["pub", "static", "fn", "name"]);
    let backwards: Vec<_> = root
        .children_with_tokens()
        .rev()
        .map(|element| element.into_token().unwrap().text().to_string())
        .collect();
    assert_eq!(backwards, ["name", "fn", "static", "pub"]);
}

#[test]
fn index_of() {
    let root = declaration();
    let modifiers = root.token_list(0);
    let stat = modifiers.at(1);
    assert_eq!(modifiers.index_of(&stat), 1);
    assert_eq!(modifiers.index_of(&modifiers.first()), 0);
    assert_eq!(modifiers.index_of(&name_token(&root)), -1);
    assert_eq!(root.token_list(1).index_of(&stat), -1);
    // the same token in a different tree is a different token
    let other = declaration();
    assert_eq!(modifiers.index_of(&other.token_list(0).at(1)), -1);
}

#[test]
fn reverse_and_iteration() {
    let root = declaration();
    let modifiers = root.token_list(0);
    let reversed: Vec<_> = modifiers.reverse().iter().map(|token| token.text().to_string()).collect();
    assert_eq!(reversed, ["static", "pub"]);
    assert_eq!(modifiers.reverse().len(), 2);
    assert!(root.token_list(1).reverse().is_empty());

    let mut iter = modifiers.iter();
    assert_eq!(iter.len(), 2);
    assert_eq!(iter.next_back().unwrap().text(), "static");
    assert_eq!(iter.next().unwrap().text(), "pub");
    assert!(iter.next().is_none());
    assert!(iter.next_back().is_none());

    let via_into_iter: Vec<_> = (&modifiers).into_iter().collect();
    assert_eq!(via_into_iter.len(), 2);
    assert_eq!(modifiers.get(2), None);
}

#[test]
fn mutations_return_new_lists() {
    let root = declaration();
    let modifiers = root.token_list(0);
    let fn_token = root.token_list(2).first();

    let pushed = modifiers.push(fn_token.clone());
    assert_eq!(texts(&pushed), ["pub", "static", "fn"]);
    assert_eq!(pushed.to_full_string(), "pub static fn ");
    // the original list and tree are untouched
    assert_eq!(texts(&modifiers), ["pub", "static"]);
    assert_eq!(root.to_full_string(), "pub static fn // c\nname ");

    let inserted = modifiers.insert(0, fn_token.clone());
    assert_eq!(texts(&inserted), ["fn", "pub", "static"]);
    let ranged = modifiers.insert_range(1, [fn_token.clone(), fn_token.clone()]);
    assert_eq!(texts(&ranged), ["pub", "fn", "fn", "static"]);

    let replaced = modifiers.replace(&modifiers.at(0), fn_token.clone());
    assert_eq!(texts(&replaced), ["fn", "static"]);
    let replaced = modifiers.replace_range(&modifiers.at(1), []);
    assert_eq!(texts(&replaced), ["pub"]);

    let removed = modifiers.remove(&modifiers.at(0));
    assert_eq!(texts(&removed), ["static"]);
    assert_eq!(removed.len(), 1);
    let removed = removed.remove_at(0);
    assert!(removed.is_empty());
    assert_eq!(removed, SyntaxTokenList::empty());
}

#[test]
fn results_are_detached() {
    let root = declaration();
    let modifiers = root.token_list(0);
    let pushed = modifiers.push(name_token(&root));
    let last = pushed.last();
    assert_eq!(last.text(), "name");
    assert_eq!(last.parent().unwrap().parent(), None);
    // positions start at zero in a detached list
    assert_eq!(pushed.full_span().start(), 0.into());
    assert_eq!(pushed.index_of(&last), 2);
    let shrunk = pushed.remove(&last);
    assert_eq!(texts(&shrunk), ["pub", "static"]);
}

#[test]
fn collect_into_list() {
    let root = declaration();
    let list: SyntaxTokenList = root.descendant_tokens().filter(|token| token.kind() != FN).collect();
    assert_eq!(texts(&list), ["pub", "static", "name"]);
    let list: SyntaxTokenList = std::iter::empty().collect();
    assert!(list.is_empty());
}

#[test]
#[should_panic(expected = "out of range")]
fn insert_past_end() {
    let root = declaration();
    let fn_token = root.token_list(2).first();
    let _ = root.token_list(0).insert(3, fn_token);
}

#[test]
#[should_panic(expected = "invalid operation")]
fn first_of_empty() {
    let root = declaration();
    let _ = root.token_list(1).first();
}

#[test]
#[should_panic(expected = "out of range")]
fn at_out_of_range() {
    let root = declaration();
    let _ = root.token_list(0).at(2);
}

#[test]
#[should_panic(expected = "not an element")]
fn remove_foreign_token() {
    let root = declaration();
    let _ = root.token_list(0).remove(&name_token(&root));
}

#[test]
#[should_panic]
fn token_list_of_plain_node() {
    let mut builder: GreenNodeBuilder<TestLang> = GreenNodeBuilder::new();
    builder.start_node(ROOT);
    builder.start_node(SyntaxKind(1));
    builder.token(NAME, "a");
    builder.token(NAME, "b");
    builder.finish_node();
    builder.finish_node();
    let (green, _) = builder.finish();
    let _ = SyntaxNode::new_root(green).token_list(0);
}

#[test]
fn trivia_list_positions() {
    let root = declaration();
    let name = name_token(&root);
    assert_eq!(name.span(), TextRange::new(19.into(), 23.into()));

    let leading = name.leading_trivia();
    assert_eq!(leading.len(), 2);
    assert_eq!(leading.token().unwrap(), name);
    assert_eq!(leading.at(0).full_span(), TextRange::new(14.into(), 18.into()));
    assert_eq!(leading.at(1).full_span(), TextRange::new(18.into(), 19.into()));
    assert_eq!(leading.full_span(), TextRange::new(14.into(), 19.into()));
    assert_eq!(leading.to_full_string(), "// c\n");
    let reversed: Vec<_> = leading.reverse().iter().map(|trivia| trivia.to_full_string()).collect();
    assert_eq!(reversed, ["\n", "// c"]);
    assert_eq!(leading.iter().next_back().unwrap().full_span(), leading.at(1).full_span());

    let trailing = name.trailing_trivia();
    assert_eq!(trailing.len(), 1);
    let space = trailing.first();
    assert_eq!(space.full_span(), TextRange::new(23.into(), 24.into()));
    assert_eq!(space.span(), space.full_span());
    // trailing trivia are numbered after the leading ones
    assert_eq!(space.index(), 2);
    assert_eq!(leading.at(1).index(), 1);
    assert_eq!(space.token().unwrap(), name);
    assert_eq!(trailing.index_of(&space), 0);
    assert_eq!(leading.index_of(&space), -1);
}

#[test]
fn trivia_lookup_by_position() {
    let root = declaration();
    let name = name_token(&root);
    assert_eq!(name.trivia_at(15.into()).unwrap().text(), Some("// c"));
    assert_eq!(name.trivia_at(23.into()).unwrap().text(), Some(" "));
    assert!(name.trivia_at(20.into()).is_none());

    assert_eq!(root.find_trivia(18.into()).unwrap().unwrap().text(), Some("\n"));
    assert!(root.find_trivia(1.into()).unwrap().is_none());
    assert!(root.find_trivia(40.into()).is_err());
}

#[test]
fn trivia_list_mutations() {
    let root = declaration();
    let name = name_token(&root);
    let leading = name.leading_trivia();

    let space = SyntaxTrivia::new_detached(GreenTrivia::new(WS, " "));
    let inserted = leading.insert(0, space.clone());
    assert_eq!(inserted.to_full_string(), " // c\n");
    assert_eq!(leading.to_full_string(), "// c\n");
    assert!(inserted.token().is_none());

    let removed = leading.remove_at(0);
    assert_eq!(removed.to_full_string(), "\n");
    let removed = leading.remove(&leading.at(1));
    assert_eq!(removed.to_full_string(), "// c");
    let replaced = leading.replace(&leading.at(0), space.clone());
    assert_eq!(replaced.to_full_string(), " \n");
    let replaced = leading.replace_range(&leading.at(0), [space.clone(), space.clone()]);
    assert_eq!(replaced.len(), 3);
    let pushed = leading.push(space);
    assert_eq!(pushed.last().text(), Some(" "));

    let rewritten = name.with_leading_trivia(replaced.iter().map(|trivia| trivia.green().clone()));
    assert_eq!(rewritten.to_full_string(), "  \nname ");
    assert!(rewritten.parent().is_none());
    assert_eq!(name.to_full_string(), "// c\nname ");
}

#[test]
fn trivia_list_from_green() {
    let list: SyntaxTriviaList = [GreenTrivia::new(WS, " "), GreenTrivia::new(COMMENT, "// x")]
        .into_iter()
        .collect();
    assert_eq!(list.len(), 2);
    assert_eq!(list.at(1).full_span(), TextRange::new(1.into(), 5.into()));
    assert!(SyntaxTriviaList::empty().is_empty());
    assert_eq!(SyntaxTriviaList::empty().full_span(), TextRange::empty(0.into()));
}

#[test]
#[should_panic(expected = "invalid operation")]
fn last_of_empty_trivia_list() {
    let root = declaration();
    let _ = name_token(&root).leading_trivia().remove_at(0).remove_at(0).last();
}
