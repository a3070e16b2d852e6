//! Integration tests for parsing markup into trees and querying them.
//!
//! Covers both adapters end to end: fixtures on disk, structural
//! invariants of the built trees, and the string-value matchers checked
//! against the materialized value.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sprig_parser::{
    parse_html, parse_xml, parser_for_extension, HtmlMode, HtmlOptions, HtmlParser, ParseError,
    Parser, ParserConfig,
};
use sprig_tree::{Event, Node, NodeKind, QName, Tree, TreeBuilder};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> Tree {
    let path = fixtures_dir().join(name);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let parser = parser_for_extension(extension, &ParserConfig::default())
        .unwrap_or_else(|| panic!("no parser for {}", path.display()));
    let source = fs::read(&path).unwrap();
    parser.parse(&source).unwrap()
}

fn elements<'t>(tree: &'t Tree, local: &'t str) -> impl Iterator<Item = Node<'t>> + 't {
    tree.root()
        .descendants()
        .filter(move |n| n.kind() == NodeKind::Start && n.name().local == local)
}

fn element<'t>(tree: &'t Tree, local: &'t str) -> Node<'t> {
    elements(tree, local)
        .next()
        .unwrap_or_else(|| panic!("no <{local}> in tree"))
}

fn child_names(node: Node<'_>) -> Vec<String> {
    node.children()
        .filter(|n| n.kind() == NodeKind::Start)
        .map(|n| n.name().local.clone())
        .collect()
}

/// Parent links, child lists and ranges must agree with each other.
fn assert_structure(tree: &Tree) {
    let root = tree.root();
    assert_eq!(root.kind(), NodeKind::Start);
    assert!(root.parent().is_none());

    for node in tree.nodes() {
        if node.kind() != NodeKind::Start {
            assert_eq!(node.range().len(), 1, "{node:?}");
            continue;
        }

        let outer = node.range();
        let mut previous_end = outer.start + 1;
        for child in node.children() {
            assert!(child.kind().is_child_kind(), "{child:?}");
            assert_eq!(child.parent(), Some(node));

            let inner = child.range();
            assert!(outer.start < inner.start && inner.end <= outer.end);
            assert!(previous_end <= inner.start, "siblings overlap at {child:?}");
            previous_end = inner.end;
        }

        let direct = node
            .descendants()
            .filter(|d| d.parent() == Some(node))
            .count();
        assert_eq!(node.children().len(), direct, "{node:?}");
    }
}

mod round_trip {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_sample_document() {
        let tree = parse_xml(br#"<a x="1"><b>he</b>llo<!--c--></a>"#).unwrap();
        assert_structure(&tree);

        let root = tree.root();
        assert_eq!(root.children().len(), 1);
        let a = root.children().next().unwrap();
        assert_eq!(a.name().local, "a");

        let children: Vec<_> = a.children().collect();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].name().local, "b");
        assert_eq!(
            (children[1].kind(), children[1].text()),
            (NodeKind::Text, Some(&b"llo"[..]))
        );
        assert_eq!(
            (children[2].kind(), children[2].text()),
            (NodeKind::Comment, Some(&b"c"[..]))
        );

        assert!(a.equals("hello"));
        assert!(a.contains("ell"));
        assert_eq!(a.to_string(), "hello");

        let x = a.attribute("x").unwrap();
        assert_eq!(x.value(), Some("1"));
        assert!(a.range().contains(&x.id().index()));
        assert!(a.children().all(|n| n != x));
    }

    #[test]
    fn matches_across_intervening_comment() {
        let tree = parse_xml(b"<p>ab<!--x-->cd</p>").unwrap();
        let p = tree.root().children().next().unwrap();

        assert_eq!(p.text_runs().collect::<Vec<_>>(), vec![&b"ab"[..], &b"cd"[..]]);
        assert!(p.contains("bc"));
        assert!(!p.contains("bx"));
    }

    #[test]
    fn unclosed_html_fragment_is_completed() {
        let parser = HtmlParser::with_options(HtmlOptions {
            mode: HtmlMode::Fragment,
            ..HtmlOptions::default()
        });
        let tree = parser.parse(b"<p>Hi").unwrap();
        assert_structure(&tree);

        let p = element(&tree, "p");
        assert!(p.range().end <= tree.root().range().end);
        assert!(p.equals("Hi"));
    }
}

mod catalog {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn has_consistent_structure() {
        assert_structure(&load("catalog.xml"));
    }

    #[test]
    fn top_level_nodes() {
        let tree = load("catalog.xml");
        let kinds: Vec<_> = tree
            .root()
            .children()
            .map(|n| n.kind())
            .filter(|kind| *kind != NodeKind::Text)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ProcessingInstruction,
                NodeKind::Comment,
                NodeKind::Start
            ]
        );
    }

    #[test]
    fn elements_carry_namespaces() {
        let tree = load("catalog.xml");
        let catalog = element(&tree, "catalog");
        assert_eq!(catalog.name(), &QName::new("urn:catalog", "catalog"));

        let price = element(&tree, "price");
        assert_eq!(price.name(), &QName::new("urn:price", "price"));
        assert_eq!(
            price.attribute("currency").and_then(|n| n.value()),
            Some("USD")
        );
    }

    #[test]
    fn books_by_attribute() {
        let tree = load("catalog.xml");
        let ids: Vec<_> = elements(&tree, "book")
            .filter_map(|book| book.attribute("id").and_then(|n| n.value()))
            .collect();
        assert_eq!(ids, vec!["bk101", "bk102"]);

        let rain = elements(&tree, "book")
            .find(|book| {
                book.children()
                    .any(|c| c.name().local == "title" && c.equals("Midnight Rain"))
            })
            .unwrap();
        assert_eq!(rain.attribute("id").and_then(|n| n.value()), Some("bk102"));
        assert_eq!(
            child_names(rain),
            vec!["title", "author", "price", "description"]
        );
    }

    #[test]
    fn title_value_skips_comment() {
        let tree = load("catalog.xml");
        let title = element(&tree, "title");

        let kinds: Vec<_> = title.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Text, NodeKind::Comment, NodeKind::Text]);
        assert!(title.equals("XML Developer's Guide"));
        assert!(title.contains("XML Developer"));
        assert!(!title.contains("draft"));
    }

    #[test]
    fn descriptions_resolve_entities_and_cdata() {
        let tree = load("catalog.xml");
        let descriptions: Vec<_> = elements(&tree, "description").collect();

        assert!(descriptions[0].contains("XML & XSLT."));
        assert!(descriptions[1].starts_with("A former architect <battles>"));
    }

    #[test]
    fn readable_from_many_threads() {
        let tree = load("catalog.xml");
        let expected = tree.root().string().into_owned();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let books = elements(&tree, "book").count();
                        let matched = tree.root().contains("Midnight Rain");
                        (books, matched, tree.root().string().into_owned())
                    })
                })
                .collect();

            for handle in handles {
                let (books, matched, value) = handle.join().unwrap();
                assert_eq!(books, 2);
                assert!(matched);
                assert_eq!(value, expected);
            }
        });
    }
}

mod page {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn has_consistent_structure() {
        assert_structure(&load("page.html"));
    }

    #[test]
    fn document_skeleton_is_implied() {
        let tree = load("page.html");
        assert_eq!(child_names(tree.root()), vec!["html"]);

        let html = element(&tree, "html");
        assert_eq!(child_names(html), vec!["head", "body"]);
        assert!(element(&tree, "title").equals("Release notes"));
        assert_eq!(
            child_names(element(&tree, "body")),
            vec!["h1", "ul", "table", "p"]
        );
    }

    #[test]
    fn value_spans_inline_elements() {
        let tree = load("page.html");
        let h1 = element(&tree, "h1");

        assert!(h1.equals("Release notes"));
        assert_eq!(h1.attribute("id").and_then(|n| n.value()), Some("top"));
    }

    #[test]
    fn list_items_are_auto_closed() {
        let tree = load("page.html");
        let items: Vec<_> = elements(&tree, "li").collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].starts_with("Fixed a crash"));
        assert!(items[1].starts_with("Added fragment mode"));
        let classes: Vec<_> = items
            .iter()
            .filter_map(|li| li.attribute("class").and_then(|n| n.value()))
            .collect();
        assert_eq!(classes, vec!["fix", "feat"]);
    }

    #[test]
    fn table_gets_implied_body() {
        let tree = load("page.html");
        let table = element(&tree, "table");
        assert_eq!(child_names(table), vec!["tbody"]);
        assert_eq!(elements(&tree, "td").count(), 2);
    }

    #[test]
    fn unclosed_paragraph_is_completed() {
        let tree = load("page.html");
        let p = element(&tree, "p");
        assert!(p.starts_with("Unclosed paragraph"));
        assert_eq!(p.parent().map(|n| n.name().local.clone()), Some("body".to_string()));
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mismatched_end_tag_is_tokenizer_error() {
        let err = parse_xml(b"<a><b></a>").unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)), "{err:?}");
    }

    #[test]
    fn unclosed_xml_element() {
        let err = parse_xml(b"<a>text").unwrap_err();
        assert_eq!(err.to_string(), "Unclosed element: <a>");
    }

    #[test]
    fn html_never_fails_on_malformed_markup() {
        let tree = parse_html(b"</b><i><p>x</i>").unwrap();
        assert_structure(&tree);
        assert!(tree.root().equals("x"));
    }

    #[test]
    fn builder_reports_broken_sequences() {
        let mut builder = TreeBuilder::new();
        builder.push(Event::root()).unwrap();
        builder.push(Event::Start(QName::local("a"))).unwrap();
        builder.push(Event::End).unwrap();

        let err = ParseError::from(builder.finish().unwrap_err());
        assert_eq!(err.to_string(), "1 element(s) still open at end of input");
    }

    #[test]
    fn invalid_config() {
        let err = ParserConfig::from_json(r#"{ "yaml": {} }"#).unwrap_err();
        assert!(matches!(err, ParseError::Config(_)));
    }
}

mod matchers {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Piece {
        Text(String),
        Comment(String),
        Element(String),
    }

    fn piece() -> impl Strategy<Value = Piece> {
        prop_oneof![
            "[abc]{1,4}".prop_map(Piece::Text),
            "[abc]{0,3}".prop_map(Piece::Comment),
            "[abc]{0,3}".prop_map(Piece::Element),
        ]
    }

    /// Markup for `pieces` inside `<tag>`, plus the expected string value.
    fn render(tag: &str, inner: &str, pieces: &[Piece]) -> (String, String) {
        let mut markup = format!("<{tag}>");
        let mut value = String::new();
        for piece in pieces {
            match piece {
                Piece::Text(text) => {
                    markup.push_str(text);
                    value.push_str(text);
                }
                Piece::Comment(text) => markup.push_str(&format!("<!--{text}-->")),
                Piece::Element(text) => {
                    markup.push_str(&format!("<{inner}>{text}</{inner}>"));
                    value.push_str(text);
                }
            }
        }
        markup.push_str(&format!("</{tag}>"));
        (markup, value)
    }

    fn check_every_node(tree: &Tree, needle: &str) -> Result<(), TestCaseError> {
        for node in tree.nodes() {
            let value = node.string();
            prop_assert_eq!(node.equals(needle), value == needle, "{:?}", node);
            prop_assert_eq!(node.starts_with(needle), value.starts_with(needle), "{:?}", node);
            prop_assert_eq!(node.contains(needle), value.contains(needle), "{:?}", node);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn xml_values_match_materialized(
            pieces in prop::collection::vec(piece(), 0..8),
            needle in "[abc]{0,4}",
        ) {
            let (markup, value) = render("r", "e", &pieces);
            let tree = parse_xml(markup.as_bytes()).unwrap();

            prop_assert_eq!(tree.root().string(), value.as_str());
            check_every_node(&tree, &needle)?;
        }

        #[test]
        fn html_values_match_materialized(
            pieces in prop::collection::vec(piece(), 0..8),
            needle in "[abc]{0,4}",
        ) {
            let (markup, value) = render("div", "span", &pieces);
            let parser = HtmlParser::with_options(HtmlOptions {
                mode: HtmlMode::Fragment,
                ..HtmlOptions::default()
            });
            let tree = parser.parse(markup.as_bytes()).unwrap();

            prop_assert_eq!(tree.root().string(), value.as_str());
            check_every_node(&tree, &needle)?;
        }
    }
}
