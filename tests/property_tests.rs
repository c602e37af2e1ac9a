use ldd_rules::enums::LDD_ENUMS;
use ldd_rules::{IssueCode, check_well_formed, is_ldd_member, map_to_mismo, validate_xml};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Empty(String),
    Element(String, Vec<Node>),
}

fn render(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Empty(name) => out.push_str(&format!("<{name}/>")),
        Node::Element(name, children) => {
            out.push_str(&format!("<{name}>"));
            for child in children {
                render(child, out);
            }
            out.push_str(&format!("</{name}>"));
        }
    }
}

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z_]{0,8}"
}

fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        "[a-zA-Z0-9 .,]{0,12}".prop_map(Node::Text),
        arb_name().prop_map(Node::Empty),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (arb_name(), prop::collection::vec(inner, 0..4))
            .prop_map(|(name, children)| Node::Element(name, children))
    })
}

fn arb_document() -> impl Strategy<Value = String> {
    (arb_name(), prop::collection::vec(arb_node(), 0..4)).prop_map(|(name, children)| {
        let mut out = String::from("<?xml version=\"1.0\"?>\n");
        render(&Node::Element(name, children), &mut out);
        out
    })
}

fn arb_enum_key() -> impl Strategy<Value = &'static str> {
    (0..LDD_ENUMS.len()).prop_map(|index| LDD_ENUMS[index].0)
}

proptest! {
    #[test]
    fn well_formed_check_is_idempotent(xml in ".{0,200}") {
        prop_assert_eq!(check_well_formed(&xml), check_well_formed(&xml));
    }

    #[test]
    fn nested_documents_are_well_formed(xml in arb_document()) {
        let report = check_well_formed(&xml);
        prop_assert!(report.valid, "{}: {:?}", xml, report.error);
    }

    #[test]
    fn datatype_mismatches_never_become_errors(value in "[a-zA-Z0-9 .%$-]{1,12}") {
        let xml = format!("<TERMS><NoteRatePercent>{value}</NoteRatePercent><PostalCode>{value}</PostalCode></TERMS>");
        let report = validate_xml(&xml);
        prop_assert!(report.errors.is_empty());
        prop_assert!(report.warnings.iter().all(|issue| issue.code == IssueCode::DatatypeViolation));
    }

    #[test]
    fn translation_yields_ldd_members_or_nothing(value in "[a-zA-Z_ -]{0,24}", key in arb_enum_key()) {
        if let Some(mismo) = map_to_mismo(&value, key) {
            prop_assert!(is_ldd_member(key, mismo));
        }
    }
}
