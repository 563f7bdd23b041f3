//! Integration tests for extension selection against a recorded
//! management page snapshot.

use exthooks_core::config::DiscoveryConfig;
use exthooks_dom::node::shadow_roots;
use exthooks_dom::{DomNode, Pick, SelectionError, deep_query, query_all, select_extension};
use exthooks_harness::discovery::management_layout;

fn management_page() -> DomNode {
    let raw = include_str!("../fixtures/management_page.json");
    serde_json::from_str(raw).expect("Failed to parse snapshot fixture")
}

fn is_item(node: &DomNode) -> bool {
    node.tag == "extensions-item"
}

#[test]
fn test_entries_only_visible_to_deep_query() {
    let page = management_page();
    assert!(query_all(&page, &is_item).is_empty());

    let found = deep_query(&page, &shadow_roots, &is_item);
    let ids: Vec<_> = found.iter().filter_map(|n| n.id()).collect();
    assert_eq!(
        ids,
        vec!["ghbmnnjooekpmoecnnnilnnbdlolhkhi", "kmendfapggjehodndflmmgagdbamhnfd"]
    );
}

#[test]
fn test_default_layout_selects_last_entry() {
    let layout = management_layout(&DiscoveryConfig::default()).expect("layout");
    let selection = select_extension(&management_page(), &layout, Pick::Last).expect("select");

    assert_eq!(selection.id, "kmendfapggjehodndflmmgagdbamhnfd");
    assert_eq!(selection.index, 1);
    assert_eq!(
        selection.candidates[0].name.as_deref(),
        Some("Google Docs Offline")
    );
    assert_eq!(selection.candidates[1].name.as_deref(), Some("ExtHooks Fixture"));
}

#[test]
fn test_manifest_name_selects_matching_entry() {
    let layout = management_layout(&DiscoveryConfig::default()).expect("layout");
    let selection = select_extension(
        &management_page(),
        &layout,
        Pick::NamedOrLast("Google Docs Offline"),
    )
    .expect("select");
    assert_eq!(selection.id, "ghbmnnjooekpmoecnnnilnnbdlolhkhi");
}

#[test]
fn test_identifiers_look_like_extension_ids() {
    let layout = management_layout(&DiscoveryConfig::default()).expect("layout");
    let selection = select_extension(&management_page(), &layout, Pick::Last).expect("select");
    for candidate in &selection.candidates {
        let id = candidate.id.as_deref().expect("id");
        assert_eq!(id.len(), 32);
        assert!(id.bytes().all(|b| (b'a'..=b'p').contains(&b)));
    }
}

#[test]
fn test_manager_without_shadow_root_is_reported() {
    let mut page = management_page();
    strip_shadow_roots(&mut page, "extensions-manager");

    let layout = management_layout(&DiscoveryConfig::default()).expect("layout");
    assert!(matches!(
        select_extension(&page, &layout, Pick::Last),
        Err(SelectionError::ManagerWithoutShadowRoot { .. })
    ));
}

fn strip_shadow_roots(node: &mut DomNode, tag: &str) {
    if node.tag == tag {
        node.shadow_roots.clear();
    }
    for child in &mut node.children {
        strip_shadow_roots(child, tag);
    }
}
