use super::*;
use map_surface::LayerStack;
use shared::error::DiscoveryErrorKind;

const FIRST_SERVER: &str = "http://first.local/geoserver";
const SECOND_SERVER: &str = "http://second.local/geoserver";

fn capabilities(names: &[&str]) -> String {
    let layers = names
        .iter()
        .map(|name| format!("<Layer><Name>{name}</Name></Layer>"))
        .collect::<String>();
    format!("<WMS_Capabilities><Capability><Layer><Title>root</Title>{layers}</Layer></Capability></WMS_Capabilities>")
}

fn loaded_session(stack: &mut LayerStack, server: &str, names: &[&str]) -> PanelSession {
    let mut session = PanelSession::new();
    let ticket = session.begin_discovery(server).expect("ticket");
    session
        .complete_discovery(ticket, Ok(capabilities(names)), stack)
        .expect("discovery");
    session
}

#[test]
fn successful_discovery_commits_catalog() {
    let mut stack = LayerStack::default();
    let mut session = PanelSession::new();
    let ticket = session.begin_discovery("http://first.local/geoserver/").expect("ticket");

    let outcome = session
        .complete_discovery(ticket, Ok(capabilities(&["b:one", "a:two"])), &mut stack)
        .expect("discovery");

    let DiscoveryOutcome::Committed(summary) = outcome else {
        panic!("expected commit");
    };
    assert_eq!(summary.workspaces, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(summary.layer_count, 2);
    assert_eq!(
        session.server_url().map(ServerUrl::as_str),
        Some("http://first.local/geoserver")
    );
}

#[test]
fn failed_fetch_leaves_state_untouched() {
    let mut stack = LayerStack::default();
    let mut session = loaded_session(&mut stack, FIRST_SERVER, &["ws1:roads"]);
    session.on_workspace_selected("ws1");
    session.on_layer_toggled("ws1:roads", true, &mut stack);
    let catalog_before = session.catalog().clone();
    let stack_before = stack.layers().to_vec();

    let ticket = session.begin_discovery(SECOND_SERVER).expect("ticket");
    let err = session
        .complete_discovery(
            ticket,
            Err(DiscoveryError::connection("503 Service Unavailable")),
            &mut stack,
        )
        .expect_err("connection failure");

    assert_eq!(err.kind(), DiscoveryErrorKind::Connection);
    assert_eq!(session.catalog(), &catalog_before);
    assert_eq!(session.selected_workspace(), "ws1");
    assert_eq!(session.server_url().map(ServerUrl::as_str), Some(FIRST_SERVER));
    assert!(session.is_layer_active("ws1:roads"));
    assert_eq!(stack.layers(), stack_before.as_slice());
}

#[test]
fn unparseable_body_leaves_state_untouched() {
    let mut stack = LayerStack::default();
    let mut session = loaded_session(&mut stack, FIRST_SERVER, &["ws1:roads"]);
    let catalog_before = session.catalog().clone();

    let ticket = session.begin_discovery(FIRST_SERVER).expect("ticket");
    let err = session
        .complete_discovery(ticket, Ok("<WMS_Capabilities><Layer>".to_string()), &mut stack)
        .expect_err("parse failure");

    assert_eq!(err.kind(), DiscoveryErrorKind::Parse);
    assert_eq!(session.catalog(), &catalog_before);
}

#[test]
fn invalid_address_is_rejected_before_fetch() {
    let mut session = PanelSession::new();
    let err = session.begin_discovery("   ").expect_err("empty address");
    assert_eq!(err.kind(), DiscoveryErrorKind::Connection);
}

#[test]
fn superseded_response_is_discarded() {
    let mut stack = LayerStack::default();
    let mut session = PanelSession::new();
    let first = session.begin_discovery(FIRST_SERVER).expect("ticket");
    let second = session.begin_discovery(SECOND_SERVER).expect("ticket");
    assert!(second.generation() > first.generation());

    let newest = session
        .complete_discovery(second, Ok(capabilities(&["new:layer"])), &mut stack)
        .expect("newest");
    assert!(matches!(newest, DiscoveryOutcome::Committed(_)));

    let stale = session
        .complete_discovery(first, Ok(capabilities(&["old:layer"])), &mut stack)
        .expect("stale");
    assert_eq!(stale, DiscoveryOutcome::Superseded);
    assert_eq!(session.server_url().map(ServerUrl::as_str), Some(SECOND_SERVER));
    assert_eq!(session.catalog().records()[0].full_name.as_str(), "new:layer");
}

#[test]
fn stale_failure_is_not_reported() {
    let mut stack = LayerStack::default();
    let mut session = PanelSession::new();
    let first = session.begin_discovery(FIRST_SERVER).expect("ticket");
    let _second = session.begin_discovery(SECOND_SERVER).expect("ticket");

    let outcome = session
        .complete_discovery(first, Err(DiscoveryError::connection("refused")), &mut stack)
        .expect("stale errors are swallowed");
    assert_eq!(outcome, DiscoveryOutcome::Superseded);
}

#[test]
fn workspace_selection_drives_listing() {
    let mut stack = LayerStack::default();
    let mut session = loaded_session(&mut stack, FIRST_SERVER, &["ws1:roads", "ws1:rivers", "x:y"]);

    let none = session.on_workspace_selected("");
    assert!(none.layers().is_empty());
    assert_eq!(
        none,
        LayerListing::NoSelection {
            workspaces: vec!["ws1".to_string(), "x".to_string()]
        }
    );

    let ws1 = session.on_workspace_selected("ws1");
    assert_eq!(ws1.layers().len(), 2);
    assert_eq!(session.current_listing(), ws1);

    let unknown = session.on_workspace_selected("ws2");
    assert!(unknown.layers().is_empty());
    assert_eq!(unknown.message(), Some("No layers found in this workspace"));
}

#[test]
fn toggle_requires_discovered_layer() {
    let mut stack = LayerStack::default();
    let mut session = loaded_session(&mut stack, FIRST_SERVER, &["ws1:roads"]);

    assert_eq!(
        session.on_layer_toggled("ws1:ghost", true, &mut stack),
        ToggleOutcome::UnknownLayer
    );
    assert_eq!(
        session.on_layer_toggled("lonewolf", true, &mut stack),
        ToggleOutcome::UnknownLayer
    );
    assert!(session.active_layers().is_empty());
    assert_eq!(stack.layers().len(), 1);
}

#[test]
fn toggle_off_before_any_discovery_is_noop() {
    let mut stack = LayerStack::default();
    let mut session = PanelSession::new();
    assert_eq!(
        session.on_layer_toggled("ws1:roads", false, &mut stack),
        ToggleOutcome::NotActive
    );
}

#[test]
fn rediscovery_of_same_server_keeps_surviving_layers() {
    let mut stack = LayerStack::default();
    let mut session = loaded_session(&mut stack, FIRST_SERVER, &["ws1:roads", "ws1:rivers"]);
    session.on_layer_toggled("ws1:roads", true, &mut stack);
    session.on_layer_toggled("ws1:rivers", true, &mut stack);

    let ticket = session.begin_discovery(FIRST_SERVER).expect("ticket");
    let outcome = session
        .complete_discovery(ticket, Ok(capabilities(&["ws1:roads"])), &mut stack)
        .expect("discovery");

    let DiscoveryOutcome::Committed(summary) = outcome else {
        panic!("expected commit");
    };
    assert_eq!(summary.released.len(), 1);
    assert_eq!(summary.released[0].name.as_str(), "ws1:rivers");
    assert!(session.is_layer_active("ws1:roads"));
    assert!(!session.is_layer_active("ws1:rivers"));
    assert_eq!(stack.tile_sources().count(), 1);
    assert_eq!(session.selected_workspace(), "");
}

#[test]
fn switching_servers_releases_all_layers() {
    let mut stack = LayerStack::default();
    let mut session = loaded_session(&mut stack, FIRST_SERVER, &["ws1:roads"]);
    session.on_layer_toggled("ws1:roads", true, &mut stack);

    let ticket = session.begin_discovery(SECOND_SERVER).expect("ticket");
    session
        .complete_discovery(ticket, Ok(capabilities(&["ws1:roads"])), &mut stack)
        .expect("discovery");

    assert!(session.active_layers().is_empty());
    assert_eq!(stack.layers().len(), 1);
}
