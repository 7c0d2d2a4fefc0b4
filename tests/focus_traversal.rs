//! Focus traversal across components, cards and windows.
//!
//! Run with: cargo test --test focus_traversal

use std::cell::RefCell;
use std::rc::Rc;

use cellwin::{
    codes, CardLayout, ComponentId, Edge, Filler, FocusEventKind, Label, MemoryTerminal, Toolkit,
    ToolkitConfig, ToolkitError,
};

type FocusLog = Rc<RefCell<Vec<(ComponentId, FocusEventKind, bool)>>>;

fn setup() -> Toolkit {
    Toolkit::new(MemoryTerminal::new(40, 12), ToolkitConfig::default()).unwrap()
}

/// A full-screen window holding the given focusable fillers, unshown.
fn window_with(toolkit: &mut Toolkit, count: usize) -> (ComponentId, Vec<ComponentId>) {
    let window = toolkit.create_window(None).unwrap();
    toolkit.fill_screen(window).unwrap();
    let panel = toolkit.tree_mut().create_panel();
    let widgets = (0..count)
        .map(|_| {
            let id = toolkit.tree_mut().create_widget(Filler::focusable(2, 1));
            toolkit.tree_mut().add_child(panel, id).unwrap();
            id
        })
        .collect();
    toolkit.tree_mut().add(window, panel, Edge::Center).unwrap();
    (window, widgets)
}

fn record_focus(toolkit: &mut Toolkit, ids: &[ComponentId]) -> FocusLog {
    let log: FocusLog = Rc::default();
    for &id in ids {
        let log = Rc::clone(&log);
        toolkit
            .tree_mut()
            .add_focus_listener(id, move |_, event| {
                log.borrow_mut().push((event.source, event.kind, event.temporary));
            })
            .unwrap();
    }
    log
}

// =============================================================================
// TRAVERSAL ORDER
// =============================================================================

#[test]
fn test_next_focus_cycles_back_to_start() {
    let mut toolkit = setup();
    let (window, widgets) = window_with(&mut toolkit, 3);
    let label = toolkit.tree_mut().create_widget(Label::new("not focusable"));
    toolkit.tree_mut().add(window, label, Edge::Bottom).unwrap();
    toolkit.show(window).unwrap();

    let tree = toolkit.tree();
    let mut current = widgets[0];
    let mut seen = Vec::new();
    for _ in 0..widgets.len() {
        current = tree.next_focus(current).unwrap();
        seen.push(current);
    }
    assert_eq!(seen, vec![widgets[1], widgets[2], widgets[0]]);
    assert_eq!(tree.previous_focus(widgets[0]), Some(widgets[2]));
}

#[test]
fn test_tab_and_back_tab_move_focus() {
    let mut toolkit = setup();
    let (window, widgets) = window_with(&mut toolkit, 3);
    toolkit.show(window).unwrap();
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(widgets[0]));

    toolkit.fire_keystroke(codes::TAB);
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(widgets[1]));

    // A key goes to the focus owner at the time it is fired.
    toolkit.fire_keystroke(codes::KEY_BACK_TAB);
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(widgets[0]));
    toolkit.fire_keystroke(codes::KEY_BACK_TAB);
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(widgets[2]));
}

// =============================================================================
// WINDOWS
// =============================================================================

#[test]
fn test_focus_crossing_windows_is_temporary() {
    let mut toolkit = setup();
    let (first, a) = window_with(&mut toolkit, 1);
    let (second, b) = window_with(&mut toolkit, 1);
    let log = record_focus(&mut toolkit, &[a[0], b[0]]);

    toolkit.show(first).unwrap();
    toolkit.dispatch_pending().unwrap();
    toolkit.show(second).unwrap();
    toolkit.dispatch_pending().unwrap();
    toolkit.hide(second).unwrap();
    toolkit.dispatch_pending().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            (a[0], FocusEventKind::Gained, false),
            (a[0], FocusEventKind::Lost, true),
            (b[0], FocusEventKind::Gained, true),
            (b[0], FocusEventKind::Lost, true),
            (a[0], FocusEventKind::Gained, true),
        ]
    );
    assert_eq!(toolkit.tree().focus_owner(), Some(a[0]));
}

#[test]
fn test_request_in_inactive_window_is_deferred() {
    let mut toolkit = setup();
    let (first, a) = window_with(&mut toolkit, 2);
    let (second, _b) = window_with(&mut toolkit, 1);
    toolkit.show(first).unwrap();
    toolkit.show(second).unwrap();
    toolkit.dispatch_pending().unwrap();

    assert!(toolkit.tree_mut().request_focus(a[1]).unwrap());
    assert!(toolkit.queue().is_empty());
    assert_ne!(toolkit.tree().focus_owner(), Some(a[1]));
    assert_eq!(toolkit.tree_mut().current_focus(first), Some(a[1]));

    toolkit.hide(second).unwrap();
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(a[1]));
}

// =============================================================================
// VISIBILITY AND CARDS
// =============================================================================

#[test]
fn test_hiding_focus_owner_moves_focus() {
    let mut toolkit = setup();
    let (window, widgets) = window_with(&mut toolkit, 2);
    toolkit.show(window).unwrap();
    toolkit.dispatch_pending().unwrap();

    toolkit.tree_mut().set_visible(widgets[0], false).unwrap();
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(widgets[1]));

    let result = toolkit.tree_mut().set_visible(widgets[1], false);
    assert!(matches!(result, Err(ToolkitError::NoFocusSuccessor(id)) if id == widgets[1]));
    assert!(toolkit.tree().is_visible(widgets[1]));
    assert_eq!(toolkit.tree().focus_owner(), Some(widgets[1]));
}

#[test]
fn test_hiding_focused_container_clears_focus() {
    let mut toolkit = setup();
    let (window, widgets) = window_with(&mut toolkit, 1);
    toolkit.show(window).unwrap();
    toolkit.dispatch_pending().unwrap();

    let panel = toolkit.tree().parent(widgets[0]).unwrap();
    toolkit.tree_mut().set_visible(panel, false).unwrap();
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), None);
}

#[test]
fn test_card_switch_moves_focus_into_new_card() {
    let mut toolkit = setup();
    let window = toolkit.create_window(None).unwrap();
    toolkit.fill_screen(window).unwrap();
    let tree = toolkit.tree_mut();
    let deck = tree.create_panel_with(CardLayout::new());
    let general = tree.create_panel();
    let advanced = tree.create_panel();
    let x = tree.create_widget(Filler::focusable(2, 1));
    let y = tree.create_widget(Filler::focusable(2, 1));
    tree.add_child(general, x).unwrap();
    tree.add_child(advanced, y).unwrap();
    tree.add(deck, general, "general").unwrap();
    tree.add(deck, advanced, "advanced").unwrap();
    tree.add(window, deck, Edge::Center).unwrap();

    toolkit.show(window).unwrap();
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(x));

    toolkit.tree_mut().show_card(deck, "advanced").unwrap();
    toolkit.dispatch_pending().unwrap();
    assert_eq!(toolkit.tree().focus_owner(), Some(y));
    assert_eq!(toolkit.tree().visible_card(deck), Some(advanced));
    assert!(!toolkit.tree().is_visible(general));

    let missing = toolkit.tree_mut().show_card(deck, "missing");
    assert!(matches!(missing, Err(ToolkitError::UnknownCard(_))));
}
