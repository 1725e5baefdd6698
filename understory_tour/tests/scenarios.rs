// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tours against the in-memory collaborators.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use proptest::prelude::*;
use tracing_test::traced_test;
use understory_tour::{
    ActionName, ActionRepository, AnchorDescriptor, AnchorRegistry, OverlayState, Step, Tour,
    TourSession, WindowId, WindowTracker, WindowTransition,
};

type Session = TourSession<AnchorRegistry, WindowTracker, OverlayState>;

fn session_with(anchors: AnchorRegistry, windows: WindowTracker) -> Session {
    TourSession::new(anchors, windows, OverlayState::new())
}

fn current(session: &Session) -> Option<&str> {
    session.current_step().map(|s| s.id.as_str())
}

fn record(session: &mut Session, log: &Rc<RefCell<Vec<String>>>, ids: &[&str]) {
    for id in ids {
        let l = log.clone();
        let _ = session.on_step_entering(*id, move |s, _| {
            l.borrow_mut().push(format!("entering {}", s.id));
        });
        let l = log.clone();
        let _ = session.on_step_entered(*id, move |s, _| {
            l.borrow_mut().push(format!("entered {}", s.id));
        });
        let l = log.clone();
        let _ = session.on_step_left(*id, move |s, _| {
            l.borrow_mut().push(format!("left {}", s.id));
        });
    }
    let l = log.clone();
    let _ = session.on_closed(move |s, _| l.borrow_mut().push(format!("closed {}", s.id)));
}

#[test]
fn three_steps_with_an_unloaded_last_anchor() {
    let mut windows = WindowTracker::new();
    let w1 = windows.open();
    assert!(windows.activate(w1));

    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("anchor_a", w1));
    anchors.register(AnchorDescriptor::new("anchor_b", w1));
    anchors.register_unloaded(AnchorDescriptor::new("anchor_c", w1));

    let mut session = session_with(anchors, windows);
    let tour = Tour::new("T").with_steps([
        Step::new("A", "anchor_a"),
        Step::new("B", "anchor_b"),
        Step::new("C", "anchor_c"),
    ]);

    assert_eq!(session.start(tour), Ok(true));
    assert_eq!(current(&session), Some("A"));
    assert!(session.can_next_step());

    assert!(session.next_step());
    assert_eq!(current(&session), Some("B"));
    // C is unloaded, but it is on the tracked window.
    assert!(session.can_next_step());

    // Only an unloaded anchor is available, so the overlay cannot follow.
    assert!(!session.next_step());
    assert_eq!(current(&session), Some("C"));
    let vm = session.view_model().unwrap();
    assert_eq!(vm.button_text(), "Close");
    assert_eq!(vm.steps, "Step 3/3");
    // The overlay is still on B's anchor and stays hidden rather than show C's text there.
    assert!(!session.overlay().is_visible());
    assert_eq!(
        session.overlay().target().map(|t| t.id.as_str()),
        Some("anchor_b")
    );

    assert!(!session.next_step());
    assert_eq!(current(&session), Some("C"));
}

#[test]
fn including_unloaded_reaches_the_last_anchor() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    anchors.register_unloaded(AnchorDescriptor::new("b", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let tour = Tour::new("T").with_steps([Step::new("A", "a"), Step::new("B", "b")]);

    assert_eq!(session.start(tour), Ok(true));
    assert!(session.next_step_including_unloaded());
    assert_eq!(session.overlay().target().map(|t| t.id.as_str()), Some("b"));
}

#[test]
fn previous_from_the_first_step_fires_nothing() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("b", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut session, &log, &["A", "B"]);

    let tour = Tour::new("T").with_steps([Step::new("A", "a"), Step::new("B", "b")]);
    assert_eq!(session.start(tour), Ok(true));
    log.borrow_mut().clear();

    assert!(!session.can_previous_step());
    assert!(!session.previous_step());
    assert!(log.borrow().is_empty());
    assert_eq!(current(&session), Some("A"));
}

#[test]
fn next_hide_advances_when_a_dialog_opens() {
    let mut windows = WindowTracker::new();
    let dialog = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(
        AnchorDescriptor::new("open_dialog", WindowId::MAIN)
            .with_transition(WindowTransition::NextHide),
    );
    anchors.register_unloaded(AnchorDescriptor::new("dialog_field", dialog));

    let mut session = session_with(anchors, windows);
    let tour = Tour::new("dialog").with_steps([
        Step::new("open", "open_dialog"),
        Step::new("fill", "dialog_field"),
    ]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(!session.can_next_step());

    assert!(session.windows_mut().activate(dialog));
    assert!(session.window_activated(dialog));
    assert_eq!(current(&session), Some("fill"));
    assert!(session.overlay().is_visible());
    assert_eq!(session.overlay().target().map(|t| t.window), Some(dialog));
    assert_eq!(session.run().map(|r| r.active_window()), Some(dialog));
}

#[test]
fn closed_dialog_leaves_the_step_in_place() {
    let mut windows = WindowTracker::new();
    let dialog = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("open_dialog", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("dialog_field", dialog));
    anchors.register(AnchorDescriptor::new("dialog_ok", dialog));

    let mut session = session_with(anchors, windows);
    let tour = Tour::new("dialog").with_steps([
        Step::new("open", "open_dialog"),
        Step::new("fill", "dialog_field"),
        Step::new("confirm", "dialog_ok"),
    ]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(session.window_activated(dialog));
    assert_eq!(current(&session), Some("fill"));

    // The dialog is dismissed before the tour got to "confirm".
    session.window_removed(dialog);
    assert!(session.windows_mut().remove(dialog));
    assert!(!session.window_activated(WindowId::MAIN));
    // The dialog anchors are gone, so nothing could be resolved.
    assert_eq!(current(&session), Some("fill"));
}

#[test]
fn automatic_prefers_previous_when_returning_to_the_owner() {
    let mut windows = WindowTracker::new();
    let dialog = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("open_dialog", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("dialog_field", dialog));
    anchors.register(AnchorDescriptor::new("dialog_ok", dialog));

    let mut session = session_with(anchors, windows);
    let tour = Tour::new("dialog").with_steps([
        Step::new("open", "open_dialog"),
        Step::new("fill", "dialog_field"),
        Step::new("confirm", "dialog_ok"),
    ]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(session.window_activated(dialog));
    assert_eq!(current(&session), Some("fill"));

    // Back on the main window: it is not a descendant of the dialog, so the
    // policy also looks backwards.
    assert!(session.window_activated(WindowId::MAIN));
    assert_eq!(current(&session), Some("open"));
}

#[test]
fn none_policy_leaves_everything_alone() {
    let mut windows = WindowTracker::new();
    let other = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(
        AnchorDescriptor::new("a", WindowId::MAIN).with_transition(WindowTransition::None),
    );
    anchors.register(AnchorDescriptor::new("b", other));

    let mut session = session_with(anchors, windows);
    let tour = Tour::new("T").with_steps([Step::new("A", "a"), Step::new("B", "b")]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(session.overlay().is_visible());

    assert!(!session.window_activated(other));
    assert_eq!(current(&session), Some("A"));
    assert!(session.overlay().is_visible());
}

#[test]
fn nothing_on_the_new_window_hides_until_return() {
    let mut windows = WindowTracker::new();
    let other = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    let mut session = session_with(anchors, windows);
    assert_eq!(
        session.start(Tour::new("T").with_step(Step::new("A", "a"))),
        Ok(true)
    );

    assert!(!session.window_activated(other));
    assert!(!session.overlay().is_visible());
    assert!(session.is_active());

    assert!(session.window_activated(WindowId::MAIN));
    assert!(session.overlay().is_visible());
}

#[test]
fn refocusing_a_dialog_keeps_the_overlay_hidden() {
    let mut windows = WindowTracker::new();
    let dialog = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    let mut session = session_with(anchors, windows);
    assert_eq!(
        session.start(Tour::new("T").with_step(Step::new("A", "a"))),
        Ok(true)
    );

    assert!(!session.window_activated(dialog));
    assert!(!session.window_deactivated(dialog));
    assert!(!session.window_activated(dialog));
    assert!(!session.overlay().is_visible());

    assert!(session.window_activated(WindowId::MAIN));
    assert!(session.overlay().is_visible());
}

#[test]
fn overlay_shows_even_when_an_entered_hook_panics() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("b", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let _boom = session.on_step_entered("B", |_, _| panic!("hook failed"));
    let tour = Tour::new("T").with_steps([Step::new("A", "a"), Step::new("B", "b")]);
    assert_eq!(session.start(tour), Ok(true));

    assert!(!session.window_deactivated(WindowId::MAIN));
    assert!(!session.overlay().is_visible());

    let result = catch_unwind(AssertUnwindSafe(|| session.next_step()));
    assert!(result.is_err());
    assert!(session.overlay().is_visible());
    assert_eq!(session.overlay().target().map(|t| t.id.as_str()), Some("b"));
}

#[test]
#[traced_test]
fn overwriting_an_action_warns() {
    let mut actions: ActionRepository<ActionName> = ActionRepository::new();
    let _first = actions.add_execute("Save".into(), |_, _| {});
    assert!(!logs_contain("already registered"));

    let _second = actions.add_execute("save".into(), |_, _| {});
    logs_assert(|lines: &[&str]| {
        match lines
            .iter()
            .filter(|line| line.contains("WARN") && line.contains("already registered"))
            .count()
        {
            1 => Ok(()),
            n => Err(format!("expected one overwrite warning, found {n}")),
        }
    });
}

#[test]
fn close_fires_left_then_closed_once() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("b", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut session, &log, &["A", "B"]);

    let tour = Tour::new("T").with_steps([Step::new("A", "a"), Step::new("B", "b")]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(session.next_step());
    assert!(session.close());
    assert!(!session.close());

    assert_eq!(
        *log.borrow(),
        [
            "entering A",
            "entered A",
            "left A",
            "entering B",
            "entered B",
            "left B",
            "closed B",
        ]
    );
    assert!(session.if_current_step_equals("B").is_inert());
    assert!(!session.overlay().is_active());
}

#[test]
fn closing_from_a_hook_is_deferred() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut session, &log, &["A"]);
    let _close = session.on_step_entering("A", |_, commands| commands.close());

    assert_eq!(
        session.start(Tour::new("T").with_step(Step::new("A", "a"))),
        Ok(true)
    );
    assert!(!session.is_active());
    // The entering hook was replaced by the closing one; the rest ran in order.
    assert_eq!(*log.borrow(), ["entered A", "left A", "closed A"]);
}

#[test]
fn entering_hooks_enable_navigation_to_hidden_anchors() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let tour = Tour::new("T").with_steps([Step::new("A", "a"), Step::new("B", "tab_b")]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(!session.can_next_step());

    // An entering hook would switch to the tab that holds the anchor.
    let _h = session.on_step_entering("B", |_, _| {});
    assert!(session.can_next_step());
}

#[test]
fn next_button_visibility() {
    let mut anchors = AnchorRegistry::new();
    anchors.register(AnchorDescriptor::new("a", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("b", WindowId::MAIN));
    anchors.register(AnchorDescriptor::new("c", WindowId::MAIN));
    let mut session = session_with(anchors, WindowTracker::new());
    let tour = Tour::new("T")
        .with_show_next_button_default(false)
        .with_steps([
            Step::new("A", "a"),
            Step::new("B", "b").with_show_next_button(true),
            Step::new("C", "c"),
        ]);
    assert_eq!(session.start(tour), Ok(true));
    assert!(!session.view_model().unwrap().show_next());
    assert!(session.next_step());
    assert!(session.view_model().unwrap().show_next());
    assert!(session.next_step());
    // The close button always shows.
    assert!(session.view_model().unwrap().show_next());
}

proptest! {
    #[test]
    fn n_minus_one_nexts_land_on_the_last_step(n in 1_usize..24) {
        let mut anchors = AnchorRegistry::new();
        let steps: Vec<Step> = (0..n)
            .map(|i| {
                let anchor = format!("anchor_{i}");
                anchors.register(AnchorDescriptor::new(anchor.as_str(), WindowId::MAIN));
                Step::new(format!("step_{i}"), anchor)
            })
            .collect();
        let mut session = session_with(anchors, WindowTracker::new());
        prop_assert_eq!(session.start(Tour::new("T").with_steps(steps)), Ok(true));

        for _ in 1..n {
            prop_assert!(session.next_step());
        }
        let last = format!("step_{}", n - 1);
        prop_assert_eq!(current(&session), Some(last.as_str()));
        prop_assert!(!session.next_step());
        prop_assert_eq!(current(&session), Some(last.as_str()));
        prop_assert!(session.view_model().unwrap().has_tour_finished());
    }
}
