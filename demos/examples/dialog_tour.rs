// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted tour that follows the user into a dialog and back.
//!
//! This example shows how to combine:
//! - `AnchorRegistry` and `WindowTracker` as the host's view of its widgets,
//! - a console `OverlayPresenter` standing in for a real popup,
//! - hooks that prepare the UI before a step is shown,
//! - a custom view model installed through the session's factory.
//!
//! Run:
//! - `cargo run -p understory_tour_demos --example dialog_tour`
//! - `RUST_LOG=debug cargo run -p understory_tour_demos --example dialog_tour`

use std::cell::Cell;
use std::rc::Rc;

use understory_tour::{
    AnchorDescriptor, AnchorRegistry, OverlayPresenter, Placement, Step, Tour, TourLabels,
    TourSession, TourViewModel, ViewModel, WindowId, WindowTracker, WindowTransition,
};

/// Prints what a real popup would do.
#[derive(Debug, Default)]
struct ConsolePresenter {
    target: Option<String>,
}

impl OverlayPresenter for ConsolePresenter {
    fn begin_tour(&mut self) {
        println!("[overlay] tour begins");
    }

    fn move_to(&mut self, anchor: &AnchorDescriptor) {
        println!(
            "[overlay] move to '{}' on {:?} ({:?})",
            anchor.id, anchor.window, anchor.placement
        );
        self.target = Some(anchor.id.to_string());
    }

    fn show(&mut self) {
        println!("[overlay] show at {:?}", self.target);
    }

    fn hide(&mut self) {
        println!("[overlay] hide");
    }

    fn end_tour(&mut self) {
        println!("[overlay] tour ends");
        self.target = None;
    }

    fn reposition(&mut self) {
        println!("[overlay] reposition");
    }
}

/// View model that also remembers which steps the user has seen.
#[derive(Debug)]
struct ProgressViewModel {
    tour: TourViewModel,
    visited: Vec<String>,
}

impl ViewModel for ProgressViewModel {
    fn tour(&self) -> &TourViewModel {
        &self.tour
    }

    fn tour_mut(&mut self) -> &mut TourViewModel {
        &mut self.tour
    }

    fn step_changed(&mut self, step: &Step) {
        self.visited.push(step.id.to_string());
    }
}

type Session = TourSession<AnchorRegistry, WindowTracker, ConsolePresenter>;

fn print_state(session: &Session) {
    match session.view_model() {
        Some(vm) => println!(
            "  {} | {} | [{}] next enabled: {}",
            vm.steps,
            vm.header,
            vm.button_text(),
            session.can_advance()
        ),
        None => println!("  (no tour)"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut windows = WindowTracker::new();
    let options = windows.open();

    let mut anchors = AnchorRegistry::new();
    anchors.register(
        AnchorDescriptor::new("menu_options", WindowId::MAIN)
            .with_placement(Placement::BottomLeft)
            .with_transition(WindowTransition::NextHide),
    );
    // The dialog is not open yet; its content is known but not loaded.
    anchors.register_unloaded(
        AnchorDescriptor::new("options_theme", options).with_placement(Placement::RightCenter),
    );
    anchors.register_unloaded(AnchorDescriptor::new("options_ok", options));
    anchors.register(AnchorDescriptor::new("status_bar", WindowId::MAIN));

    let mut session = TourSession::new(anchors, windows, ConsolePresenter::default())
        .with_labels(TourLabels {
            next: String::from("Next"),
            close: String::from("Done"),
            step: String::from("{n} of {total}"),
        });
    session.set_view_model_factory(|labels| {
        Box::new(ProgressViewModel {
            tour: TourViewModel::new(labels),
            visited: Vec::new(),
        })
    });

    let applied = Rc::new(Cell::new(false));
    let a = applied.clone();
    let _theme = session.attach_doable_if(
        "theme",
        move |_, _| a.set(true),
        |step| step.tag::<&str>() == Some(&"dark"),
    );
    let _status = session.on_step_entering("status", |_, _| {
        println!("[hook] scrolling the status bar into view");
    });
    let _closed = session.on_closed(|step, _| println!("[hook] closed on '{}'", step.id));

    let tour = Tour::new("options")
        .with_step(
            Step::new("open", "menu_options")
                .with_header("Options")
                .with_content("Open the options dialog from the menu."),
        )
        .with_step(
            Step::new("theme", "options_theme")
                .with_header("Theme")
                .with_content("Pick a theme, or let the tour do it.")
                .with_tag("dark"),
        )
        .with_step(Step::new("confirm", "options_ok").with_header("Confirm"))
        .with_step(Step::new("status", "status_bar").with_header("Status bar"));

    match session.start(tour) {
        Ok(true) => {}
        Ok(false) => {
            println!("first step is not on screen");
            return;
        }
        Err(err) => {
            eprintln!("cannot start tour: {err}");
            return;
        }
    }
    print_state(&session);

    println!("user opens the options dialog");
    session.resolver_mut().set_loaded("options_theme", true);
    session.resolver_mut().set_loaded("options_ok", true);
    session.windows_mut().activate(options);
    session.window_activated(options);
    print_state(&session);

    println!("user presses 'do it'");
    if session.can_do_it() {
        session.do_it();
    }
    println!("  theme applied: {}", applied.get());

    session.advance();
    print_state(&session);

    println!("user closes the dialog");
    session.window_removed(options);
    session.windows_mut().remove(options);
    session.window_activated(WindowId::MAIN);
    print_state(&session);

    println!("user presses '{}'", session.view_model().map_or("", |vm| vm.button_text()));
    session.advance();
    print_state(&session);

    if let Some(vm) = session.view_model_as::<ProgressViewModel>() {
        tracing::info!(visited = ?vm.visited, "progress so far");
    }

    println!("user presses '{}'", session.view_model().map_or("", |vm| vm.button_text()));
    session.advance();
    print_state(&session);
}
