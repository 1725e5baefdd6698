// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The presentation state a run drives.
//!
//! A run fills a [`TourViewModel`] every time it settles on a step. Hosts that
//! need extra state wrap it in their own type implementing [`ViewModel`] and
//! install a [`ViewModelFactory`] on the session.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::any::Any;

use crate::tour::Step;
use crate::types::Placement;

/// Display texts used by every run of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TourLabels {
    /// Primary button text while more steps follow.
    pub next: String,
    /// Primary button text on the last step.
    pub close: String,
    /// Step counter template; `{n}` and `{total}` are substituted.
    pub step: String,
}

impl Default for TourLabels {
    fn default() -> Self {
        Self {
            next: String::from("Next >>"),
            close: String::from("Close"),
            step: String::from("Step {n}/{total}"),
        }
    }
}

impl TourLabels {
    /// Format the step counter for step `n` of `total`.
    pub fn step_label(&self, n: usize, total: usize) -> String {
        self.step
            .replace("{n}", &n.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Presentation state of the current step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TourViewModel {
    /// Header text.
    pub header: String,
    /// Body text.
    pub content: String,
    /// Presenter template key for the header.
    pub header_template: Option<String>,
    /// Presenter template key for the content.
    pub content_template: Option<String>,
    /// Formatted step counter.
    pub steps: String,
    /// 1-based position of the current step.
    pub current_step_no: usize,
    /// Number of steps in the tour.
    pub total_steps: usize,
    /// Whether a doable is attached to the current step.
    pub show_do_it: bool,
    /// Placement the presenter actually used, which may differ from
    /// [`placement`](Self::placement) when the preferred side did not fit.
    pub actual_placement: Placement,
    show_next: bool,
    placement: Placement,
    button_text: String,
    closing: bool,
    labels: TourLabels,
}

impl TourViewModel {
    /// Create a view model showing the Next label.
    pub fn new(labels: &TourLabels) -> Self {
        Self {
            header: String::new(),
            content: String::new(),
            header_template: None,
            content_template: None,
            steps: String::new(),
            current_step_no: 1,
            total_steps: 1,
            show_do_it: false,
            actual_placement: Placement::default(),
            show_next: false,
            placement: Placement::default(),
            button_text: labels.next.clone(),
            closing: false,
            labels: labels.clone(),
        }
    }

    /// Whether the primary button shows.
    ///
    /// Always true once the button shows the close label.
    pub fn show_next(&self) -> bool {
        self.show_next || self.closing
    }

    /// Set whether the primary button shows on a non-final step.
    pub fn set_show_next(&mut self, show: bool) {
        self.show_next = show;
    }

    /// Primary button text.
    pub fn button_text(&self) -> &str {
        &self.button_text
    }

    /// Whether the primary button closes the tour.
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Switch the primary button to the close label.
    pub fn set_close_text(&mut self) {
        self.button_text.clone_from(&self.labels.close);
        self.closing = true;
    }

    /// Switch the primary button back to the next label.
    pub fn set_next_text(&mut self) {
        self.button_text.clone_from(&self.labels.next);
        self.closing = false;
    }

    /// Preferred placement of the overlay.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Set the preferred placement; a change also resets
    /// [`actual_placement`](Self::actual_placement).
    pub fn set_placement(&mut self, placement: Placement) {
        if self.placement != placement {
            self.placement = placement;
            self.actual_placement = placement;
        }
    }

    /// Whether the current step is the last one.
    pub fn has_tour_finished(&self) -> bool {
        self.current_step_no == self.total_steps
    }

    /// The labels this view model was created with.
    pub fn labels(&self) -> &TourLabels {
        &self.labels
    }
}

/// A view model a run can drive.
///
/// The run writes into [`tour_mut`](Self::tour_mut) and then calls
/// [`step_changed`](Self::step_changed) so wrapper types can derive their own
/// state.
pub trait ViewModel: Any {
    /// The shared tour state.
    fn tour(&self) -> &TourViewModel;

    /// Mutable access to the shared tour state.
    fn tour_mut(&mut self) -> &mut TourViewModel;

    /// Called after the run populated the view model for `step`.
    fn step_changed(&mut self, _step: &Step) {}
}

impl ViewModel for TourViewModel {
    fn tour(&self) -> &TourViewModel {
        self
    }

    fn tour_mut(&mut self) -> &mut TourViewModel {
        self
    }
}

/// Creates the view model for a new run.
pub type ViewModelFactory = Box<dyn Fn(&TourLabels) -> Box<dyn ViewModel>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_label_substitutes_placeholders() {
        let labels = TourLabels::default();
        assert_eq!(labels.step_label(2, 5), "Step 2/5");
        let labels = TourLabels {
            step: String::from("{n} of {total}"),
            ..TourLabels::default()
        };
        assert_eq!(labels.step_label(1, 3), "1 of 3");
    }

    #[test]
    fn close_text_forces_the_button() {
        let mut vm = TourViewModel::new(&TourLabels::default());
        assert_eq!(vm.button_text(), "Next >>");
        assert!(!vm.show_next());
        vm.set_close_text();
        assert_eq!(vm.button_text(), "Close");
        assert!(vm.show_next());
        vm.set_next_text();
        assert!(!vm.show_next());
    }

    #[test]
    fn placement_change_resets_actual_placement() {
        let mut vm = TourViewModel::new(&TourLabels::default());
        vm.actual_placement = Placement::BottomLeft;
        vm.set_placement(Placement::TopLeft);
        assert_eq!(vm.actual_placement, Placement::BottomLeft);
        vm.set_placement(Placement::RightCenter);
        assert_eq!(vm.actual_placement, Placement::RightCenter);
    }

    #[test]
    fn finished_on_last_step() {
        let mut vm = TourViewModel::new(&TourLabels::default());
        vm.total_steps = 3;
        vm.current_step_no = 2;
        assert!(!vm.has_tour_finished());
        vm.current_step_no = 3;
        assert!(vm.has_tour_finished());
    }
}
