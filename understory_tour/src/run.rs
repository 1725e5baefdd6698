// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The step-sequencing state machine.
//!
//! A [`TourRun`] owns the position within one tour. It links the steps into a
//! chain of nodes once, at construction, and from then on only moves a cursor
//! along that chain. Every move resolves the target step's anchor afresh,
//! drives the overlay, and fills the view model.
//!
//! Runs are created and driven by [`TourSession`](crate::TourSession); the
//! session owns the collaborators and passes them in for each call.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::TourError;
use crate::hooks::Hooks;
use crate::host::{AnchorResolver, OverlayPresenter, OverlayScope, WindowCoordinator};
use crate::tour::{Step, Tour};
use crate::types::{AnchorDescriptor, WindowId, WindowTransition};
use crate::view_model::ViewModel;

/// What the host should do with the overlay after a window activation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Show the overlay.
    Show,
    /// Hide the overlay; the run stays active.
    Hide,
    /// Leave the overlay as it is.
    Unchanged,
}

#[derive(Debug)]
struct StepNode {
    step: Step,
    previous: Option<usize>,
    next: Option<usize>,
    step_no: usize,
}

/// Outcome of a move made while following a window change.
fn moved_to(placed: bool) -> TransitionOutcome {
    if placed {
        TransitionOutcome::Show
    } else {
        TransitionOutcome::Hide
    }
}

/// Collaborators borrowed from the session for one call.
pub(crate) struct Env<'a, R, W, O> {
    pub(crate) resolver: &'a R,
    pub(crate) windows: &'a W,
    pub(crate) overlay: &'a mut O,
    pub(crate) hooks: &'a mut Hooks,
}

/// One run through a [`Tour`].
pub struct TourRun {
    name: String,
    show_next_button_default: bool,
    enable_next_button_always: bool,
    nodes: Vec<StepNode>,
    current: usize,
    /// Whether the overlay points at the current step's anchor.
    placed: bool,
    window: WindowId,
    view: Box<dyn ViewModel>,
}

impl fmt::Debug for TourRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourRun")
            .field("name", &self.name)
            .field("show_next_button_default", &self.show_next_button_default)
            .field("enable_next_button_always", &self.enable_next_button_always)
            .field("nodes", &self.nodes)
            .field("current", &self.current)
            .field("placed", &self.placed)
            .field("window", &self.window)
            .field("view", self.view.tour())
            .finish()
    }
}

impl TourRun {
    /// Validate `tour` and link its steps; the run starts on the first step
    /// and tracks `window` as the active one.
    pub(crate) fn new(
        tour: Tour,
        window: WindowId,
        view: Box<dyn ViewModel>,
    ) -> Result<Self, TourError> {
        tour.validate()?;
        let len = tour.steps.len();
        let nodes = tour
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| StepNode {
                step,
                previous: i.checked_sub(1),
                next: (i + 1 < len).then_some(i + 1),
                step_no: i + 1,
            })
            .collect();
        Ok(Self {
            name: tour.name,
            show_next_button_default: tour.show_next_button_default,
            enable_next_button_always: tour.enable_next_button_always,
            nodes,
            current: 0,
            placed: false,
            window,
            view,
        })
    }

    /// Name of the tour being run.
    pub fn tour_name(&self) -> &str {
        &self.name
    }

    /// The step the run is positioned at.
    pub fn current_step(&self) -> &Step {
        &self.nodes[self.current].step
    }

    /// 1-based position of the current step.
    pub fn current_step_no(&self) -> usize {
        self.nodes[self.current].step_no
    }

    /// Number of steps in the tour.
    pub fn total_steps(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the current step is the last one.
    pub fn is_last_step(&self) -> bool {
        self.nodes[self.current].next.is_none()
    }

    /// The window the run considers active.
    pub fn active_window(&self) -> WindowId {
        self.window
    }

    /// The steps of the tour, in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> + '_ {
        self.nodes.iter().map(|n| &n.step)
    }

    /// The view model this run drives.
    pub fn view_model(&self) -> &dyn ViewModel {
        &*self.view
    }

    /// Mutable access to the view model, for presenters that write back the
    /// placement they actually used.
    pub fn view_model_mut(&mut self) -> &mut dyn ViewModel {
        &mut *self.view
    }

    pub(crate) fn start<R, W, O>(&mut self, env: &mut Env<'_, R, W, O>) -> bool
    where
        R: AnchorResolver,
        O: OverlayPresenter,
    {
        tracing::info!(tour = %self.name, steps = self.nodes.len(), "tour started");
        env.overlay.begin_tour();
        self.set_step(Some(0), false, env)
    }

    fn set_step<R, W, O>(
        &mut self,
        target: Option<usize>,
        include_unloaded: bool,
        env: &mut Env<'_, R, W, O>,
    ) -> bool
    where
        R: AnchorResolver,
        O: OverlayPresenter,
    {
        let Some(target) = target else {
            tracing::debug!(tour = %self.name, "no step to move to");
            return false;
        };
        tracing::debug!(step = %self.nodes[target].step.id, "setting step");

        if target != self.current {
            env.hooks.left(&self.nodes[self.current].step);
            self.current = target;
        }
        let step = &self.nodes[self.current].step;
        env.hooks.entering(step);

        let Some(anchor) = env.resolver.resolve(&step.anchor, include_unloaded) else {
            tracing::warn!(
                step = %step.id,
                anchor = %step.anchor,
                "could not find anchor; the overlay may not appear until it is available"
            );
            // The cursor moved, so the counters and labels follow it. The
            // overlay still points at the old anchor and must not show them.
            self.placed = false;
            env.overlay.hide();
            self.populate(None, env.hooks);
            return false;
        };

        self.placed = true;
        let _scope = OverlayScope::enter(&mut *env.overlay, &anchor);
        self.populate(Some(&anchor), env.hooks);
        env.hooks.entered(&self.nodes[self.current].step);
        true
    }

    fn populate(&mut self, anchor: Option<&AnchorDescriptor>, hooks: &Hooks) {
        let total = self.nodes.len();
        let node = &self.nodes[self.current];
        let step = &node.step;

        let vm = self.view.tour_mut();
        vm.header.clone_from(&step.header);
        vm.content.clone_from(&step.content);
        vm.header_template.clone_from(&step.header_template);
        vm.content_template.clone_from(&step.content_template);
        vm.steps = vm.labels().step_label(node.step_no, total);
        vm.current_step_no = node.step_no;
        vm.total_steps = total;
        vm.show_do_it = hooks.has_doable(step);
        vm.set_show_next(step.show_next_button.unwrap_or(self.show_next_button_default));
        if node.next.is_none() {
            vm.set_close_text();
        } else {
            vm.set_next_text();
        }
        if let Some(anchor) = anchor {
            vm.set_placement(anchor.placement);
        }

        self.view.step_changed(step);
    }

    pub(crate) fn next_step<R, W, O>(
        &mut self,
        include_unloaded: bool,
        env: &mut Env<'_, R, W, O>,
    ) -> bool
    where
        R: AnchorResolver,
        O: OverlayPresenter,
    {
        let next = self.nodes[self.current].next;
        self.set_step(next, include_unloaded, env)
    }

    pub(crate) fn previous_step<R, W, O>(&mut self, env: &mut Env<'_, R, W, O>) -> bool
    where
        R: AnchorResolver,
        O: OverlayPresenter,
    {
        let previous = self.nodes[self.current].previous;
        self.set_step(previous, false, env)
    }

    pub(crate) fn can_next_step(&self, resolver: &impl AnchorResolver, hooks: &Hooks) -> bool {
        self.can_go_to(self.nodes[self.current].next, resolver, hooks)
    }

    pub(crate) fn can_previous_step(&self, resolver: &impl AnchorResolver, hooks: &Hooks) -> bool {
        self.can_go_to(self.nodes[self.current].previous, resolver, hooks)
    }

    fn can_go_to(
        &self,
        target: Option<usize>,
        resolver: &impl AnchorResolver,
        hooks: &Hooks,
    ) -> bool {
        let Some(target) = target else {
            return false;
        };
        if self.enable_next_button_always {
            return true;
        }
        let step = &self.nodes[target].step;
        // An entering hook usually brings the anchor into existence.
        if hooks.has_entering(step) {
            return true;
        }
        self.on_active_window(target, resolver)
    }

    fn on_active_window(&self, node: usize, resolver: &impl AnchorResolver) -> bool {
        resolver
            .resolve(&self.nodes[node].step.anchor, true)
            .is_some_and(|a| a.window == self.window)
    }

    pub(crate) fn close<R, W, O>(self, env: &mut Env<'_, R, W, O>)
    where
        O: OverlayPresenter,
    {
        tracing::info!(tour = %self.name, step = %self.current_step().id, "tour closed");
        env.overlay.end_tour();
        let step = self.current_step();
        env.hooks.left(step);
        env.hooks.closed(step);
    }

    pub(crate) fn do_it(&self, hooks: &mut Hooks) {
        hooks.do_it(self.current_step());
    }

    pub(crate) fn can_do_it(&self, hooks: &Hooks) -> bool {
        hooks.can_do_it(self.current_step())
    }

    /// Track a window activation.
    pub(crate) fn window_activated<R, W, O>(
        &mut self,
        window: WindowId,
        env: &mut Env<'_, R, W, O>,
    ) -> TransitionOutcome
    where
        R: AnchorResolver,
        W: WindowCoordinator,
        O: OverlayPresenter,
    {
        if window == self.window {
            return self.reactivated(env.resolver);
        }
        let previous = core::mem::replace(&mut self.window, window);
        let outcome = self.resolve_transition(previous, env);
        tracing::debug!(from = ?previous, to = ?window, ?outcome, "window activated");
        outcome
    }

    /// The tracked window was activated again, typically after losing focus.
    fn reactivated(&self, resolver: &impl AnchorResolver) -> TransitionOutcome {
        let step = self.current_step();
        match resolver.resolve(&step.anchor, true) {
            None => TransitionOutcome::Unchanged,
            Some(anchor) if anchor.window == self.window => self.show_if_placed(),
            Some(_) => TransitionOutcome::Hide,
        }
    }

    fn show_if_placed(&self) -> TransitionOutcome {
        if self.placed {
            TransitionOutcome::Show
        } else {
            TransitionOutcome::Unchanged
        }
    }

    fn resolve_transition<R, W, O>(
        &mut self,
        previous: WindowId,
        env: &mut Env<'_, R, W, O>,
    ) -> TransitionOutcome
    where
        R: AnchorResolver,
        W: WindowCoordinator,
        O: OverlayPresenter,
    {
        let step = self.current_step();
        let Some(anchor) = env.resolver.resolve(&step.anchor, true) else {
            tracing::warn!(step = %step.id, anchor = %step.anchor, "could not find anchor");
            return TransitionOutcome::Unchanged;
        };
        if anchor.window == self.window {
            return self.show_if_placed();
        }

        let policy = match anchor.transition {
            WindowTransition::None => return TransitionOutcome::Unchanged,
            WindowTransition::Automatic => WindowTransition::Automatic
                .resolve(env.windows.is_ancestor(previous, self.window)),
            policy => policy,
        };

        if policy.tries_next()
            && let Some(next) = self.nodes[self.current].next
            && self.on_active_window(next, env.resolver)
        {
            let placed = self.set_step(Some(next), true, env);
            return moved_to(placed);
        }

        if policy.tries_previous() {
            let mut cursor = self.nodes[self.current].previous;
            while let Some(i) = cursor {
                if self.on_active_window(i, env.resolver) {
                    let placed = self.set_step(Some(i), false, env);
                    return moved_to(placed);
                }
                cursor = self.nodes[i].previous;
            }
        }

        TransitionOutcome::Hide
    }
}
