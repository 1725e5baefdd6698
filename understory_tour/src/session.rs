// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host-owned entry point: one session, at most one active run.
//!
//! A [`TourSession`] owns the collaborators, the hook registries, and the
//! current [`TourRun`]. Hosts register hooks on it, start tours through it,
//! forward button presses and window events to it, and read the view model
//! back from it.
//!
//! Navigation requested from inside a hook or doable is queued on
//! [`TourCommands`] and applied after the call that fired the callback has
//! finished its own transition. At most [`MAX_DEFERRED_COMMANDS`] queued
//! requests are applied per top-level call; the rest are dropped with a
//! warning so that hooks bouncing between two steps cannot loop forever.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::error::TourError;
use crate::hooks::{HookHandle, HookKey, Hooks, TourCommand, TourCommands};
use crate::host::{AnchorResolver, OverlayPresenter, WindowCoordinator};
use crate::run::{Env, TourRun, TransitionOutcome};
use crate::tour::{Step, Tour};
use crate::types::{StepId, WindowId};
use crate::view_model::{TourLabels, TourViewModel, ViewModel, ViewModelFactory};

/// Upper bound on queued navigation requests applied per top-level call.
pub const MAX_DEFERRED_COMMANDS: usize = 64;

/// Drives tours over a resolver `R`, a window coordinator `W` and an overlay
/// presenter `O`.
pub struct TourSession<R, W, O> {
    resolver: R,
    windows: W,
    overlay: O,
    hooks: Hooks,
    labels: TourLabels,
    factory: Option<ViewModelFactory>,
    run: Option<TourRun>,
}

impl<R: fmt::Debug, W: fmt::Debug, O: fmt::Debug> fmt::Debug for TourSession<R, W, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourSession")
            .field("resolver", &self.resolver)
            .field("windows", &self.windows)
            .field("overlay", &self.overlay)
            .field("hooks", &self.hooks)
            .field("labels", &self.labels)
            .field("factory", &self.factory.as_ref().map(|_| "..."))
            .field("run", &self.run)
            .finish()
    }
}

impl<R, W, O> TourSession<R, W, O>
where
    R: AnchorResolver,
    W: WindowCoordinator,
    O: OverlayPresenter,
{
    /// Create a session with default labels and view model.
    pub fn new(resolver: R, windows: W, overlay: O) -> Self {
        Self {
            resolver,
            windows,
            overlay,
            hooks: Hooks::default(),
            labels: TourLabels::default(),
            factory: None,
            run: None,
        }
    }

    /// Use `labels` for runs started from now on.
    #[must_use]
    pub fn with_labels(mut self, labels: TourLabels) -> Self {
        self.labels = labels;
        self
    }

    /// The labels applied to new runs.
    pub fn labels(&self) -> &TourLabels {
        &self.labels
    }

    /// Create view models with `factory` instead of [`TourViewModel::new`].
    pub fn set_view_model_factory(
        &mut self,
        factory: impl Fn(&TourLabels) -> Box<dyn ViewModel> + 'static,
    ) {
        self.factory = Some(Box::new(factory));
    }

    /// Go back to the default view model.
    pub fn clear_view_model_factory(&mut self) {
        self.factory = None;
    }

    /// The anchor resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access to the anchor resolver, to register or update anchors.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// The window coordinator.
    pub fn windows(&self) -> &W {
        &self.windows
    }

    /// Mutable access to the window coordinator.
    pub fn windows_mut(&mut self) -> &mut W {
        &mut self.windows
    }

    /// The overlay presenter.
    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// Mutable access to the overlay presenter.
    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    fn split(&mut self) -> (&mut Option<TourRun>, Env<'_, R, W, O>) {
        (
            &mut self.run,
            Env {
                resolver: &self.resolver,
                windows: &self.windows,
                overlay: &mut self.overlay,
                hooks: &mut self.hooks,
            },
        )
    }

    fn with_run<T>(
        &mut self,
        f: impl FnOnce(&mut TourRun, &mut Env<'_, R, W, O>) -> T,
    ) -> Option<T> {
        let (run, mut env) = self.split();
        let run = run.as_mut()?;
        Some(f(run, &mut env))
    }

    // Runs

    /// Start `tour`, closing the active run first.
    ///
    /// Returns `Ok(false)` if the first step's anchor could not be found; the
    /// new run is closed again in that case. A malformed tour is rejected
    /// before anything else happens to the previous run's overlay.
    pub fn start(&mut self, tour: Tour) -> Result<bool, TourError> {
        tour.validate()?;
        self.close();

        let view: Box<dyn ViewModel> = match &self.factory {
            Some(factory) => factory(&self.labels),
            None => Box::new(TourViewModel::new(&self.labels)),
        };
        let mut run = TourRun::new(tour, self.windows.active_window(), view)?;
        let (_, mut env) = self.split();
        let started = run.start(&mut env);
        self.run = Some(run);

        if !started {
            tracing::warn!("first step unavailable; closing tour");
            self.close_run();
        }
        self.flush_commands();
        Ok(started)
    }

    /// Whether a run is active.
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// The active run.
    pub fn run(&self) -> Option<&TourRun> {
        self.run.as_ref()
    }

    /// The active run's current step.
    pub fn current_step(&self) -> Option<&Step> {
        self.run.as_ref().map(TourRun::current_step)
    }

    /// The active run's view model.
    pub fn view_model(&self) -> Option<&TourViewModel> {
        self.run.as_ref().map(|run| run.view_model().tour())
    }

    /// The active run's view model as the concrete type a factory created.
    pub fn view_model_as<T: ViewModel>(&self) -> Option<&T> {
        let view: &dyn Any = self.run.as_ref()?.view_model();
        view.downcast_ref()
    }

    /// Mutable access to the active run's view model.
    pub fn view_model_mut(&mut self) -> Option<&mut TourViewModel> {
        self.run.as_mut().map(|run| run.view_model_mut().tour_mut())
    }

    // Navigation

    /// Move to the next step. Returns whether its anchor was found.
    pub fn next_step(&mut self) -> bool {
        self.navigate(|run, env| run.next_step(false, env))
    }

    /// Move to the next step, accepting an unloaded anchor.
    pub fn next_step_including_unloaded(&mut self) -> bool {
        self.navigate(|run, env| run.next_step(true, env))
    }

    /// Move to the previous step. Returns whether its anchor was found.
    pub fn previous_step(&mut self) -> bool {
        self.navigate(TourRun::previous_step)
    }

    fn navigate(
        &mut self,
        f: impl FnOnce(&mut TourRun, &mut Env<'_, R, W, O>) -> bool,
    ) -> bool {
        let moved = self.with_run(f).unwrap_or(false);
        self.flush_commands();
        moved
    }

    /// Whether moving to the next step is currently possible.
    pub fn can_next_step(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.can_next_step(&self.resolver, &self.hooks))
    }

    /// Whether moving to the previous step is currently possible.
    pub fn can_previous_step(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.can_previous_step(&self.resolver, &self.hooks))
    }

    /// Press the primary button: close on the last step, otherwise move next.
    pub fn advance(&mut self) -> bool {
        if self.view_model().is_some_and(TourViewModel::is_closing) {
            self.close()
        } else {
            self.next_step()
        }
    }

    /// Whether the primary button is enabled.
    pub fn can_advance(&self) -> bool {
        self.view_model().is_some_and(TourViewModel::is_closing) || self.can_next_step()
    }

    /// Close the active run. Returns `false` if there was none.
    pub fn close(&mut self) -> bool {
        let closed = self.close_run();
        self.flush_commands();
        closed
    }

    fn close_run(&mut self) -> bool {
        let Some(run) = self.run.take() else {
            return false;
        };
        let (_, mut env) = self.split();
        run.close(&mut env);
        true
    }

    /// Run the doable attached to the current step.
    pub fn do_it(&mut self) {
        let (run, env) = self.split();
        if let Some(run) = run {
            run.do_it(env.hooks);
        }
        self.flush_commands();
    }

    /// Whether the doable attached to the current step may run.
    pub fn can_do_it(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.can_do_it(&self.hooks))
    }

    /// A navigator that acts only if the run is positioned at `step`.
    pub fn if_current_step_equals(&mut self, step: &str) -> TourNavigator<'_, R, W, O> {
        let live = self
            .current_step()
            .is_some_and(|current| current.id.as_str() == step);
        TourNavigator {
            session: live.then_some(self),
        }
    }

    // Hooks

    /// Call `f` before the anchor of step `step` is looked up.
    pub fn on_step_entering(
        &mut self,
        step: impl Into<StepId>,
        f: impl FnMut(&Step, &mut TourCommands) + 'static,
    ) -> HookHandle {
        self.hooks.add(HookKey::Entering(step.into()), f)
    }

    /// Call `f` once the overlay points at step `step`.
    pub fn on_step_entered(
        &mut self,
        step: impl Into<StepId>,
        f: impl FnMut(&Step, &mut TourCommands) + 'static,
    ) -> HookHandle {
        self.hooks.add(HookKey::Entered(step.into()), f)
    }

    /// Call `f` when the run leaves step `step`, including on close.
    pub fn on_step_left(
        &mut self,
        step: impl Into<StepId>,
        f: impl FnMut(&Step, &mut TourCommands) + 'static,
    ) -> HookHandle {
        self.hooks.add(HookKey::Left(step.into()), f)
    }

    /// Call `f` when a run closes. It receives the step the run closed on.
    pub fn on_closed(&mut self, f: impl FnMut(&Step, &mut TourCommands) + 'static) -> HookHandle {
        self.hooks.add(HookKey::Closed, f)
    }

    /// Attach a doable to step `step`.
    ///
    /// Without a guard [`can_do_it`](Self::can_do_it) stays `false`.
    pub fn attach_doable(
        &mut self,
        step: impl Into<StepId>,
        f: impl FnMut(&Step, &mut TourCommands) + 'static,
    ) -> HookHandle {
        self.hooks.add_doable(step.into(), f, None::<fn(&Step) -> bool>)
    }

    /// Attach a guarded doable to step `step`.
    pub fn attach_doable_if(
        &mut self,
        step: impl Into<StepId>,
        f: impl FnMut(&Step, &mut TourCommands) + 'static,
        guard: impl Fn(&Step) -> bool + 'static,
    ) -> HookHandle {
        self.hooks.add_doable(step.into(), f, Some(guard))
    }

    /// Remove what `handle` registered, unless it was replaced since.
    pub fn release(&mut self, handle: HookHandle) -> bool {
        self.hooks.release(handle)
    }

    /// Remove every hook and doable.
    pub fn clear_hooks(&mut self) {
        self.hooks.clear();
    }

    // Window events

    /// `window` became active. Returns whether the overlay should show.
    ///
    /// A different window runs the current anchor's
    /// [`WindowTransition`](crate::WindowTransition)
    /// policy. The tracked window becoming active again shows the overlay only
    /// if it points at the current anchor and that anchor is on the window.
    ///
    /// The decision is applied to the presenter as well; hosts with their own
    /// popup handling can use the return value instead.
    pub fn window_activated(&mut self, window: WindowId) -> bool {
        let Some(outcome) = self.with_run(|run, env| run.window_activated(window, env)) else {
            return false;
        };
        let show = match outcome {
            TransitionOutcome::Show => {
                self.overlay.show();
                true
            }
            TransitionOutcome::Hide => {
                self.overlay.hide();
                false
            }
            TransitionOutcome::Unchanged => false,
        };
        self.flush_commands();
        show && self.is_active()
    }

    /// `window` lost activation. The overlay sits above every window, so it
    /// is hidden until a window of the application is activated again.
    pub fn window_deactivated(&mut self, window: WindowId) -> bool {
        if self.is_active() {
            tracing::debug!(window = ?window, "window deactivated; hiding overlay");
            self.overlay.hide();
        }
        false
    }

    /// `window` was closed.
    pub fn window_removed(&mut self, window: WindowId) {
        self.resolver.window_removed(window);
    }

    /// A window moved or resized.
    pub fn window_moved(&mut self) {
        if self.is_active() {
            self.overlay.reposition();
        }
    }

    fn flush_commands(&mut self) {
        let mut applied = 0;
        while !self.hooks.commands.is_empty() {
            for command in self.hooks.commands.take() {
                if self.run.is_none() {
                    tracing::debug!(?command, "no active tour; discarding command");
                    continue;
                }
                if applied == MAX_DEFERRED_COMMANDS {
                    tracing::warn!(?command, "too many deferred commands; dropping");
                    continue;
                }
                applied += 1;
                match command {
                    TourCommand::Next => {
                        self.with_run(|run, env| run.next_step(false, env));
                    }
                    TourCommand::Previous => {
                        self.with_run(TourRun::previous_step);
                    }
                    TourCommand::Close => {
                        self.close_run();
                    }
                }
            }
        }
    }
}

/// Navigation handle returned by [`TourSession::if_current_step_equals`].
///
/// Inert unless the run was positioned at the requested step; an inert
/// navigator returns `false` and does nothing.
pub struct TourNavigator<'a, R, W, O> {
    session: Option<&'a mut TourSession<R, W, O>>,
}

impl<R, W, O> fmt::Debug for TourNavigator<'_, R, W, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourNavigator")
            .field("live", &self.session.is_some())
            .finish()
    }
}

impl<R, W, O> TourNavigator<'_, R, W, O>
where
    R: AnchorResolver,
    W: WindowCoordinator,
    O: OverlayPresenter,
{
    /// Whether this navigator does nothing.
    pub fn is_inert(&self) -> bool {
        self.session.is_none()
    }

    /// Move to the next step.
    pub fn go_next(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.next_step())
    }

    /// Move to the previous step.
    pub fn go_previous(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.previous_step())
    }

    /// Close the run.
    pub fn close(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.close())
    }
}
