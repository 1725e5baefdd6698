// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tour definitions: the ordered steps a run walks through.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::error::TourError;
use crate::types::{AnchorId, StepId};

/// One stop of a tour, bound to a UI anchor.
///
/// `header` and `content` are opaque display text; the template keys let a
/// presenter pick a custom view for them. Payloads that are not text go in
/// `tag`, which carries arbitrary host data; a custom
/// [`ViewModel`](crate::ViewModel) sees the whole step in
/// [`step_changed`](crate::ViewModel::step_changed) and can pick it up there.
/// The tour never interprets any of these.
#[derive(Clone)]
pub struct Step {
    /// Identity used to key hooks and doables.
    pub id: StepId,
    /// The anchor this step points at.
    pub anchor: AnchorId,
    /// Header text.
    pub header: String,
    /// Body text.
    pub content: String,
    /// Opaque host data.
    pub tag: Option<Rc<dyn Any>>,
    /// Per-step override of [`Tour::show_next_button_default`].
    pub show_next_button: Option<bool>,
    /// Key of a presenter template for the header.
    pub header_template: Option<String>,
    /// Key of a presenter template for the content.
    pub content_template: Option<String>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("anchor", &self.anchor)
            .field("header", &self.header)
            .field("content", &self.content)
            .field("tag", &self.tag.as_ref().map(|_| "..."))
            .field("show_next_button", &self.show_next_button)
            .field("header_template", &self.header_template)
            .field("content_template", &self.content_template)
            .finish()
    }
}

impl Step {
    /// Create a step `id` anchored at `anchor`, with empty text.
    pub fn new(id: impl Into<StepId>, anchor: impl Into<AnchorId>) -> Self {
        Self {
            id: id.into(),
            anchor: anchor.into(),
            header: String::new(),
            content: String::new(),
            tag: None,
            show_next_button: None,
            header_template: None,
            content_template: None,
        }
    }

    /// Set the header text.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the body text.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Attach opaque host data.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Any) -> Self {
        self.tag = Some(Rc::new(tag));
        self
    }

    /// Override whether the Next button shows for this step.
    #[must_use]
    pub fn with_show_next_button(mut self, show: bool) -> Self {
        self.show_next_button = Some(show);
        self
    }

    /// Use a custom header template.
    #[must_use]
    pub fn with_header_template(mut self, key: impl Into<String>) -> Self {
        self.header_template = Some(key.into());
        self
    }

    /// Use a custom content template.
    #[must_use]
    pub fn with_content_template(mut self, key: impl Into<String>) -> Self {
        self.content_template = Some(key.into());
        self
    }

    /// Downcast the tag to a concrete type.
    pub fn tag<T: Any>(&self) -> Option<&T> {
        self.tag.as_deref()?.downcast_ref()
    }
}

/// An ordered sequence of steps.
///
/// A tour is handed to [`TourSession::start`](crate::TourSession::start) by
/// value and is consumed by exactly one run.
#[derive(Clone, Debug)]
pub struct Tour {
    /// Display name, used in diagnostics.
    pub name: String,
    /// The steps, in order.
    pub steps: Vec<Step>,
    /// Whether the Next button shows for steps without an override.
    pub show_next_button_default: bool,
    /// Enable forward/backward navigation regardless of anchor availability.
    pub enable_next_button_always: bool,
}

impl Tour {
    /// Create an empty tour named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            show_next_button_default: true,
            enable_next_button_always: false,
        }
    }

    /// Append a step.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps.
    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Set [`Tour::show_next_button_default`].
    #[must_use]
    pub fn with_show_next_button_default(mut self, show: bool) -> Self {
        self.show_next_button_default = show;
        self
    }

    /// Set [`Tour::enable_next_button_always`].
    #[must_use]
    pub fn with_next_button_always_enabled(mut self, enabled: bool) -> Self {
        self.enable_next_button_always = enabled;
        self
    }

    /// Check that the tour can be run.
    ///
    /// A tour needs at least one step, and every step needs a non-empty id and
    /// anchor id.
    pub fn validate(&self) -> Result<(), TourError> {
        if self.steps.is_empty() {
            return Err(TourError::NoSteps {
                tour: self.name.clone(),
            });
        }
        for (i, step) in self.steps.iter().enumerate() {
            if step.id.is_empty() {
                return Err(TourError::EmptyStepId {
                    tour: self.name.clone(),
                    step_no: i + 1,
                });
            }
            if step.anchor.is_empty() {
                return Err(TourError::EmptyAnchorId {
                    tour: self.name.clone(),
                    step_no: i + 1,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tour_is_rejected() {
        let tour = Tour::new("empty");
        assert_eq!(
            tour.validate(),
            Err(TourError::NoSteps {
                tour: String::from("empty")
            })
        );
    }

    #[test]
    fn empty_ids_are_rejected_with_position() {
        let tour = Tour::new("t")
            .with_step(Step::new("a", "anchor_a"))
            .with_step(Step::new("b", ""));
        assert_eq!(
            tour.validate(),
            Err(TourError::EmptyAnchorId {
                tour: String::from("t"),
                step_no: 2
            })
        );

        let tour = Tour::new("t").with_step(Step::new("", "anchor"));
        assert!(matches!(
            tour.validate(),
            Err(TourError::EmptyStepId { step_no: 1, .. })
        ));
    }

    #[test]
    fn tags_downcast() {
        let step = Step::new("a", "anchor").with_tag(7_u32);
        assert_eq!(step.tag::<u32>(), Some(&7));
        assert_eq!(step.tag::<i64>(), None);
        assert_eq!(Step::new("b", "anchor").tag::<u32>(), None);
    }

    #[test]
    fn rich_content_travels_in_the_tag() {
        #[derive(Debug, PartialEq)]
        struct Illustration {
            width: u32,
            height: u32,
        }

        let step = Step::new("a", "anchor")
            .with_content("See the picture.")
            .with_content_template("illustrated")
            .with_tag(Illustration {
                width: 64,
                height: 32,
            });
        let copy = step.clone();
        assert_eq!(
            copy.tag::<Illustration>(),
            Some(&Illustration {
                width: 64,
                height: 32
            })
        );
        assert_eq!(copy.content_template.as_deref(), Some("illustrated"));
    }
}
