//! Pointer and keyboard interaction state machine.
//!
//! The [`InteractionController`] consumes toolkit-neutral [`InputEvent`]s
//! and tracks three independent axes:
//!
//! - **Hover**: which node, if any, is under the pointer.
//! - **Edit**: which node's label is being edited and the pending text.
//! - **Gesture**: whether a node is pressed or the canvas is being panned.
//!
//! Hit-testing goes through the viewport's inverse transform so it works at
//! any zoom or pan. Every event is accepted in every state; `Cancel` always
//! leaves edit mode and [`InteractionController::reset`] returns every axis
//! to idle.

use log::debug;

use tessera_core::{geometry::Point, model::DiagramData};

use crate::{layout::Layout, viewport::Viewport};

/// Maximum pointer travel, in screen pixels, for a press and release to
/// count as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Backspace,
}

/// Input delivered by the host toolkit. Positions are in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    PointerLeave,
    /// Scroll wheel; negative `delta_y` zooms in.
    Wheel {
        position: Point,
        delta_y: f32,
    },
    /// Typed text, appended to the pending label.
    Text(String),
    Key(Key),
    Commit,
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        node_id: String,
        pending_text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer is down on a node and has not moved beyond the click slop.
    Pressed { node_id: String, origin: Point },
    Panning { last: Point },
}

/// Effects of an event the caller may need to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    HoverChanged(Option<String>),
    EditStarted(String),
    EditCancelled(String),
    /// The user confirmed a label edit. Emitted once per edit session.
    LabelCommitted {
        node_id: String,
        text: String,
    },
    ViewportChanged,
}

/// Interaction state for one diagram view.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    hover: HoverState,
    edit: EditState,
    gesture: GestureState,
    tooltip_anchor: Option<Point>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn edit(&self) -> &EditState {
        &self.edit
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn hovered_node(&self) -> Option<&str> {
        match &self.hover {
            HoverState::Hovering(node_id) => Some(node_id),
            HoverState::Idle => None,
        }
    }

    /// The node being edited and its pending text.
    pub fn editing(&self) -> Option<(&str, &str)> {
        match &self.edit {
            EditState::Editing {
                node_id,
                pending_text,
            } => Some((node_id, pending_text)),
            EditState::Idle => None,
        }
    }

    /// Screen position for the tooltip, present while a node is hovered.
    pub fn tooltip_anchor(&self) -> Option<Point> {
        self.tooltip_anchor
    }

    /// Returns every axis to idle without emitting outcomes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies one event.
    ///
    /// `layout` and `viewport` must describe what is currently on screen;
    /// `data` supplies the initial text of a label edit.
    pub fn handle_event(
        &mut self,
        event: InputEvent,
        layout: &Layout,
        data: &DiagramData,
        viewport: &mut Viewport,
    ) -> Vec<Outcome> {
        let mut outcomes = Vec::new();

        match event {
            InputEvent::PointerMove(position) => {
                match &mut self.gesture {
                    GestureState::Panning { last } => {
                        viewport.pan_by(position.sub_point(*last));
                        *last = position;
                        outcomes.push(Outcome::ViewportChanged);
                    }
                    GestureState::Pressed { origin, .. } => {
                        let delta = position.sub_point(*origin);
                        if delta.hypot() > CLICK_SLOP {
                            viewport.pan_by(delta);
                            self.gesture = GestureState::Panning { last: position };
                            outcomes.push(Outcome::ViewportChanged);
                        }
                    }
                    GestureState::Idle => {}
                }
                self.update_hover(position, layout, viewport, &mut outcomes);
            }
            InputEvent::PointerDown(position) => {
                let target = Self::hit(position, layout, viewport);

                // Pressing anywhere but the node being edited cancels the edit
                let editing_target = matches!(
                    (&self.edit, &target),
                    (EditState::Editing { node_id, .. }, Some(hit)) if node_id == hit
                );
                if !editing_target {
                    self.cancel_edit(&mut outcomes);
                }

                self.gesture = match target {
                    Some(node_id) => GestureState::Pressed {
                        node_id,
                        origin: position,
                    },
                    None => GestureState::Panning { last: position },
                };
                self.update_hover(position, layout, viewport, &mut outcomes);
            }
            InputEvent::PointerUp(position) => {
                let gesture = std::mem::take(&mut self.gesture);
                if let GestureState::Pressed { node_id, origin } = gesture {
                    let released_on = Self::hit(position, layout, viewport);
                    let is_click = released_on.as_deref() == Some(node_id.as_str())
                        && position.sub_point(origin).hypot() <= CLICK_SLOP;
                    if is_click {
                        self.start_edit(node_id, data, &mut outcomes);
                    }
                }
                self.update_hover(position, layout, viewport, &mut outcomes);
            }
            InputEvent::PointerLeave => {
                self.gesture = GestureState::Idle;
                self.tooltip_anchor = None;
                if self.hover != HoverState::Idle {
                    self.hover = HoverState::Idle;
                    outcomes.push(Outcome::HoverChanged(None));
                }
            }
            InputEvent::Wheel { position, delta_y } => {
                let changed = if delta_y < 0.0 {
                    viewport.zoom_in(Some(position))
                } else if delta_y > 0.0 {
                    viewport.zoom_out(Some(position))
                } else {
                    false
                };
                if changed {
                    outcomes.push(Outcome::ViewportChanged);
                }
                self.update_hover(position, layout, viewport, &mut outcomes);
            }
            InputEvent::Text(text) => {
                if let EditState::Editing { pending_text, .. } = &mut self.edit {
                    pending_text.extend(text.chars().filter(|c| !c.is_control()));
                }
            }
            InputEvent::Key(Key::Backspace) => {
                if let EditState::Editing { pending_text, .. } = &mut self.edit {
                    pending_text.pop();
                }
            }
            InputEvent::Key(Key::Enter) => match (&self.edit, &self.hover) {
                (EditState::Editing { .. }, _) => self.commit_edit(&mut outcomes),
                (EditState::Idle, HoverState::Hovering(node_id)) => {
                    let node_id = node_id.clone();
                    self.start_edit(node_id, data, &mut outcomes);
                }
                (EditState::Idle, HoverState::Idle) => {}
            },
            InputEvent::Commit => self.commit_edit(&mut outcomes),
            InputEvent::Key(Key::Escape) | InputEvent::Cancel => self.cancel_edit(&mut outcomes),
        }

        outcomes
    }

    fn hit(position: Point, layout: &Layout, viewport: &Viewport) -> Option<String> {
        layout
            .hit_test(viewport.screen_to_world(position))
            .map(str::to_string)
    }

    fn update_hover(
        &mut self,
        position: Point,
        layout: &Layout,
        viewport: &Viewport,
        outcomes: &mut Vec<Outcome>,
    ) {
        let hover = match Self::hit(position, layout, viewport) {
            Some(node_id) => HoverState::Hovering(node_id),
            None => HoverState::Idle,
        };
        self.tooltip_anchor = matches!(hover, HoverState::Hovering(_)).then_some(position);

        if hover != self.hover {
            debug!(from:? = self.hover, to:? = hover; "Hover changed");
            self.hover = hover;
            outcomes.push(Outcome::HoverChanged(self.hovered_node().map(str::to_string)));
        }
    }

    fn start_edit(&mut self, node_id: String, data: &DiagramData, outcomes: &mut Vec<Outcome>) {
        if self.editing().is_some_and(|(editing, _)| editing == node_id) {
            return;
        }
        self.cancel_edit(outcomes);

        let pending_text = data
            .node(&node_id)
            .map(|node| node.label().to_string())
            .unwrap_or_default();
        debug!(node_id = node_id.as_str(); "Label edit started");
        outcomes.push(Outcome::EditStarted(node_id.clone()));
        self.edit = EditState::Editing {
            node_id,
            pending_text,
        };
    }

    fn commit_edit(&mut self, outcomes: &mut Vec<Outcome>) {
        if let EditState::Editing {
            node_id,
            pending_text,
        } = std::mem::take(&mut self.edit)
        {
            debug!(node_id = node_id.as_str(); "Label edit committed");
            outcomes.push(Outcome::LabelCommitted {
                node_id,
                text: pending_text,
            });
        }
    }

    fn cancel_edit(&mut self, outcomes: &mut Vec<Outcome>) {
        if let EditState::Editing { node_id, .. } = std::mem::take(&mut self.edit) {
            debug!(node_id = node_id.as_str(); "Label edit cancelled");
            outcomes.push(Outcome::EditCancelled(node_id));
        }
    }
}
