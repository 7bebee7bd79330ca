//! Rendering seam
//!
//! The simulation never touches presentation. It queues [`RenderCommand`]s
//! while it mutates state, and the session flushes them into a [`Renderer`]
//! once the frame's state is committed.

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod recording;

#[cfg(target_arch = "wasm32")]
pub use dom::DomRenderer;
pub use recording::RecordingRenderer;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::sim::EntityId;

/// What kind of visual an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Obstacle,
    Explosion,
}

impl EntityKind {
    /// CSS class used by the page stylesheet
    pub fn css_class(&self) -> &'static str {
        match self {
            EntityKind::Player => "spaceship",
            EntityKind::Obstacle => "asteroid",
            EntityKind::Explosion => "explosion",
        }
    }
}

/// Decorations toggled on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// Flashing post-respawn shield
    Invincible,
}

impl Marker {
    pub fn css_class(&self) -> &'static str {
        match self {
            Marker::Invincible => "invincible",
        }
    }
}

/// HUD text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextSlot {
    Timer,
    BestTime,
}

/// Play-area rectangle in client (page) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Client point strictly inside the rectangle (edges excluded)
    pub fn contains_strict(&self, client: Vec2) -> bool {
        client.x > self.left && client.x < self.right() && client.y > self.top && client.y < self.bottom()
    }

    /// Convert a client point to play-area-local coordinates
    #[inline]
    pub fn to_local(&self, client: Vec2) -> Vec2 {
        client - Vec2::new(self.left, self.top)
    }

    #[inline]
    pub fn center_local(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Presentation collaborator. Positions are play-area-local.
pub trait Renderer {
    fn add_entity(&mut self, id: EntityId, kind: EntityKind, pos: Vec2) -> Result<(), RenderError>;
    fn remove_entity(&mut self, id: EntityId) -> Result<(), RenderError>;
    fn set_entity_position(&mut self, id: EntityId, pos: Vec2) -> Result<(), RenderError>;
    fn set_entity_visibility(&mut self, id: EntityId, visible: bool) -> Result<(), RenderError>;
    fn add_entity_marker(&mut self, id: EntityId, marker: Marker) -> Result<(), RenderError>;
    fn remove_entity_marker(&mut self, id: EntityId, marker: Marker) -> Result<(), RenderError>;
    fn set_text(&mut self, slot: TextSlot, text: &str) -> Result<(), RenderError>;

    /// Current play-area bounds (the only layout state the core reads)
    fn play_area(&self) -> PlayArea;
}

/// A deferred renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Add { id: EntityId, kind: EntityKind, pos: Vec2 },
    Remove { id: EntityId },
    Move { id: EntityId, pos: Vec2 },
    Visibility { id: EntityId, visible: bool },
    AddMarker { id: EntityId, marker: Marker },
    RemoveMarker { id: EntityId, marker: Marker },
    Text { slot: TextSlot, text: String },
}

impl RenderCommand {
    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<(), RenderError> {
        match self {
            RenderCommand::Add { id, kind, pos } => renderer.add_entity(*id, *kind, *pos),
            RenderCommand::Remove { id } => renderer.remove_entity(*id),
            RenderCommand::Move { id, pos } => renderer.set_entity_position(*id, *pos),
            RenderCommand::Visibility { id, visible } => {
                renderer.set_entity_visibility(*id, *visible)
            }
            RenderCommand::AddMarker { id, marker } => renderer.add_entity_marker(*id, *marker),
            RenderCommand::RemoveMarker { id, marker } => {
                renderer.remove_entity_marker(*id, *marker)
            }
            RenderCommand::Text { slot, text } => renderer.set_text(*slot, text),
        }
    }
}

/// Apply every queued command. A failing command does not stop the rest;
/// the first error is returned so the host can log it.
pub fn flush<R: Renderer + ?Sized>(
    commands: &mut Vec<RenderCommand>,
    renderer: &mut R,
) -> Result<(), RenderError> {
    let mut first_err = None;
    for command in commands.drain(..) {
        if let Err(e) = command.apply(renderer) {
            log::warn!("Render command {:?} failed: {}", command, e);
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
