//! Headless renderer that keeps a scene model instead of drawing
//!
//! Used by the native demo run and by tests to observe what the page would
//! show.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Vec2;

use super::{EntityKind, Marker, PlayArea, Renderer, TextSlot};
use crate::error::RenderError;
use crate::sim::EntityId;

/// Scene-side view of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub visible: bool,
    pub markers: HashSet<Marker>,
}

/// Renderer that records the scene in memory
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    play_area: PlayArea,
    entities: BTreeMap<EntityId, SceneEntity>,
    texts: HashMap<TextSlot, String>,
    /// Total entities ever added, by kind
    pub added: HashMap<EntityKind, usize>,
    /// Number of calls that were rejected
    pub failures: usize,
    /// Reject the next N calls with a platform error
    pub fail_next: usize,
}

impl RecordingRenderer {
    pub fn new(play_area: PlayArea) -> Self {
        Self {
            play_area,
            entities: BTreeMap::new(),
            texts: HashMap::new(),
            added: HashMap::new(),
            failures: 0,
            fail_next: 0,
        }
    }

    /// Simulate a layout change
    pub fn set_play_area(&mut self, play_area: PlayArea) {
        self.play_area = play_area;
    }

    pub fn entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    /// Live entities of one kind, in id order
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = (&EntityId, &SceneEntity)> {
        self.entities.iter().filter(move |(_, e)| e.kind == kind)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities_of(kind).count()
    }

    pub fn text(&self, slot: TextSlot) -> Option<&str> {
        self.texts.get(&slot).map(String::as_str)
    }

    fn check(&mut self) -> Result<(), RenderError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            self.failures += 1;
            return Err(RenderError::Platform {
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut SceneEntity, RenderError> {
        self.entities
            .get_mut(&id)
            .ok_or(RenderError::UnknownEntity { id })
    }
}

impl Renderer for RecordingRenderer {
    fn add_entity(&mut self, id: EntityId, kind: EntityKind, pos: Vec2) -> Result<(), RenderError> {
        self.check()?;
        self.entities.insert(
            id,
            SceneEntity {
                kind,
                pos,
                visible: true,
                markers: HashSet::new(),
            },
        );
        *self.added.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<(), RenderError> {
        self.check()?;
        self.entities
            .remove(&id)
            .map(|_| ())
            .ok_or(RenderError::UnknownEntity { id })
    }

    fn set_entity_position(&mut self, id: EntityId, pos: Vec2) -> Result<(), RenderError> {
        self.check()?;
        self.entity_mut(id)?.pos = pos;
        Ok(())
    }

    fn set_entity_visibility(&mut self, id: EntityId, visible: bool) -> Result<(), RenderError> {
        self.check()?;
        self.entity_mut(id)?.visible = visible;
        Ok(())
    }

    fn add_entity_marker(&mut self, id: EntityId, marker: Marker) -> Result<(), RenderError> {
        self.check()?;
        self.entity_mut(id)?.markers.insert(marker);
        Ok(())
    }

    fn remove_entity_marker(&mut self, id: EntityId, marker: Marker) -> Result<(), RenderError> {
        self.check()?;
        self.entity_mut(id)?.markers.remove(&marker);
        Ok(())
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) -> Result<(), RenderError> {
        self.check()?;
        self.texts.insert(slot, text.to_string());
        Ok(())
    }

    fn play_area(&self) -> PlayArea {
        self.play_area
    }
}
