//! DOM renderer (WASM only)
//!
//! Drives the page's existing markup: `#game-area` holds the falling
//! asteroids and explosions, `#spaceship` is the player, `#timer` and
//! `#best-time` are the HUD lines. Positions are written verbatim to
//! `left`/`top`; the stylesheet is responsible for centring the ship and
//! explosion sprites on that point.

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::{EntityKind, Marker, PlayArea, Renderer, TextSlot};
use crate::error::RenderError;
use crate::sim::{EntityId, PLAYER_ID};

/// Renderer backed by absolutely positioned `div`s
pub struct DomRenderer {
    document: Document,
    game_area: HtmlElement,
    spaceship: HtmlElement,
    timer: HtmlElement,
    best_time: HtmlElement,
    /// Obstacle and explosion elements created by this renderer
    elements: HashMap<EntityId, HtmlElement>,
}

impl DomRenderer {
    /// Bind to the page. Fails if any required element is missing.
    pub fn new() -> Result<Self, RenderError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderError::Platform {
                message: "no document".to_string(),
            })?;

        Ok(Self {
            game_area: lookup(&document, "game-area")?,
            spaceship: lookup(&document, "spaceship")?,
            timer: lookup(&document, "timer")?,
            best_time: lookup(&document, "best-time")?,
            document,
            elements: HashMap::new(),
        })
    }

    fn element(&self, id: EntityId) -> Result<&HtmlElement, RenderError> {
        if id == PLAYER_ID {
            return Ok(&self.spaceship);
        }
        self.elements
            .get(&id)
            .ok_or(RenderError::UnknownEntity { id })
    }

    fn create_sprite(&self, kind: EntityKind) -> Result<HtmlElement, RenderError> {
        let el = self
            .document
            .create_element("div")
            .map_err(platform_err)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| RenderError::Platform {
                message: "created element is not an HtmlElement".to_string(),
            })?;
        el.class_list()
            .add_1(kind.css_class())
            .map_err(platform_err)?;
        self.game_area.append_child(&el).map_err(platform_err)?;
        Ok(el)
    }
}

impl Renderer for DomRenderer {
    fn add_entity(&mut self, id: EntityId, kind: EntityKind, pos: Vec2) -> Result<(), RenderError> {
        if kind == EntityKind::Player {
            return place(&self.spaceship, pos);
        }
        let el = self.create_sprite(kind)?;
        place(&el, pos)?;
        if let Some(old) = self.elements.insert(id, el) {
            old.remove();
        }
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<(), RenderError> {
        if id == PLAYER_ID {
            // The ship is part of the page; hide it rather than delete it
            return set_display(&self.spaceship, false);
        }
        let el = self
            .elements
            .remove(&id)
            .ok_or(RenderError::UnknownEntity { id })?;
        el.remove();
        Ok(())
    }

    fn set_entity_position(&mut self, id: EntityId, pos: Vec2) -> Result<(), RenderError> {
        place(self.element(id)?, pos)
    }

    fn set_entity_visibility(&mut self, id: EntityId, visible: bool) -> Result<(), RenderError> {
        set_display(self.element(id)?, visible)
    }

    fn add_entity_marker(&mut self, id: EntityId, marker: Marker) -> Result<(), RenderError> {
        self.element(id)?
            .class_list()
            .add_1(marker.css_class())
            .map_err(platform_err)
    }

    fn remove_entity_marker(&mut self, id: EntityId, marker: Marker) -> Result<(), RenderError> {
        self.element(id)?
            .class_list()
            .remove_1(marker.css_class())
            .map_err(platform_err)
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) -> Result<(), RenderError> {
        let el = match slot {
            TextSlot::Timer => &self.timer,
            TextSlot::BestTime => &self.best_time,
        };
        el.set_text_content(Some(text));
        Ok(())
    }

    fn play_area(&self) -> PlayArea {
        let rect = self.game_area.get_bounding_client_rect();
        PlayArea::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }
}

fn lookup(document: &Document, id: &str) -> Result<HtmlElement, RenderError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| RenderError::MissingElement {
            selector: format!("#{}", id),
        })
}

fn place(el: &HtmlElement, pos: Vec2) -> Result<(), RenderError> {
    let style = el.style();
    style
        .set_property("left", &format!("{}px", pos.x))
        .map_err(platform_err)?;
    style
        .set_property("top", &format!("{}px", pos.y))
        .map_err(platform_err)
}

fn set_display(el: &HtmlElement, visible: bool) -> Result<(), RenderError> {
    el.style()
        .set_property("display", if visible { "block" } else { "none" })
        .map_err(platform_err)
}

fn platform_err(e: wasm_bindgen::JsValue) -> RenderError {
    RenderError::Platform {
        message: format!("{:?}", e),
    }
}
