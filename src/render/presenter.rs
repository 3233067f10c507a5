//! Presentation sink
//!
//! The simulation never draws anything itself. Each frame it pushes the
//! appearance of every live entity into a [`Presenter`], which can be a
//! terminal canvas, a game engine binding, or a test recorder.

use std::collections::HashMap;

use hecs::Entity;

use crate::entities::{EntityKind, Facing};
use crate::world::Vec2;

/// Receives per-entity presentation updates
pub trait Presenter {
    /// Called once before any entity of a new frame is pushed
    fn begin_frame(&mut self) {}

    fn set_position(&mut self, entity: Entity, kind: EntityKind, position: Vec2);
    fn set_facing(&mut self, entity: Entity, facing: Facing);
    fn set_opacity(&mut self, entity: Entity, opacity: f32);
    fn set_scale(&mut self, entity: Entity, scale: f32);
}

/// One entity as it should appear on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: EntityKind,
    pub position: Vec2,
    pub facing: Facing,
    pub opacity: f32,
    pub scale: f32,
}

impl Sprite {
    fn new(kind: EntityKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            facing: Facing::Right,
            opacity: 1.0,
            scale: 1.0,
        }
    }
}

/// In-memory presenter that collects the sprites of a single frame
#[derive(Debug, Default)]
pub struct SpriteFrame {
    sprites: HashMap<Entity, Sprite>,
}

impl SpriteFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn get(&self, entity: Entity) -> Option<&Sprite> {
        self.sprites.get(&entity)
    }

    /// Sprites in draw order: clouds at the back, the roamer in front
    pub fn sprites(&self) -> Vec<&Sprite> {
        let mut sprites: Vec<&Sprite> = self.sprites.values().collect();
        sprites.sort_by_key(|s| layer(s.kind));
        sprites
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.sprites.values().filter(|s| s.kind == kind).count()
    }
}

fn layer(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::Star => 0,
        EntityKind::Cloud => 1,
        EntityKind::DroppedItem => 2,
        EntityKind::Bird => 3,
        EntityKind::Roamer => 4,
    }
}

impl Presenter for SpriteFrame {
    fn begin_frame(&mut self) {
        self.sprites.clear();
    }

    fn set_position(&mut self, entity: Entity, kind: EntityKind, position: Vec2) {
        self.sprites
            .entry(entity)
            .and_modify(|s| {
                s.kind = kind;
                s.position = position;
            })
            .or_insert_with(|| Sprite::new(kind, position));
    }

    fn set_facing(&mut self, entity: Entity, facing: Facing) {
        if let Some(sprite) = self.sprites.get_mut(&entity) {
            sprite.facing = facing;
        }
    }

    fn set_opacity(&mut self, entity: Entity, opacity: f32) {
        if let Some(sprite) = self.sprites.get_mut(&entity) {
            sprite.opacity = opacity;
        }
    }

    fn set_scale(&mut self, entity: Entity, scale: f32) {
        if let Some(sprite) = self.sprites.get_mut(&entity) {
            sprite.scale = scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_collects_and_orders_sprites() {
        let mut world = World::new();
        let bird = world.spawn(());
        let cloud = world.spawn(());
        let mut frame = SpriteFrame::new();

        frame.begin_frame();
        frame.set_position(bird, EntityKind::Bird, Vec2::new(1.0, 2.0));
        frame.set_facing(bird, Facing::Left);
        frame.set_position(cloud, EntityKind::Cloud, Vec2::ZERO);
        frame.set_opacity(cloud, 0.25);
        frame.set_scale(cloud, 1.5);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(bird).unwrap().facing, Facing::Left);
        let c = frame.get(cloud).unwrap();
        assert_eq!((c.opacity, c.scale), (0.25, 1.5));

        let kinds: Vec<EntityKind> = frame.sprites().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Cloud, EntityKind::Bird]);
    }

    #[test]
    fn test_setters_ignore_unknown_entities() {
        let mut world = World::new();
        let ghost = world.spawn(());
        let mut frame = SpriteFrame::new();

        frame.set_opacity(ghost, 0.5);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_begin_frame_clears() {
        let mut world = World::new();
        let star = world.spawn(());
        let mut frame = SpriteFrame::new();

        frame.set_position(star, EntityKind::Star, Vec2::ZERO);
        frame.begin_frame();
        assert_eq!(frame.count(EntityKind::Star), 0);
    }
}
