//! # Sprite Component
//!
//! Presentation bookkeeping for an actor: which animation set it draws
//! from, where the sprite sits relative to the collision box, and which
//! animation key is current. It holds no texture handles itself; the
//! rendering shell looks the key up in its own asset tables, so the core
//! stays window-free and testable.

use crate::game::actor::{ActorEvent, ActorEventKind, Component, ComponentKind};
use crate::game::{ActorId, Direction, Vec2};
use crate::map::scene::SceneCommand;

/// Animation and draw-position state for one actor.
#[derive(Debug)]
pub struct SpriteComponent {
    owner: Option<ActorId>,
    /// Name of the animation set this actor draws from.
    pub animset: String,
    /// Draw offset from the collision box origin, in pixels.
    pub offset: Vec2,
    position: Vec2,
    facing: Direction,
    walking: bool,
}

impl SpriteComponent {
    pub fn new(animset: &str, offset: Vec2) -> Self {
        Self {
            owner: None,
            animset: animset.to_string(),
            offset,
            position: Vec2::ZERO,
            facing: Direction::South,
            walking: false,
        }
    }

    /// Mirrored owner position, kept current by `Moved` events.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Where the sprite is drawn, in pixel space.
    pub fn draw_position(&self) -> Vec2 {
        self.position + self.offset
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    /// The current animation key, `walk_<dir>` or `stand_<dir>`.
    pub fn animation_key(&self) -> String {
        let prefix = if self.walking { "walk_" } else { "stand_" };
        format!("{}{}", prefix, self.facing.as_str())
    }
}

impl Component for SpriteComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Graphics
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    fn subscriptions(&self) -> &'static [ActorEventKind] {
        &[
            ActorEventKind::Moved,
            ActorEventKind::DirectionChanged,
            ActorEventKind::Faced,
        ]
    }

    fn handle_event(&mut self, event: &ActorEvent, _out: &mut Vec<SceneCommand>) {
        match event {
            ActorEvent::Moved { x, y, .. } => {
                self.position = Vec2::new(*x, *y);
            }
            ActorEvent::DirectionChanged { direction } => {
                self.walking = *direction != Vec2::ZERO;
            }
            ActorEvent::Faced { facing } => {
                self.facing = *facing;
            }
            _ => {}
        }
    }
}
