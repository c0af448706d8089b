//! # Physics Component
//!
//! Velocity integration with axis-separated collision resolution.
//!
//! Each tick the component integrates its direction vector into a desired
//! displacement, then resolves the X and Y axes independently against the
//! solid-tile grid and against other collidable actors. Resolving per
//! axis (rather than on the combined vector) is what lets an actor slide
//! along a wall instead of stopping dead on a diagonal input.
//!
//! A blocked axis settles at the furthest whole-pixel position that does
//! not overlap the obstruction, so an actor caps out flush against a wall
//! rather than rejecting the whole move. Positions are truncated to the
//! integer pixel grid after every step to keep tile alignment free of
//! sub-pixel jitter.

use crate::config;
use crate::game::actor::{Actor, ActorEvent, ActorEventKind, Component, ComponentKind};
use crate::game::{ActorId, Rect, Vec2};
use crate::map::collision::CollisionMap;
use crate::map::layer::ActorLayer;

/// Movement and collision for one actor.
#[derive(Debug)]
pub struct PhysicsComponent {
    owner: Option<ActorId>,
    direction: Vec2,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Whether this actor participates in collision at all. When false it
    /// passes through walls and other actors, and they through it.
    pub collidable: bool,
    /// Per-axis displacement cap per tick, in pixels. None disables it.
    pub step_cap: Option<f32>,
}

impl PhysicsComponent {
    /// Creates a physics component with the default anti-tunneling step
    /// cap.
    pub fn new(speed: f32) -> Self {
        Self {
            owner: None,
            direction: Vec2::ZERO,
            speed,
            collidable: true,
            step_cap: Some(config::STEP_CAP),
        }
    }

    /// Current direction intent (not scaled by speed).
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Current velocity in pixels per second. Diagonal intents are
    /// normalized so diagonal movement is no faster than cardinal.
    pub fn velocity(&self) -> Vec2 {
        self.direction.normalized() * self.speed
    }

    /// Updates the direction intent, queueing a `DirectionChanged` event
    /// when it actually changes.
    pub fn set_direction(&mut self, direction: Vec2, events: &mut Vec<ActorEvent>) {
        if self.direction != direction {
            self.direction = direction;
            events.push(ActorEvent::DirectionChanged { direction });
        }
    }

    /// Runs one movement tick for `owner`. The owner has been taken out of
    /// `actors`, so self-collision cannot occur.
    ///
    /// Zero velocity skips every collision test: a stationary actor
    /// teleported inside a wall stays put until it tries to move.
    pub fn step(&mut self, dt: f32, owner: &mut Actor, map: &CollisionMap, actors: &ActorLayer) {
        let velocity = self.velocity();
        if velocity == Vec2::ZERO {
            return;
        }

        let mut dx = velocity.x * dt;
        let mut dy = velocity.y * dt;
        if let Some(cap) = self.step_cap {
            dx = dx.clamp(-cap, cap);
            dy = dy.clamp(-cap, cap);
        }

        let rect = owner.rect();
        let collidable = self.collidable;
        let blocked = |candidate: &Rect| {
            collidable && (map.is_blocked(candidate) || actors.blocks_region(candidate))
        };

        let (new_x, hit_x) = resolve_axis(rect.x, dx, |x| {
            blocked(&Rect::new(x, rect.y, rect.width, rect.height))
        });
        // The Y probe uses the already-resolved X so corner hits behave
        // like the X move happened first.
        let (new_y, hit_y) = resolve_axis(rect.y, dy, |y| {
            blocked(&Rect::new(new_x, y, rect.width, rect.height))
        });

        owner.set_position(new_x, new_y);

        if hit_x || hit_y {
            owner.push_event(ActorEvent::Collision {
                collided_x: hit_x,
                collided_y: hit_y,
            });
        }
    }
}

/// Resolves movement along one axis. Returns the settled coordinate and
/// whether the move was obstructed.
///
/// The target coordinate is truncated to the pixel grid first; if it is
/// blocked, the position walks back one pixel at a time toward the start
/// until it clears, settling the mover flush against the obstruction.
fn resolve_axis(start: f32, delta: f32, blocked_at: impl Fn(f32) -> bool) -> (f32, bool) {
    if delta == 0.0 {
        return (start, false);
    }
    let target = (start + delta).trunc();
    if !blocked_at(target) {
        return (target, false);
    }
    let step = delta.signum();
    let mut pos = target - step;
    while (pos - start) * step > 0.0 {
        if !blocked_at(pos) {
            return (pos, true);
        }
        pos -= step;
    }
    (start, true)
}

impl Component for PhysicsComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Physics
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    fn subscriptions(&self) -> &'static [ActorEventKind] {
        &[]
    }
}
