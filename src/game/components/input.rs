//! # Input Component
//!
//! Steering intents for actors, from the keyboard or from AI.
//!
//! The component only produces a direction vector each tick; the physics
//! component turns that into movement. Keyboard state is held as a set of
//! pressed keys and recomputed, never accumulated, so clearing it (when a
//! dialog opens, say) can never leave a phantom held direction behind.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::actor::{Actor, Component, ComponentKind};
use crate::game::{ActorId, Vec2};
use crate::input::Key;
use crate::map::layer::ActorLayer;

/// Keyboard-driven steering.
#[derive(Debug)]
pub struct HumanInput {
    owner: Option<ActorId>,
    held: HashSet<Key>,
}

impl Default for HumanInput {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanInput {
    pub fn new() -> Self {
        Self {
            owner: None,
            held: HashSet::new(),
        }
    }

    pub fn press(&mut self, key: Key) {
        if key.movement().is_some() {
            self.held.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Drops all held keys.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Direction intent from the currently held keys, each axis clamped
    /// to [-1, 1] so opposing keys cancel.
    pub fn direction(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        for key in &self.held {
            if let Some(m) = key.movement() {
                v = v + m;
            }
        }
        Vec2::new(v.x.clamp(-1.0, 1.0), v.y.clamp(-1.0, 1.0))
    }
}

/// Follow-the-target steering with idle wandering.
///
/// With a follow target the AI moves one step-sign per axis toward it,
/// standing still inside a small dead zone so it does not jitter on top
/// of the target. Without one it wanders: every second or two it picks a
/// random cardinal direction or stops.
#[derive(Debug)]
pub struct FollowAi {
    owner: Option<ActorId>,
    /// Name of the actor to follow, if any.
    pub follow: Option<String>,
    /// Half-width of the stand-still band around the target, in pixels.
    pub dead_zone: f32,
    rng: StdRng,
    wander: Vec2,
    wander_timer: f32,
}

impl FollowAi {
    pub fn new(seed: u64, follow: Option<String>) -> Self {
        Self {
            owner: None,
            follow,
            dead_zone: 4.0,
            rng: StdRng::seed_from_u64(seed),
            wander: Vec2::ZERO,
            wander_timer: 0.0,
        }
    }

    fn steering(&mut self, owner: &Actor, others: &ActorLayer, dt: f32) -> Vec2 {
        if let Some(name) = &self.follow {
            if let Ok(target) = others.get_actor(name) {
                let delta = target.position() - owner.position();
                let axis = |d: f32| {
                    if d > self.dead_zone {
                        1.0
                    } else if d < -self.dead_zone {
                        -1.0
                    } else {
                        0.0
                    }
                };
                return Vec2::new(axis(delta.x), axis(delta.y));
            }
        }

        // No target on this map: wander
        self.wander_timer -= dt;
        if self.wander_timer <= 0.0 {
            self.wander_timer = self.rng.gen_range(1.0..2.5);
            self.wander = if self.rng.gen_bool(0.5) {
                Vec2::ZERO
            } else {
                match self.rng.gen_range(0..4) {
                    0 => Vec2::new(0.0, -1.0),
                    1 => Vec2::new(0.0, 1.0),
                    2 => Vec2::new(1.0, 0.0),
                    _ => Vec2::new(-1.0, 0.0),
                }
            };
        }
        self.wander
    }
}

/// The input slot: exactly one of the steering sources.
#[derive(Debug)]
pub enum InputComponent {
    Human(HumanInput),
    Ai(FollowAi),
}

impl InputComponent {
    pub fn human() -> Self {
        InputComponent::Human(HumanInput::new())
    }

    /// Forwards a key press to a human source; no-op for AI.
    pub fn press(&mut self, key: Key) {
        if let InputComponent::Human(h) = self {
            h.press(key);
        }
    }

    /// Forwards a key release to a human source; no-op for AI.
    pub fn release(&mut self, key: Key) {
        if let InputComponent::Human(h) = self {
            h.release(key);
        }
    }

    /// Drops any held state so a suspended actor cannot keep moving on
    /// stale input.
    pub fn clear(&mut self) {
        match self {
            InputComponent::Human(h) => h.clear(),
            InputComponent::Ai(ai) => {
                ai.wander = Vec2::ZERO;
                ai.wander_timer = 0.0;
            }
        }
    }

    /// Direction intent for this tick.
    pub fn steering(&mut self, owner: &Actor, others: &ActorLayer, dt: f32) -> Vec2 {
        match self {
            InputComponent::Human(h) => h.direction(),
            InputComponent::Ai(ai) => ai.steering(owner, others, dt),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, InputComponent::Human(_))
    }
}

impl Component for InputComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Input
    }

    fn owner(&self) -> Option<ActorId> {
        match self {
            InputComponent::Human(h) => h.owner,
            InputComponent::Ai(ai) => ai.owner,
        }
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        match self {
            InputComponent::Human(h) => h.owner = owner,
            InputComponent::Ai(ai) => ai.owner = owner,
        }
    }

    fn on_refresh(&mut self) {
        self.clear();
    }

    fn on_detach(&mut self) {
        self.clear();
    }
}
