//! # Sound Component
//!
//! Turns actor events into sound cues. The component never plays audio
//! itself; it emits [`SceneCommand::PlaySound`] and the shell decides what
//! a cue sounds like. A short cooldown keeps a player grinding along a
//! wall from machine-gunning the bump sound every tick.

use crate::config;
use crate::game::actor::{ActorEvent, ActorEventKind, Component, ComponentKind};
use crate::game::ActorId;
use crate::map::scene::SceneCommand;

/// Logical sound effects the engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// An actor ran into something.
    Bump,
}

/// Emits sound cues in response to actor events.
#[derive(Debug)]
pub struct SoundComponent {
    owner: Option<ActorId>,
    bump_cooldown: f32,
}

impl Default for SoundComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundComponent {
    pub fn new() -> Self {
        Self {
            owner: None,
            bump_cooldown: 0.0,
        }
    }

    /// Advances cooldown timers by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.bump_cooldown = (self.bump_cooldown - dt).max(0.0);
    }
}

impl Component for SoundComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Sound
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    fn subscriptions(&self) -> &'static [ActorEventKind] {
        &[ActorEventKind::Collision]
    }

    fn on_refresh(&mut self) {
        self.bump_cooldown = 0.0;
    }

    fn handle_event(&mut self, event: &ActorEvent, out: &mut Vec<SceneCommand>) {
        if let ActorEvent::Collision { .. } = event {
            if self.bump_cooldown == 0.0 {
                self.bump_cooldown = config::BUMP_COOLDOWN;
                out.push(SceneCommand::PlaySound(SoundCue::Bump));
            }
        }
    }
}
