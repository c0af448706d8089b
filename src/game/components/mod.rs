//! # Components
//!
//! Concrete component implementations. Each does one thing: keyboard/AI
//! steering, movement and collision, sprite animation bookkeeping, sound
//! cues, dialog text, region triggers, and the interaction probe.

pub mod dialog;
pub mod input;
pub mod physics;
pub mod sound;
pub mod sprite;
pub mod trigger;

pub use dialog::{DialogComponent, InteractionComponent};
pub use input::{FollowAi, HumanInput, InputComponent};
pub use physics::PhysicsComponent;
pub use sound::{SoundComponent, SoundCue};
pub use sprite::SpriteComponent;
pub use trigger::{TriggerAction, TriggerComponent};
