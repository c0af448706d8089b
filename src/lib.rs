//! # Greenwood
//!
//! A 2D tile-based action RPG engine built around a component-composed
//! actor runtime.
//!
//! ## Architecture Overview
//!
//! Greenwood is organized around a handful of cooperating systems:
//!
//! - **Actors and Components**: every map entity is an [`Actor`] assembled
//!   from single-responsibility components (input, physics, graphics,
//!   sound, dialog, trigger, interaction)
//! - **Map Scenes**: a [`MapScene`] owns the tile layers, the solid-tile
//!   collision grid, the actor layer, and a stack of exclusive input
//!   states (walkaround, dialog, cinematic)
//! - **Tick Pipeline**: one `update(dt)` call per frame steers inputs,
//!   integrates physics with axis-separated collision, diffs trigger
//!   regions, and dispatches the resulting actor events
//! - **Map Loading**: scenes are produced from serde-decoded map
//!   definitions through a string-keyed actor factory registry
//! - **Rendering Shell**: a thin macroquad layer that draws the scene and
//!   translates key codes; the core never reads from it
//!
//! The simulation is single threaded and deterministic for a given input
//! sequence, which keeps every system testable without a window.

pub mod game;
pub mod input;
pub mod map;
pub mod rendering;
pub mod runtime;

pub use game::actor::{
    Actor, ActorEvent, ActorEventKind, Component, ComponentKind, ConcreteComponent,
};
pub use game::components::{
    DialogComponent, FollowAi, HumanInput, InputComponent, InteractionComponent, PhysicsComponent,
    SoundComponent, SoundCue, SpriteComponent, TriggerAction, TriggerComponent,
};
pub use game::{new_actor_id, ActorId, Direction, Rect, Vec2};
pub use input::{InputEvent, Key};
pub use map::collision::{Cell, CollisionMap};
pub use map::layer::ActorLayer;
pub use map::loader::{
    make_player, ActorDefinition, ActorFactory, FactoryRegistry, GameContext, MapDefinition,
};
pub use map::scene::{MapScene, SceneCommand, TileLayer};
pub use map::states::{
    CinematicState, CinematicStep, ConcreteState, DialogState, State, WalkaroundState,
};
pub use rendering::Display;
pub use runtime::Session;

/// Core error type for the Greenwood engine.
#[derive(thiserror::Error, Debug)]
pub enum GreenwoodError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Map definition failed to decode
    #[error("map definition error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A component lookup on an actor came up empty
    #[error("no {kind} component attached to actor '{actor}'")]
    ComponentNotFound { actor: String, kind: ComponentKind },

    /// A component that already has an owner was attached again
    #[error("{kind} component is already owned by another actor")]
    ComponentOwned { kind: ComponentKind },

    /// A named actor lookup came up empty
    #[error("no actor named '{0}'")]
    ActorNotFound(String),

    /// Two actors with the same name on one layer
    #[error("an actor named '{0}' already exists on this layer")]
    DuplicateActor(String),

    /// A state transition was requested on an empty stack
    #[error("state stack is empty")]
    EmptyStateStack,

    /// The named map resource does not exist
    #[error("map '{0}' not found")]
    MapNotFound(String),

    /// The map definition decoded but failed validation
    #[error("invalid map '{map}': {reason}")]
    InvalidMap { map: String, reason: String },

    /// An actor definition named a type with no registered factory
    #[error("unknown actor type '{kind}' for actor '{actor}' in map '{map}'")]
    UnknownActorType {
        map: String,
        actor: String,
        kind: String,
    },

    /// An actor definition is missing a property its factory requires
    #[error("actor '{actor}' in map '{map}' is missing required property '{property}'")]
    MissingProperty {
        map: String,
        actor: String,
        property: String,
    },

    /// Engine state is invalid
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Greenwood codebase.
pub type GreenwoodResult<T> = Result<T, GreenwoodError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default tile edge length in pixels
    pub const TILE_SIZE: f32 = 24.0;

    /// Default player movement speed in pixels per second
    pub const PLAYER_SPEED: f32 = 200.0;

    /// Default NPC movement speed in pixels per second
    pub const NPC_SPEED: f32 = 100.0;

    /// Per-axis displacement cap per tick, in pixels. Guards against
    /// tunneling through a tile row when a frame takes too long.
    pub const STEP_CAP: f32 = 20.0;

    /// Cooldown between collision sound cues, in seconds
    pub const BUMP_COOLDOWN: f32 = 0.5;

    /// Default interaction reach beyond the actor's bounding box, in pixels
    pub const INTERACT_REACH: f32 = 24.0;
}
