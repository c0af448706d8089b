//! # Map Module
//!
//! Everything that makes up one playable map: the solid-tile collision
//! grid, the actor layer, the visual tile layers, the scene that ties them
//! together under a stack of input states, and the loader that builds
//! scenes from JSON map definitions.

pub mod collision;
pub mod layer;
pub mod loader;
pub mod scene;
pub mod states;

pub use collision::{Cell, CollisionMap};
pub use layer::ActorLayer;
pub use loader::{make_player, ActorDefinition, ActorFactory, FactoryRegistry, GameContext, MapDefinition};
pub use scene::{MapScene, SceneCommand, TileLayer};
pub use states::{CinematicState, CinematicStep, ConcreteState, DialogState, State, WalkaroundState};
