//! # Map Scene
//!
//! One playable map: tile layers, collision grid, actor layer, and a
//! stack of exclusive input states. Exactly one state drives the scene at
//! a time; pushing a dialog on top of walkaround freezes the world, and
//! popping it resumes where it left off.
//!
//! Mid-tick structural changes (state transitions, map travel, actor
//! removal) are expressed as [`SceneCommand`]s and applied after the tick,
//! so no component ever mutates the scene it is being iterated from.
//! Commands the scene cannot resolve by itself (travel to another map,
//! sound playback) are returned to the caller.

use log::debug;

use crate::game::components::SoundCue;
use crate::game::{ActorId, Vec2};
use crate::input::InputEvent;
use crate::map::collision::CollisionMap;
use crate::map::layer::ActorLayer;
use crate::map::states::ConcreteState;
use crate::{GreenwoodError, GreenwoodResult};

/// A named grid of visual tile ids. Zero means no tile.
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    cols: usize,
    rows: usize,
    tiles: Vec<u32>,
}

impl TileLayer {
    /// Creates an empty layer.
    pub fn new(name: impl Into<String>, cols: usize, rows: usize) -> Self {
        Self {
            name: name.into(),
            cols,
            rows,
            tiles: vec![0; cols * rows],
        }
    }

    /// Creates a layer from row-major tile data.
    pub fn from_tiles(
        name: impl Into<String>,
        cols: usize,
        rows: usize,
        tiles: Vec<u32>,
    ) -> GreenwoodResult<Self> {
        let name = name.into();
        if tiles.len() != cols * rows {
            return Err(GreenwoodError::InvalidMap {
                map: name,
                reason: format!(
                    "layer has {} tiles, expected {} ({}x{})",
                    tiles.len(),
                    cols * rows,
                    cols,
                    rows
                ),
            });
        }
        Ok(Self {
            name,
            cols,
            rows,
            tiles,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Tile id at a grid position; zero outside the grid.
    pub fn get(&self, col: usize, row: usize) -> u32 {
        if col >= self.cols || row >= self.rows {
            return 0;
        }
        self.tiles[row * self.cols + col]
    }

    pub fn set(&mut self, col: usize, row: usize, tile: u32) {
        if col < self.cols && row < self.rows {
            self.tiles[row * self.cols + col] = tile;
        }
    }
}

/// Deferred scene mutations and outward effects.
///
/// Components and states queue these instead of mutating the scene they
/// are running inside. The scene resolves state and actor commands itself;
/// `Transition` and `PlaySound` bubble up to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// Push a state on top of the current one.
    PushState(ConcreteState),
    /// Pop the top state.
    PopState,
    /// Move an actor to another map.
    Transition {
        map: String,
        traveler: ActorId,
        spawn: Option<Vec2>,
    },
    /// Ask the shell to play a sound cue.
    PlaySound(SoundCue),
    /// Remove an actor from the scene.
    RemoveActor(ActorId),
}

/// One map's worth of world, driven by a stack of input states.
#[derive(Debug)]
pub struct MapScene {
    pub name: String,
    pub ground: TileLayer,
    pub fringe: TileLayer,
    pub over: TileLayer,
    pub collision: CollisionMap,
    pub actors: ActorLayer,
    /// Default spawn position for actors arriving on this map.
    pub spawn: Vec2,
    /// Actor the camera follows.
    pub focus: Option<ActorId>,
    states: Vec<ConcreteState>,
}

impl MapScene {
    pub fn new(
        name: impl Into<String>,
        ground: TileLayer,
        fringe: TileLayer,
        over: TileLayer,
        collision: CollisionMap,
        spawn: Vec2,
    ) -> Self {
        let name = name.into();
        let actors = ActorLayer::for_map(name.clone());
        Self {
            name,
            ground,
            fringe,
            over,
            collision,
            actors,
            spawn,
            focus: None,
            states: Vec::new(),
        }
    }

    /// The state currently driving the scene.
    pub fn current_state(&self) -> Option<&ConcreteState> {
        self.states.last()
    }

    pub fn state_depth(&self) -> usize {
        self.states.len()
    }

    /// Replaces the whole stack with one state, exiting everything on it.
    pub fn state_replace(&mut self, state: ConcreteState) -> GreenwoodResult<()> {
        while !self.states.is_empty() {
            self.state_pop()?;
        }
        self.state_push(state)
    }

    /// Pushes a state, suspending the current top.
    pub fn state_push(&mut self, mut state: ConcreteState) -> GreenwoodResult<()> {
        if let Some(mut top) = self.states.pop() {
            top.on_suspend(self)?;
            self.states.push(top);
        }
        debug!("map '{}': push state {}", self.name, state.name());
        state.on_enter(self)?;
        self.states.push(state);
        Ok(())
    }

    /// Pops and returns the top state, resuming the one beneath it.
    pub fn state_pop(&mut self) -> GreenwoodResult<ConcreteState> {
        let mut top = self
            .states
            .pop()
            .ok_or(GreenwoodError::EmptyStateStack)?;
        debug!("map '{}': pop state {}", self.name, top.name());
        top.on_exit(self)?;
        if let Some(mut next) = self.states.pop() {
            next.on_resume(self)?;
            self.states.push(next);
        }
        Ok(top)
    }

    /// Routes an input event to the top state. Returns the commands the
    /// scene could not resolve itself.
    pub fn handle_input(&mut self, event: InputEvent) -> GreenwoodResult<Vec<SceneCommand>> {
        let mut state = self
            .states
            .pop()
            .ok_or(GreenwoodError::EmptyStateStack)?;
        let result = state.handle_input(self, event);
        self.states.push(state);
        self.apply_commands(result?)
    }

    /// Runs one simulation tick under the top state. Returns the commands
    /// the scene could not resolve itself.
    pub fn update(&mut self, dt: f32) -> GreenwoodResult<Vec<SceneCommand>> {
        let mut state = self
            .states
            .pop()
            .ok_or(GreenwoodError::EmptyStateStack)?;
        let result = state.update(self, dt);
        self.states.push(state);
        self.apply_commands(result?)
    }

    /// Ticks every actor on the map in deterministic order. Each actor is
    /// taken out of the layer for its own update so queries it makes never
    /// see itself.
    pub fn update_actors(&mut self, dt: f32, out: &mut Vec<SceneCommand>) {
        for id in self.actors.update_order() {
            if let Some(mut actor) = self.actors.take(id) {
                actor.update(dt, &self.collision, &self.actors, out);
                self.actors.restore(actor);
            }
        }
    }

    /// Applies state and actor commands, returning the rest for the
    /// session to resolve.
    fn apply_commands(
        &mut self,
        commands: Vec<SceneCommand>,
    ) -> GreenwoodResult<Vec<SceneCommand>> {
        let mut unhandled = Vec::new();
        for command in commands {
            match command {
                SceneCommand::PushState(state) => self.state_push(state)?,
                SceneCommand::PopState => {
                    self.state_pop()?;
                }
                SceneCommand::RemoveActor(id) => {
                    if self.actors.remove_by_id(id).is_none() {
                        debug!("map '{}': remove of absent actor ignored", self.name);
                    }
                }
                other => unhandled.push(other),
            }
        }
        Ok(unhandled)
    }

    /// Camera target in pixel space: the focused actor's center.
    pub fn focus_position(&self) -> Option<Vec2> {
        let id = self.focus?;
        self.actors.get_by_id(id).map(|a| a.rect().center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::Actor;
    use crate::map::states::{DialogState, WalkaroundState};

    fn empty_scene() -> MapScene {
        MapScene::new(
            "test",
            TileLayer::new("ground", 10, 10),
            TileLayer::new("fringe", 10, 10),
            TileLayer::new("over", 10, 10),
            CollisionMap::new(10, 10, 24.0, 24.0),
            Vec2::new(48.0, 48.0),
        )
    }

    fn scene_with_player() -> (MapScene, ActorId) {
        let mut scene = empty_scene();
        let player = scene
            .actors
            .add_actor(crate::map::loader::make_player("hero").unwrap())
            .unwrap();
        scene
            .state_replace(WalkaroundState::new(player).into())
            .unwrap();
        (scene, player)
    }

    #[test]
    fn test_update_on_empty_stack_fails() {
        let mut scene = empty_scene();
        let err = scene.update(0.016).unwrap_err();
        assert!(matches!(err, GreenwoodError::EmptyStateStack));
    }

    #[test]
    fn test_push_pop_resume_round_trip() {
        let (mut scene, _player) = scene_with_player();
        assert_eq!(scene.state_depth(), 1);

        scene
            .state_push(DialogState::new(vec!["hi".to_string()]).into())
            .unwrap();
        assert_eq!(scene.state_depth(), 2);
        assert!(matches!(
            scene.current_state(),
            Some(ConcreteState::Dialog(_))
        ));

        scene.state_pop().unwrap();
        assert_eq!(scene.state_depth(), 1);
        assert!(matches!(
            scene.current_state(),
            Some(ConcreteState::Walkaround(_))
        ));
    }

    #[test]
    fn test_pop_on_empty_stack_fails() {
        let mut scene = empty_scene();
        assert!(matches!(
            scene.state_pop().unwrap_err(),
            GreenwoodError::EmptyStateStack
        ));
    }

    #[test]
    fn test_tile_layer_size_validated() {
        let err = TileLayer::from_tiles("ground", 4, 4, vec![0; 3]).unwrap_err();
        assert!(matches!(err, GreenwoodError::InvalidMap { .. }));
    }

    #[test]
    fn test_remove_actor_command_applied() {
        let (mut scene, _player) = scene_with_player();
        let extra = scene.actors.add_actor(Actor::new("crate")).unwrap();
        let unhandled = scene
            .apply_commands(vec![SceneCommand::RemoveActor(extra)])
            .unwrap();
        assert!(unhandled.is_empty());
        assert!(scene.actors.get_by_id(extra).is_none());
    }

    #[test]
    fn test_transition_bubbles_up() {
        let (mut scene, player) = scene_with_player();
        let command = SceneCommand::Transition {
            map: "village".to_string(),
            traveler: player,
            spawn: None,
        };
        let unhandled = scene.apply_commands(vec![command.clone()]).unwrap();
        assert_eq!(unhandled, vec![command]);
    }
}
