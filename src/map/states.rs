//! # Map States
//!
//! The exclusive input states a map scene stacks: free walkaround, modal
//! dialog, and scripted cinematics. The top state decides what a tick
//! does and where input goes; everything beneath it is frozen.
//!
//! States never mutate the stack they live on directly. They return
//! [`SceneCommand`]s and the scene applies them after the state call
//! returns, which is what makes pushing a dialog from inside walkaround's
//! own input handler safe.

use log::warn;

use crate::game::actor::Actor;
use crate::game::{ActorId, Direction};
use crate::input::{InputEvent, Key};
use crate::map::layer::ActorLayer;
use crate::map::scene::{MapScene, SceneCommand};
use crate::GreenwoodResult;

/// Lifecycle and input contract for a map state.
///
/// `on_suspend` fires when another state is pushed on top, `on_resume`
/// when that state pops off again. A state that lets actors move is
/// responsible for stopping them in its suspend/exit hooks so stale input
/// cannot replay when it comes back.
pub trait State {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn on_enter(&mut self, _scene: &mut MapScene) -> GreenwoodResult<()> {
        Ok(())
    }

    fn on_exit(&mut self, _scene: &mut MapScene) -> GreenwoodResult<()> {
        Ok(())
    }

    fn on_suspend(&mut self, _scene: &mut MapScene) -> GreenwoodResult<()> {
        Ok(())
    }

    fn on_resume(&mut self, _scene: &mut MapScene) -> GreenwoodResult<()> {
        Ok(())
    }

    /// Runs one tick of the scene under this state.
    fn update(&mut self, scene: &mut MapScene, dt: f32) -> GreenwoodResult<Vec<SceneCommand>>;

    /// Reacts to one input event.
    fn handle_input(
        &mut self,
        scene: &mut MapScene,
        event: InputEvent,
    ) -> GreenwoodResult<Vec<SceneCommand>>;
}

/// Free exploration: the player steers, the world simulates, interact
/// probes for dialog targets.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkaroundState {
    player: ActorId,
}

impl WalkaroundState {
    pub fn new(player: ActorId) -> Self {
        Self { player }
    }

    pub fn player(&self) -> ActorId {
        self.player
    }

    /// Finds the dialog target in front of the player, if any: the actor
    /// with dialog whose center is nearest the player's, names breaking
    /// ties.
    fn probe_target(player: &Actor, others: &ActorLayer) -> Option<(ActorId, Vec<String>)> {
        let reach = match player.interaction() {
            Ok(interaction) => interaction.reach_rect(player),
            Err(_) => return None,
        };
        let origin = player.rect().center();
        let mut candidates: Vec<&Actor> = others
            .get_in_region(&reach)
            .into_iter()
            .filter(|a| a.dialog().is_ok())
            .collect();
        candidates.sort_by(|a, b| {
            let da = origin.distance_squared(a.rect().center());
            let db = origin.distance_squared(b.rect().center());
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        let target = candidates.first()?;
        let text = target.dialog().ok()?.text.clone();
        Some((target.id(), text))
    }

    /// Runs the interaction probe. On a hit the player halts, the target
    /// turns to face the player, and a dialog state is pushed.
    fn interact(&mut self, scene: &mut MapScene) -> GreenwoodResult<Vec<SceneCommand>> {
        let mut player = match scene.actors.take(self.player) {
            Some(player) => player,
            None => return Ok(Vec::new()),
        };
        let hit = Self::probe_target(&player, &scene.actors);
        let mut out = Vec::new();
        if hit.is_some() {
            player.halt();
        }
        let player_facing = player.facing();
        scene.actors.restore(player);

        if let Some((target, text)) = hit {
            if let Some(npc) = scene.actors.get_by_id_mut(target) {
                npc.set_facing(player_facing.opposite());
            }
            out.push(SceneCommand::PushState(DialogState::new(text).into()));
        }
        Ok(out)
    }

    /// Stops the player so held keys cannot replay after a resume.
    fn stop_player(&self, scene: &mut MapScene) {
        if let Some(player) = scene.actors.get_by_id_mut(self.player) {
            player.halt();
        }
    }
}

impl State for WalkaroundState {
    fn name(&self) -> &'static str {
        "walkaround"
    }

    fn on_suspend(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.stop_player(scene);
        Ok(())
    }

    fn on_exit(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.stop_player(scene);
        Ok(())
    }

    fn update(&mut self, scene: &mut MapScene, dt: f32) -> GreenwoodResult<Vec<SceneCommand>> {
        let mut out = Vec::new();
        scene.update_actors(dt, &mut out);
        Ok(out)
    }

    fn handle_input(
        &mut self,
        scene: &mut MapScene,
        event: InputEvent,
    ) -> GreenwoodResult<Vec<SceneCommand>> {
        match event {
            InputEvent::KeyDown(Key::Interact) => self.interact(scene),
            InputEvent::KeyDown(key) => {
                if let Some(player) = scene.actors.get_by_id_mut(self.player) {
                    if let Ok(input) = player.input_mut() {
                        input.press(key);
                    }
                }
                Ok(Vec::new())
            }
            InputEvent::KeyUp(key) => {
                if let Some(player) = scene.actors.get_by_id_mut(self.player) {
                    if let Ok(input) = player.input_mut() {
                        input.release(key);
                    }
                }
                Ok(Vec::new())
            }
        }
    }
}

/// Modal dialog: the world freezes, interact advances pages, the last
/// page pops the state.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogState {
    pages: Vec<String>,
    page: usize,
}

impl DialogState {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages, page: 0 }
    }

    /// The page currently shown, if any remain.
    pub fn current_page(&self) -> Option<&str> {
        self.pages.get(self.page).map(String::as_str)
    }
}

impl State for DialogState {
    fn name(&self) -> &'static str {
        "dialog"
    }

    fn update(&mut self, _scene: &mut MapScene, _dt: f32) -> GreenwoodResult<Vec<SceneCommand>> {
        // World frozen
        Ok(Vec::new())
    }

    fn handle_input(
        &mut self,
        _scene: &mut MapScene,
        event: InputEvent,
    ) -> GreenwoodResult<Vec<SceneCommand>> {
        match event {
            InputEvent::KeyDown(Key::Interact) => {
                self.page += 1;
                if self.page >= self.pages.len() {
                    Ok(vec![SceneCommand::PopState])
                } else {
                    Ok(Vec::new())
                }
            }
            InputEvent::KeyDown(Key::Cancel) => Ok(vec![SceneCommand::PopState]),
            _ => Ok(Vec::new()),
        }
    }
}

/// One beat of a cinematic script: an actor walks in a direction (or
/// stands, with `direction: None`) for a duration.
#[derive(Debug, Clone, PartialEq)]
pub struct CinematicStep {
    pub actor: String,
    pub direction: Option<Direction>,
    pub duration: f32,
}

/// Scripted sequence: actors are steered by the script, player input is
/// ignored except for skipping.
#[derive(Debug, Clone, PartialEq)]
pub struct CinematicState {
    script: Vec<CinematicStep>,
    index: usize,
    elapsed: f32,
    started: bool,
}

impl CinematicState {
    pub fn new(script: Vec<CinematicStep>) -> Self {
        Self {
            script,
            index: 0,
            elapsed: 0.0,
            started: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.script.len()
    }

    fn apply_step(&self, scene: &mut MapScene) {
        let step = &self.script[self.index];
        match scene.actors.get_actor_mut(&step.actor) {
            Ok(actor) => match step.direction {
                Some(direction) => actor.steer(direction.to_vector()),
                None => actor.halt(),
            },
            Err(_) => warn!(
                "cinematic step names absent actor '{}', skipping",
                step.actor
            ),
        }
    }

    fn halt_script_actors(&self, scene: &mut MapScene) {
        for step in &self.script {
            if let Ok(actor) = scene.actors.get_actor_mut(&step.actor) {
                actor.halt();
            }
        }
    }
}

impl State for CinematicState {
    fn name(&self) -> &'static str {
        "cinematic"
    }

    fn on_exit(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.halt_script_actors(scene);
        Ok(())
    }

    fn update(&mut self, scene: &mut MapScene, dt: f32) -> GreenwoodResult<Vec<SceneCommand>> {
        if self.is_finished() {
            return Ok(vec![SceneCommand::PopState]);
        }
        if !self.started {
            self.apply_step(scene);
            self.started = true;
        }

        let mut out = Vec::new();
        scene.update_actors(dt, &mut out);

        self.elapsed += dt;
        if self.elapsed >= self.script[self.index].duration {
            self.index += 1;
            self.elapsed = 0.0;
            self.started = false;
        }
        Ok(out)
    }

    fn handle_input(
        &mut self,
        scene: &mut MapScene,
        event: InputEvent,
    ) -> GreenwoodResult<Vec<SceneCommand>> {
        // Any confirm/cancel press skips the rest of the script
        if matches!(
            event,
            InputEvent::KeyDown(Key::Interact) | InputEvent::KeyDown(Key::Cancel)
        ) {
            self.index = self.script.len();
            return Ok(vec![SceneCommand::PopState]);
        }
        Ok(Vec::new())
    }
}

/// Owned wrapper over every concrete state type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConcreteState {
    Walkaround(WalkaroundState),
    Dialog(DialogState),
    Cinematic(CinematicState),
}

impl ConcreteState {
    fn as_dyn_mut(&mut self) -> &mut dyn State {
        match self {
            ConcreteState::Walkaround(s) => s,
            ConcreteState::Dialog(s) => s,
            ConcreteState::Cinematic(s) => s,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConcreteState::Walkaround(s) => s.name(),
            ConcreteState::Dialog(s) => s.name(),
            ConcreteState::Cinematic(s) => s.name(),
        }
    }

    pub fn on_enter(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.as_dyn_mut().on_enter(scene)
    }

    pub fn on_exit(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.as_dyn_mut().on_exit(scene)
    }

    pub fn on_suspend(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.as_dyn_mut().on_suspend(scene)
    }

    pub fn on_resume(&mut self, scene: &mut MapScene) -> GreenwoodResult<()> {
        self.as_dyn_mut().on_resume(scene)
    }

    pub fn update(&mut self, scene: &mut MapScene, dt: f32) -> GreenwoodResult<Vec<SceneCommand>> {
        self.as_dyn_mut().update(scene, dt)
    }

    pub fn handle_input(
        &mut self,
        scene: &mut MapScene,
        event: InputEvent,
    ) -> GreenwoodResult<Vec<SceneCommand>> {
        self.as_dyn_mut().handle_input(scene, event)
    }
}

impl From<WalkaroundState> for ConcreteState {
    fn from(s: WalkaroundState) -> Self {
        ConcreteState::Walkaround(s)
    }
}
impl From<DialogState> for ConcreteState {
    fn from(s: DialogState) -> Self {
        ConcreteState::Dialog(s)
    }
}
impl From<CinematicState> for ConcreteState {
    fn from(s: CinematicState) -> Self {
        ConcreteState::Cinematic(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{DialogComponent, PhysicsComponent};
    use crate::game::Vec2;
    use crate::map::collision::CollisionMap;
    use crate::map::loader::make_player;
    use crate::map::scene::TileLayer;

    fn scene() -> MapScene {
        MapScene::new(
            "test",
            TileLayer::new("ground", 20, 20),
            TileLayer::new("fringe", 20, 20),
            TileLayer::new("over", 20, 20),
            CollisionMap::new(20, 20, 24.0, 24.0),
            Vec2::new(48.0, 48.0),
        )
    }

    fn sign(name: &str, x: f32, y: f32, line: &str) -> Actor {
        let mut actor = Actor::new(name);
        actor.set_size(24.0, 24.0);
        actor.set_position(x, y);
        actor
            .add_component(DialogComponent::new(vec![line.to_string()]))
            .unwrap();
        actor.add_component(PhysicsComponent::new(0.0)).unwrap();
        actor
    }

    fn walkaround_scene() -> (MapScene, ActorId) {
        let mut scene = scene();
        let player = scene
            .actors
            .add_actor(make_player("hero").unwrap())
            .unwrap();
        scene
            .state_replace(WalkaroundState::new(player).into())
            .unwrap();
        (scene, player)
    }

    fn face_east_at(scene: &mut MapScene, player: ActorId, x: f32, y: f32) {
        let actor = scene.actors.get_by_id_mut(player).unwrap();
        actor.set_position(x, y);
        actor.set_facing(Direction::East);
    }

    #[test]
    fn test_interact_with_nothing_in_reach_is_noop() {
        let (mut scene, _player) = walkaround_scene();
        let commands = scene
            .handle_input(InputEvent::KeyDown(Key::Interact))
            .unwrap();
        assert!(commands.is_empty());
        assert_eq!(scene.state_depth(), 1);
    }

    #[test]
    fn test_interact_opens_dialog_and_turns_target() {
        let (mut scene, player) = walkaround_scene();
        scene
            .actors
            .add_actor(sign("greeter", 130.0, 100.0, "hello"))
            .unwrap();
        face_east_at(&mut scene, player, 100.0, 100.0);

        scene
            .handle_input(InputEvent::KeyDown(Key::Interact))
            .unwrap();

        assert_eq!(scene.state_depth(), 2);
        match scene.current_state() {
            Some(ConcreteState::Dialog(dialog)) => {
                assert_eq!(dialog.current_page(), Some("hello"));
            }
            other => panic!("expected dialog state, got {:?}", other),
        }
        // Target turned to face the eastward-facing player
        let greeter = scene.actors.get_actor("greeter").unwrap();
        assert_eq!(greeter.facing(), Direction::West);
    }

    #[test]
    fn test_interact_picks_nearest_target() {
        let (mut scene, player) = walkaround_scene();
        scene
            .actors
            .add_actor(sign("far_sign", 140.0, 100.0, "far"))
            .unwrap();
        scene
            .actors
            .add_actor(sign("near_sign", 126.0, 100.0, "near"))
            .unwrap();
        face_east_at(&mut scene, player, 100.0, 100.0);

        scene
            .handle_input(InputEvent::KeyDown(Key::Interact))
            .unwrap();

        match scene.current_state() {
            Some(ConcreteState::Dialog(dialog)) => {
                assert_eq!(dialog.current_page(), Some("near"));
            }
            other => panic!("expected dialog state, got {:?}", other),
        }
    }

    #[test]
    fn test_dialog_pages_advance_then_pop() {
        let (mut scene, _player) = walkaround_scene();
        scene
            .state_push(DialogState::new(vec!["one".to_string(), "two".to_string()]).into())
            .unwrap();

        scene
            .handle_input(InputEvent::KeyDown(Key::Interact))
            .unwrap();
        match scene.current_state() {
            Some(ConcreteState::Dialog(dialog)) => {
                assert_eq!(dialog.current_page(), Some("two"));
            }
            other => panic!("expected dialog state, got {:?}", other),
        }

        scene
            .handle_input(InputEvent::KeyDown(Key::Interact))
            .unwrap();
        assert_eq!(scene.state_depth(), 1);
    }

    #[test]
    fn test_dialog_freezes_world() {
        let (mut scene, player) = walkaround_scene();
        // Player walking east
        scene
            .handle_input(InputEvent::KeyDown(Key::Right))
            .unwrap();
        scene.update(0.1).unwrap();
        let moved_x = scene.actors.get_by_id(player).unwrap().x();
        assert!(moved_x > 0.0);

        scene
            .state_push(DialogState::new(vec!["stop".to_string()]).into())
            .unwrap();
        scene.update(0.1).unwrap();
        assert_eq!(scene.actors.get_by_id(player).unwrap().x(), moved_x);
    }

    #[test]
    fn test_suspend_halts_player_so_held_keys_do_not_replay() {
        let (mut scene, player) = walkaround_scene();
        scene
            .handle_input(InputEvent::KeyDown(Key::Right))
            .unwrap();
        scene.update(0.1).unwrap();

        scene
            .state_push(DialogState::new(vec!["hi".to_string()]).into())
            .unwrap();
        scene.state_pop().unwrap();

        // Back in walkaround with no keys held: player stays put
        let x = scene.actors.get_by_id(player).unwrap().x();
        scene.update(0.1).unwrap();
        assert_eq!(scene.actors.get_by_id(player).unwrap().x(), x);
    }

    #[test]
    fn test_cinematic_steers_actor_then_pops() {
        let (mut scene, player) = walkaround_scene();
        let script = vec![CinematicStep {
            actor: "hero".to_string(),
            direction: Some(Direction::East),
            duration: 0.2,
        }];
        scene
            .state_push(CinematicState::new(script).into())
            .unwrap();

        scene.update(0.1).unwrap();
        assert!(scene.actors.get_by_id(player).unwrap().x() > 0.0);

        scene.update(0.1).unwrap(); // script time exhausted
        scene.update(0.1).unwrap(); // finished state pops itself
        assert_eq!(scene.state_depth(), 1);
        // Script actor halted on exit
        assert_eq!(
            scene
                .actors
                .get_by_id(player)
                .unwrap()
                .physics()
                .unwrap()
                .direction(),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_cinematic_skips_on_cancel() {
        let (mut scene, _player) = walkaround_scene();
        let script = vec![CinematicStep {
            actor: "hero".to_string(),
            direction: Some(Direction::East),
            duration: 10.0,
        }];
        scene
            .state_push(CinematicState::new(script).into())
            .unwrap();
        scene
            .handle_input(InputEvent::KeyDown(Key::Cancel))
            .unwrap();
        assert_eq!(scene.state_depth(), 1);
    }
}
