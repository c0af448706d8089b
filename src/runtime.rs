//! # Runtime Module
//!
//! The session: one running game. It owns the game context, the current
//! map scene, and the player's identity, and resolves the scene commands
//! a scene cannot handle itself. Map travel is the interesting one: the
//! player actor is lifted out of the old scene, the destination map is
//! loaded and becomes the current scene, and the player is placed at the
//! portal's spawn point (or the map's default).

use log::{debug, info};

use crate::game::components::SoundCue;
use crate::game::{ActorId, Vec2};
use crate::input::InputEvent;
use crate::map::loader::{make_player, GameContext};
use crate::map::scene::{MapScene, SceneCommand};
use crate::map::states::WalkaroundState;
use crate::{GreenwoodError, GreenwoodResult};

/// A running game: context, current scene, player.
#[derive(Debug)]
pub struct Session {
    context: GameContext,
    scene: MapScene,
    player: ActorId,
    cues: Vec<SoundCue>,
}

impl Session {
    /// Starts a session on the named map with a fresh player at the map's
    /// default spawn.
    pub fn new(context: GameContext, start_map: &str) -> GreenwoodResult<Self> {
        let mut scene = context.load_map(start_map)?;
        let mut player = make_player("player")?;
        let spawn = scene.spawn;
        player.set_position(spawn.x, spawn.y);
        let player_id = scene.actors.add_actor(player)?;
        scene.focus = Some(player_id);
        scene.state_replace(WalkaroundState::new(player_id).into())?;
        info!("session started on map '{}'", scene.name);
        Ok(Self {
            context,
            scene,
            player: player_id,
            cues: Vec::new(),
        })
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }

    pub fn player(&self) -> ActorId {
        self.player
    }

    /// Sound cues emitted since the last drain. The shell plays these.
    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    /// Routes one input event to the scene.
    pub fn handle_input(&mut self, event: InputEvent) -> GreenwoodResult<()> {
        let commands = self.scene.handle_input(event)?;
        self.process(commands)
    }

    /// Runs one simulation tick.
    pub fn update(&mut self, dt: f32) -> GreenwoodResult<()> {
        let commands = self.scene.update(dt)?;
        self.process(commands)
    }

    fn process(&mut self, commands: Vec<SceneCommand>) -> GreenwoodResult<()> {
        for command in commands {
            match command {
                SceneCommand::PlaySound(cue) => self.cues.push(cue),
                SceneCommand::Transition {
                    map,
                    traveler,
                    spawn,
                } => {
                    if traveler == self.player {
                        self.travel(&map, spawn)?;
                    } else {
                        // Only the player travels through portals
                        debug!("non-player actor hit a portal to '{map}', ignoring");
                    }
                }
                other => debug!("unresolved scene command ignored: {other:?}"),
            }
        }
        Ok(())
    }

    /// Moves the player to another map, replacing the current scene.
    fn travel(&mut self, map: &str, spawn: Option<Vec2>) -> GreenwoodResult<()> {
        let name = self
            .scene
            .actors
            .get_by_id(self.player)
            .map(|a| a.name.clone())
            .ok_or_else(|| {
                GreenwoodError::InvalidState("traveling player is not on the scene".to_string())
            })?;
        let mut player = self.scene.actors.remove_actor(&name)?;
        let mut next = self.context.load_map(map)?;

        let target = spawn.unwrap_or(next.spawn);
        player.set_position(target.x, target.y);
        player.halt();

        let player_id = next.actors.add_actor(player)?;
        next.focus = Some(player_id);
        next.state_replace(WalkaroundState::new(player_id).into())?;
        info!("player traveled from '{}' to '{}'", self.scene.name, next.name);

        self.player = player_id;
        self.scene = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use std::fs;

    /// Two 6x6 maps joined by a portal on the east edge of the first.
    fn assets() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create temp assets dir");
        let meadow = serde_json::json!({
            "name": "meadow",
            "cols": 6,
            "rows": 6,
            "spawn": [24.0, 48.0],
            "actors": [
                {
                    "name": "east_gate",
                    "kind": "portal",
                    "position": [120.0, 24.0],
                    "size": [24.0, 96.0],
                    "properties": {"destination": "village", "spawn": [24.0, 24.0]}
                }
            ]
        });
        let village = serde_json::json!({
            "name": "village",
            "cols": 6,
            "rows": 6,
            "spawn": [72.0, 72.0],
            "actors": []
        });
        fs::write(
            dir.path().join("meadow.map.json"),
            meadow.to_string(),
        )
        .expect("write meadow");
        fs::write(
            dir.path().join("village.map.json"),
            village.to_string(),
        )
        .expect("write village");
        dir
    }

    fn session() -> (Session, tempfile::TempDir) {
        let dir = assets();
        let session = Session::new(GameContext::new(dir.path()), "meadow").expect("start session");
        (session, dir)
    }

    #[test]
    fn test_session_starts_at_map_spawn() {
        let (session, _dir) = session();
        let player = session.scene().actors.get_by_id(session.player()).unwrap();
        assert_eq!(player.position(), Vec2::new(24.0, 48.0));
        assert_eq!(session.scene().focus, Some(session.player()));
    }

    #[test]
    fn test_unknown_start_map_fails() {
        let dir = assets();
        let err = Session::new(GameContext::new(dir.path()), "dungeon").unwrap_err();
        assert!(matches!(err, GreenwoodError::MapNotFound(name) if name == "dungeon"));
    }

    #[test]
    fn test_portal_carries_player_to_destination() {
        let (mut session, _dir) = session();
        session
            .handle_input(InputEvent::KeyDown(Key::Right))
            .unwrap();
        // Walk east into the portal region
        for _ in 0..60 {
            session.update(0.05).unwrap();
            if session.scene().name == "village" {
                break;
            }
        }
        assert_eq!(session.scene().name, "village");
        let player = session.scene().actors.get_by_id(session.player()).unwrap();
        assert_eq!(player.position(), Vec2::new(24.0, 24.0));
        // Arrival map has a fresh walkaround stack and a halted player
        assert_eq!(session.scene().state_depth(), 1);
        assert_eq!(player.physics().unwrap().direction(), Vec2::ZERO);
    }
}
