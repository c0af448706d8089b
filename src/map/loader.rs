//! # Map Loader
//!
//! Decodes JSON map definitions into live scenes. A map definition names
//! its grid dimensions, visual tile layers, collision tags, a default
//! spawn position, and a list of actor definitions. Each actor definition
//! carries a `kind` string that selects a factory from the registry; the
//! factory turns the definition's free-form properties into an assembled
//! actor.
//!
//! Validation is front-loaded: layer and collision sizes are checked
//! against the grid, unknown actor kinds and missing required properties
//! fail the load with errors naming the map and actor at fault.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::config;
use crate::game::actor::Actor;
use crate::game::components::{
    DialogComponent, FollowAi, InputComponent, InteractionComponent, PhysicsComponent,
    SoundComponent, SpriteComponent, TriggerAction, TriggerComponent,
};
use crate::game::Vec2;
use crate::map::collision::CollisionMap;
use crate::map::scene::{MapScene, TileLayer};
use crate::{GreenwoodError, GreenwoodResult};

/// One actor entry in a map definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorDefinition {
    pub name: String,
    /// Factory key: "sign", "portal", "npc", ...
    pub kind: String,
    /// Optional grouping label ("npcs", "scenery", ...), carried onto the
    /// actor for scripting queries.
    #[serde(default)]
    pub group: Option<String>,
    pub position: (f32, f32),
    #[serde(default = "default_actor_size")]
    pub size: (f32, f32),
    /// Free-form per-kind properties.
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

fn default_actor_size() -> (f32, f32) {
    (config::TILE_SIZE, config::TILE_SIZE)
}

impl ActorDefinition {
    /// A required string property, with an error naming the gap.
    pub fn require_str(&self, map: &str, key: &str) -> GreenwoodResult<&str> {
        self.properties
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| GreenwoodError::MissingProperty {
                map: map.to_string(),
                actor: self.name.clone(),
                property: key.to_string(),
            })
    }

    /// An optional string property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// An optional `[x, y]` property.
    pub fn get_point(&self, key: &str) -> Option<Vec2> {
        let array = self.properties.get(key)?.as_array()?;
        if array.len() != 2 {
            return None;
        }
        let x = array[0].as_f64()?;
        let y = array[1].as_f64()?;
        Some(Vec2::new(x as f32, y as f32))
    }

    /// Dialog text: either a single string or an array of page strings.
    pub fn require_text(&self, map: &str, key: &str) -> GreenwoodResult<Vec<String>> {
        match self.properties.get(key) {
            Some(serde_json::Value::String(line)) => Ok(vec![line.clone()]),
            Some(serde_json::Value::Array(lines)) => {
                let pages: Vec<String> = lines
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if pages.is_empty() {
                    Err(self.missing(map, key))
                } else {
                    Ok(pages)
                }
            }
            _ => Err(self.missing(map, key)),
        }
    }

    fn missing(&self, map: &str, key: &str) -> GreenwoodError {
        GreenwoodError::MissingProperty {
            map: map.to_string(),
            actor: self.name.clone(),
            property: key.to_string(),
        }
    }
}

/// A decoded map file, before scene assembly.
#[derive(Debug, Deserialize)]
pub struct MapDefinition {
    pub name: String,
    pub cols: usize,
    pub rows: usize,
    #[serde(default = "default_tile_size")]
    pub tile_width: f32,
    #[serde(default = "default_tile_size")]
    pub tile_height: f32,
    /// Default spawn position in pixels.
    pub spawn: (f32, f32),
    /// Visual layers keyed by name ("ground", "fringe", "over").
    #[serde(default)]
    pub layers: HashMap<String, Vec<u32>>,
    /// Row-major collision tags; empty means all passable.
    #[serde(default)]
    pub collision: Vec<u32>,
    #[serde(default)]
    pub actors: Vec<ActorDefinition>,
}

fn default_tile_size() -> f32 {
    config::TILE_SIZE
}

/// Builds one actor from its definition. `map` is the owning map's name,
/// for error messages.
pub type ActorFactory = fn(&ActorDefinition, map: &str) -> GreenwoodResult<Actor>;

/// String-keyed registry of actor factories.
#[derive(Debug, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, ActorFactory>,
}

impl FactoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in kinds: "sign", "portal", and "npc".
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("sign", make_sign);
        registry.register("portal", make_portal);
        registry.register("npc", make_npc);
        registry
    }

    /// Registers a factory, replacing any previous one for the kind.
    pub fn register(&mut self, kind: &str, factory: ActorFactory) {
        self.factories.insert(kind.to_string(), factory);
    }

    /// Builds an actor from its definition.
    pub fn build(&self, definition: &ActorDefinition, map: &str) -> GreenwoodResult<Actor> {
        let factory = self.factories.get(&definition.kind).ok_or_else(|| {
            GreenwoodError::UnknownActorType {
                map: map.to_string(),
                actor: definition.name.clone(),
                kind: definition.kind.clone(),
            }
        })?;
        let mut actor = factory(definition, map)?;
        actor.group = definition.group.clone();
        actor.set_size(definition.size.0, definition.size.1);
        actor.set_position(definition.position.0, definition.position.1);
        Ok(actor)
    }
}

/// A solid, readable sign.
fn make_sign(definition: &ActorDefinition, map: &str) -> GreenwoodResult<Actor> {
    let text = definition.require_text(map, "text")?;
    let mut actor = Actor::new(&definition.name);
    actor.add_component(DialogComponent::new(text))?;
    actor.add_component(PhysicsComponent::new(0.0))?;
    actor.add_component(SpriteComponent::new(
        definition.get_str("animset").unwrap_or("sign"),
        Vec2::ZERO,
    ))?;
    Ok(actor)
}

/// An invisible region that sends entering actors to another map.
fn make_portal(definition: &ActorDefinition, map: &str) -> GreenwoodResult<Actor> {
    let destination = definition.require_str(map, "destination")?.to_string();
    let spawn = definition.get_point("spawn");
    let mut actor = Actor::new(&definition.name);
    actor.add_component(TriggerComponent::new(TriggerAction::Portal {
        map: destination,
        spawn,
    }))?;
    Ok(actor)
}

/// A wandering or following character, optionally with dialog.
fn make_npc(definition: &ActorDefinition, map: &str) -> GreenwoodResult<Actor> {
    let mut actor = Actor::new(&definition.name);
    let follow = definition.get_str("follow").map(str::to_string);
    actor.add_component(InputComponent::Ai(FollowAi::new(
        name_seed(&definition.name),
        follow,
    )))?;
    actor.add_component(PhysicsComponent::new(config::NPC_SPEED))?;
    actor.add_component(SpriteComponent::new(
        definition.get_str("animset").unwrap_or("npc"),
        Vec2::ZERO,
    ))?;
    actor.add_component(SoundComponent::new())?;
    if let Ok(text) = definition.require_text(map, "text") {
        actor.add_component(DialogComponent::new(text))?;
    }
    Ok(actor)
}

/// Stable wander seed derived from the actor's name.
fn name_seed(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

/// Assembles the player actor. Not factory-built: the player travels
/// between maps instead of belonging to one.
pub fn make_player(name: &str) -> GreenwoodResult<Actor> {
    let mut actor = Actor::new(name);
    actor.set_size(config::TILE_SIZE, config::TILE_SIZE);
    actor.add_component(InputComponent::human())?;
    actor.add_component(PhysicsComponent::new(config::PLAYER_SPEED))?;
    actor.add_component(SpriteComponent::new("player", Vec2::ZERO))?;
    actor.add_component(SoundComponent::new())?;
    actor.add_component(InteractionComponent::default())?;
    Ok(actor)
}

/// Loads maps from an assets directory and assembles scenes.
#[derive(Debug)]
pub struct GameContext {
    pub assets_dir: PathBuf,
    pub factories: FactoryRegistry,
}

impl GameContext {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            factories: FactoryRegistry::with_defaults(),
        }
    }

    fn map_path(&self, name: &str) -> PathBuf {
        self.assets_dir.join(format!("{name}.map.json"))
    }

    /// Loads and assembles the named map.
    pub fn load_map(&self, name: &str) -> GreenwoodResult<MapScene> {
        let path = self.map_path(name);
        if !path.exists() {
            return Err(GreenwoodError::MapNotFound(name.to_string()));
        }
        self.load_map_file(&path)
    }

    /// Loads and assembles a map from an explicit file path.
    pub fn load_map_file(&self, path: &Path) -> GreenwoodResult<MapScene> {
        let text = fs::read_to_string(path)?;
        debug!("decoded map definition from {}", path.display());
        self.load_map_str(&text)
    }

    /// Decodes and assembles a map from JSON text.
    pub fn load_map_str(&self, text: &str) -> GreenwoodResult<MapScene> {
        let definition: MapDefinition = serde_json::from_str(text)?;
        self.build_scene(definition)
    }

    /// Assembles a scene from an already-decoded definition.
    pub fn build_scene(&self, definition: MapDefinition) -> GreenwoodResult<MapScene> {
        let MapDefinition {
            name,
            cols,
            rows,
            tile_width,
            tile_height,
            spawn,
            mut layers,
            collision,
            actors,
        } = definition;

        let mut layer = |key: &str| -> GreenwoodResult<TileLayer> {
            match layers.remove(key) {
                Some(tiles) => TileLayer::from_tiles(key, cols, rows, tiles).map_err(|_| {
                    GreenwoodError::InvalidMap {
                        map: name.clone(),
                        reason: format!("layer '{key}' does not match the {cols}x{rows} grid"),
                    }
                }),
                None => Ok(TileLayer::new(key, cols, rows)),
            }
        };
        let ground = layer("ground")?;
        let fringe = layer("fringe")?;
        let over = layer("over")?;

        let mut grid = CollisionMap::new(cols, rows, tile_width, tile_height);
        if !collision.is_empty() {
            if collision.len() != cols * rows {
                return Err(GreenwoodError::InvalidMap {
                    map: name,
                    reason: format!(
                        "collision has {} cells, expected {}",
                        collision.len(),
                        cols * rows
                    ),
                });
            }
            for row in 0..rows {
                for col in 0..cols {
                    grid.set_solid(col, row, collision[row * cols + col]);
                }
            }
        }

        let mut scene = MapScene::new(
            name.clone(),
            ground,
            fringe,
            over,
            grid,
            Vec2::new(spawn.0, spawn.1),
        );
        for definition in &actors {
            let actor = self.factories.build(definition, &name)?;
            scene.actors.add_actor(actor)?;
        }

        info!(
            "loaded map '{}' ({}x{} tiles, {} actors)",
            name,
            scene.collision.cols(),
            scene.collision.rows(),
            scene.actors.len()
        );
        Ok(scene)
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(Path::new("assets"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::ComponentKind;

    fn definition(kind: &str, properties: serde_json::Value) -> ActorDefinition {
        serde_json::from_value(serde_json::json!({
            "name": "thing",
            "kind": kind,
            "position": [48.0, 48.0],
            "properties": properties,
        }))
        .unwrap()
    }

    #[test]
    fn test_sign_requires_text() {
        let registry = FactoryRegistry::with_defaults();
        let err = registry
            .build(&definition("sign", serde_json::json!({})), "meadow")
            .unwrap_err();
        assert!(matches!(
            err,
            GreenwoodError::MissingProperty { property, .. } if property == "text"
        ));
    }

    #[test]
    fn test_sign_is_solid_and_readable() {
        let registry = FactoryRegistry::with_defaults();
        let actor = registry
            .build(
                &definition("sign", serde_json::json!({"text": "keep out"})),
                "meadow",
            )
            .unwrap();
        assert!(actor.is_collidable());
        assert_eq!(actor.dialog().unwrap().text, vec!["keep out".to_string()]);
        assert_eq!(actor.position(), Vec2::new(48.0, 48.0));
    }

    #[test]
    fn test_portal_requires_destination() {
        let registry = FactoryRegistry::with_defaults();
        let err = registry
            .build(&definition("portal", serde_json::json!({})), "meadow")
            .unwrap_err();
        assert!(matches!(
            err,
            GreenwoodError::MissingProperty { property, .. } if property == "destination"
        ));
    }

    #[test]
    fn test_portal_carries_destination_and_spawn() {
        let registry = FactoryRegistry::with_defaults();
        let actor = registry
            .build(
                &definition(
                    "portal",
                    serde_json::json!({"destination": "village", "spawn": [72.0, 96.0]}),
                ),
                "meadow",
            )
            .unwrap();
        assert_eq!(
            actor.trigger().unwrap().action,
            TriggerAction::Portal {
                map: "village".to_string(),
                spawn: Some(Vec2::new(72.0, 96.0)),
            }
        );
        // Portals do not block movement
        assert!(!actor.is_collidable());
    }

    #[test]
    fn test_npc_text_is_optional() {
        let registry = FactoryRegistry::with_defaults();
        let silent = registry
            .build(&definition("npc", serde_json::json!({})), "meadow")
            .unwrap();
        assert!(!silent.has_component(ComponentKind::Dialog));

        let chatty = registry
            .build(
                &definition("npc", serde_json::json!({"text": ["hi", "bye"]})),
                "meadow",
            )
            .unwrap();
        assert_eq!(chatty.dialog().unwrap().text.len(), 2);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let registry = FactoryRegistry::with_defaults();
        let err = registry
            .build(&definition("dragon", serde_json::json!({})), "meadow")
            .unwrap_err();
        assert!(matches!(
            err,
            GreenwoodError::UnknownActorType { kind, .. } if kind == "dragon"
        ));
    }

    #[test]
    fn test_player_assembly() {
        let player = make_player("hero").unwrap();
        assert!(player.has_component(ComponentKind::Input));
        assert!(player.has_component(ComponentKind::Physics));
        assert!(player.has_component(ComponentKind::Graphics));
        assert!(player.has_component(ComponentKind::Sound));
        assert!(player.has_component(ComponentKind::Interaction));
        assert!(player.input().unwrap().is_human());
    }

    #[test]
    fn test_group_carried_onto_actor() {
        let registry = FactoryRegistry::with_defaults();
        let mut def = definition("sign", serde_json::json!({"text": "hi"}));
        def.group = Some("scenery".to_string());
        let actor = registry.build(&def, "meadow").unwrap();
        assert_eq!(actor.group.as_deref(), Some("scenery"));
    }

    #[test]
    fn test_load_map_str_assembles_scene() {
        let context = GameContext::new("assets");
        let scene = context
            .load_map_str(
                &serde_json::json!({
                    "name": "pocket",
                    "cols": 3,
                    "rows": 3,
                    "spawn": [24.0, 24.0],
                    "actors": [
                        {"name": "post", "kind": "sign", "position": [48.0, 24.0],
                         "properties": {"text": "tiny"}}
                    ],
                })
                .to_string(),
            )
            .unwrap();
        assert_eq!(scene.name, "pocket");
        assert_eq!(scene.spawn, Vec2::new(24.0, 24.0));
        assert!(scene.actors.contains("post"));
    }

    #[test]
    fn test_build_scene_validates_collision_size() {
        let context = GameContext::new("assets");
        let definition: MapDefinition = serde_json::from_value(serde_json::json!({
            "name": "broken",
            "cols": 4,
            "rows": 4,
            "spawn": [0.0, 0.0],
            "collision": [1, 2, 3],
        }))
        .unwrap();
        let err = context.build_scene(definition).unwrap_err();
        assert!(matches!(err, GreenwoodError::InvalidMap { .. }));
    }

    #[test]
    fn test_missing_map_file() {
        let context = GameContext::new("definitely/not/here");
        let err = context.load_map("nowhere").unwrap_err();
        assert!(matches!(err, GreenwoodError::MapNotFound(name) if name == "nowhere"));
    }
}
