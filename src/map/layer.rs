//! # Actor Layer
//!
//! Ownership and lookup for every actor on one map. Actors are stored by
//! id with a name index on the side; names are unique per map and are how
//! map data and scripts refer to actors, while ids are what components
//! carry across ticks.
//!
//! During the tick an actor is taken out of the layer while it updates, so
//! region and collision queries made on its behalf never see the actor
//! itself. [`ActorLayer::take`] and [`ActorLayer::restore`] are that
//! mechanism; the name index is left in place across the pair.

use std::collections::HashMap;

use crate::game::actor::Actor;
use crate::game::{ActorId, Rect};
use crate::{GreenwoodError, GreenwoodResult};

/// All actors on one map.
#[derive(Debug, Default)]
pub struct ActorLayer {
    /// Name of the map this layer belongs to; stamped onto actors as they
    /// are added.
    pub map_name: Option<String>,
    actors: HashMap<ActorId, Actor>,
    names: HashMap<String, ActorId>,
}

impl ActorLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_map(name: impl Into<String>) -> Self {
        Self {
            map_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Adds an actor, wiring its components. Fails if the name is already
    /// taken on this map.
    pub fn add_actor(&mut self, mut actor: Actor) -> GreenwoodResult<ActorId> {
        if self.names.contains_key(&actor.name) {
            return Err(GreenwoodError::DuplicateActor(actor.name));
        }
        actor.set_parent_map(self.map_name.clone());
        actor.refresh_components();
        let id = actor.id();
        self.names.insert(actor.name.clone(), id);
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Removes an actor by name, unwiring its components and clearing its
    /// map link. The actor itself is returned so it can move to another
    /// map.
    pub fn remove_actor(&mut self, name: &str) -> GreenwoodResult<Actor> {
        let id = self
            .names
            .remove(name)
            .ok_or_else(|| GreenwoodError::ActorNotFound(name.to_string()))?;
        let mut actor = self
            .actors
            .remove(&id)
            .ok_or_else(|| GreenwoodError::ActorNotFound(name.to_string()))?;
        actor.unwire_all();
        actor.set_parent_map(None);
        Ok(actor)
    }

    pub fn get_actor(&self, name: &str) -> GreenwoodResult<&Actor> {
        self.names
            .get(name)
            .and_then(|id| self.actors.get(id))
            .ok_or_else(|| GreenwoodError::ActorNotFound(name.to_string()))
    }

    pub fn get_actor_mut(&mut self, name: &str) -> GreenwoodResult<&mut Actor> {
        let id = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| GreenwoodError::ActorNotFound(name.to_string()))?;
        self.actors
            .get_mut(&id)
            .ok_or_else(|| GreenwoodError::ActorNotFound(name.to_string()))
    }

    pub fn get_by_id(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn get_by_id_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Takes an actor out for its update, leaving the name index intact.
    pub(crate) fn take(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Puts a taken actor back.
    pub(crate) fn restore(&mut self, actor: Actor) {
        self.actors.insert(actor.id(), actor);
    }

    /// Removes an actor by id without the taken-out bookkeeping, dropping
    /// its name entry too.
    pub fn remove_by_id(&mut self, id: ActorId) -> Option<Actor> {
        let mut actor = self.actors.remove(&id)?;
        self.names.remove(&actor.name);
        actor.unwire_all();
        actor.set_parent_map(None);
        Some(actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Actor ids in update order. Sorted by name so a tick visits actors
    /// deterministically regardless of hash order.
    pub fn update_order(&self) -> Vec<ActorId> {
        let mut order: Vec<&Actor> = self.actors.values().collect();
        order.sort_by(|a, b| a.name.cmp(&b.name));
        order.iter().map(|a| a.id()).collect()
    }

    /// Actor ids in draw order: top of the map first, names breaking ties,
    /// so southern actors overdraw northern ones.
    pub fn draw_order(&self) -> Vec<ActorId> {
        let mut order: Vec<&Actor> = self.actors.values().collect();
        order.sort_by(|a, b| {
            a.y()
                .partial_cmp(&b.y())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        order.iter().map(|a| a.id()).collect()
    }

    /// Every actor whose box intersects the region.
    pub fn get_in_region(&self, region: &Rect) -> Vec<&Actor> {
        self.actors
            .values()
            .filter(|a| a.rect().intersects(region))
            .collect()
    }

    /// Tests if any collidable actor occupies the region.
    pub fn blocks_region(&self, region: &Rect) -> bool {
        self.actors
            .values()
            .any(|a| a.is_collidable() && a.rect().intersects(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::PhysicsComponent;

    fn sized_actor(name: &str, x: f32, y: f32) -> Actor {
        let mut actor = Actor::new(name);
        actor.set_size(24.0, 24.0);
        actor.set_position(x, y);
        actor
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut layer = ActorLayer::new();
        layer.add_actor(Actor::new("sign")).unwrap();
        let err = layer.add_actor(Actor::new("sign")).unwrap_err();
        assert!(matches!(err, GreenwoodError::DuplicateActor(name) if name == "sign"));
    }

    #[test]
    fn test_add_stamps_parent_map_remove_clears_it() {
        let mut layer = ActorLayer::for_map("meadow");
        layer.add_actor(Actor::new("npc")).unwrap();
        assert_eq!(layer.get_actor("npc").unwrap().parent_map(), Some("meadow"));

        let removed = layer.remove_actor("npc").unwrap();
        assert_eq!(removed.parent_map(), None);
        assert!(!layer.contains("npc"));
    }

    #[test]
    fn test_update_order_is_name_sorted() {
        let mut layer = ActorLayer::new();
        let b = layer.add_actor(Actor::new("beta")).unwrap();
        let a = layer.add_actor(Actor::new("alpha")).unwrap();
        assert_eq!(layer.update_order(), vec![a, b]);
    }

    #[test]
    fn test_draw_order_is_y_sorted() {
        let mut layer = ActorLayer::new();
        let south = layer.add_actor(sized_actor("a_south", 0.0, 100.0)).unwrap();
        let north = layer.add_actor(sized_actor("b_north", 0.0, 10.0)).unwrap();
        assert_eq!(layer.draw_order(), vec![north, south]);
    }

    #[test]
    fn test_region_query_finds_overlapping_actors() {
        let mut layer = ActorLayer::new();
        layer.add_actor(sized_actor("near", 10.0, 10.0)).unwrap();
        layer.add_actor(sized_actor("far", 500.0, 500.0)).unwrap();

        let found = layer.get_in_region(&Rect::new(0.0, 0.0, 48.0, 48.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "near");
    }

    #[test]
    fn test_blocks_region_requires_collidable() {
        let mut layer = ActorLayer::new();
        layer.add_actor(sized_actor("ghost", 10.0, 10.0)).unwrap();
        let region = Rect::new(0.0, 0.0, 48.0, 48.0);
        assert!(!layer.blocks_region(&region));

        let mut solid = sized_actor("solid", 10.0, 10.0);
        solid.add_component(PhysicsComponent::new(0.0)).unwrap();
        layer.add_actor(solid).unwrap();
        assert!(layer.blocks_region(&region));
    }

    #[test]
    fn test_take_and_restore_keep_name_index() {
        let mut layer = ActorLayer::new();
        let id = layer.add_actor(Actor::new("hero")).unwrap();
        let actor = layer.take(id).unwrap();
        assert!(layer.get_by_id(id).is_none());
        layer.restore(actor);
        assert_eq!(layer.get_actor("hero").unwrap().id(), id);
    }
}
