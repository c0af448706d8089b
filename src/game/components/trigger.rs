//! # Trigger Component
//!
//! Edge-triggered region detection. Each tick the component compares the
//! set of actors overlapping its owner's box against the previous tick's
//! set and queues `RegionEntered` / `RegionExited` events for the
//! difference. An actor standing still inside the region generates
//! nothing: only the transitions fire.

use std::collections::HashSet;

use crate::game::actor::{Actor, ActorEvent, ActorEventKind, Component, ComponentKind};
use crate::game::{ActorId, Vec2};
use crate::map::layer::ActorLayer;
use crate::map::scene::SceneCommand;

/// What a trigger does when an actor enters its region.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerAction {
    /// Queue the events and nothing else; a scene state reacts to them.
    Notify,
    /// Send the entering actor to another map.
    Portal {
        /// Destination map name.
        map: String,
        /// Spawn position on the destination, or its default spawn.
        spawn: Option<Vec2>,
    },
}

/// Watches the owner's box for actors entering and leaving.
#[derive(Debug)]
pub struct TriggerComponent {
    owner: Option<ActorId>,
    /// Disabled triggers track nothing and fire nothing.
    pub enabled: bool,
    pub action: TriggerAction,
    previous: HashSet<ActorId>,
}

impl TriggerComponent {
    pub fn new(action: TriggerAction) -> Self {
        Self {
            owner: None,
            enabled: true,
            action,
            previous: HashSet::new(),
        }
    }

    /// Runs one detection tick. `owner` has been taken out of `actors`, so
    /// the trigger never sees itself inside its own region.
    pub fn step(&mut self, owner: &mut Actor, actors: &ActorLayer) {
        if !self.enabled {
            self.previous.clear();
            return;
        }

        let current: HashSet<ActorId> = actors
            .get_in_region(&owner.rect())
            .iter()
            .map(|a| a.id())
            .collect();

        for id in current.difference(&self.previous) {
            owner.push_event(ActorEvent::RegionEntered { other: *id });
        }
        for id in self.previous.difference(&current) {
            owner.push_event(ActorEvent::RegionExited { other: *id });
        }
        self.previous = current;
    }

    /// Actors currently inside the region, as of the last step.
    pub fn occupants(&self) -> &HashSet<ActorId> {
        &self.previous
    }
}

impl Component for TriggerComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Trigger
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    fn subscriptions(&self) -> &'static [ActorEventKind] {
        &[ActorEventKind::RegionEntered]
    }

    /// Forgets all occupants. An actor already standing inside when the
    /// trigger is rewired fires a fresh `RegionEntered` on the next step.
    fn on_refresh(&mut self) {
        self.previous.clear();
    }

    fn on_detach(&mut self) {
        self.previous.clear();
    }

    fn handle_event(&mut self, event: &ActorEvent, out: &mut Vec<SceneCommand>) {
        if let ActorEvent::RegionEntered { other } = event {
            if let TriggerAction::Portal { map, spawn } = &self.action {
                out.push(SceneCommand::Transition {
                    map: map.clone(),
                    traveler: *other,
                    spawn: *spawn,
                });
            }
        }
    }
}
