//! # Dialog and Interaction Components
//!
//! [`DialogComponent`] marks an actor as having something to say and
//! carries the text. [`InteractionComponent`] gives an actor the ability
//! to probe for dialog targets: a directional reach box projected from
//! the side of the actor it is facing.

use crate::config;
use crate::game::actor::{Actor, Component, ComponentKind};
use crate::game::{ActorId, Direction, Rect};

/// Text an actor speaks when interacted with.
#[derive(Debug, Clone)]
pub struct DialogComponent {
    owner: Option<ActorId>,
    /// Lines of dialog, shown one per interact press.
    pub text: Vec<String>,
}

impl DialogComponent {
    pub fn new(text: Vec<String>) -> Self {
        Self { owner: None, text }
    }
}

impl Component for DialogComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Dialog
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }
}

/// Lets an actor reach out and interact with what is in front of it.
#[derive(Debug)]
pub struct InteractionComponent {
    owner: Option<ActorId>,
    /// How far the probe extends past the actor's edge, in pixels.
    pub reach: f32,
}

impl Default for InteractionComponent {
    fn default() -> Self {
        Self::new(config::INTERACT_REACH)
    }
}

impl InteractionComponent {
    pub fn new(reach: f32) -> Self {
        Self { owner: None, reach }
    }

    /// The probe region for `owner`: a box the width (or height) of the
    /// actor, extending `reach` pixels from the faced edge.
    pub fn reach_rect(&self, owner: &Actor) -> Rect {
        let r = owner.rect();
        match owner.facing() {
            Direction::East => Rect::new(r.right(), r.y, self.reach, r.height),
            Direction::West => Rect::new(r.x - self.reach, r.y, self.reach, r.height),
            Direction::North => Rect::new(r.x, r.y - self.reach, r.width, self.reach),
            Direction::South => Rect::new(r.x, r.bottom(), r.width, self.reach),
        }
    }
}

impl Component for InteractionComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Interaction
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prober(facing: Direction) -> Actor {
        let mut actor = Actor::new("prober");
        actor.set_size(24.0, 24.0);
        actor.set_position(100.0, 100.0);
        actor.set_facing(facing);
        actor
    }

    #[test]
    fn test_reach_rect_extends_from_faced_edge() {
        let probe = InteractionComponent::new(24.0);

        let east = probe.reach_rect(&prober(Direction::East));
        assert_eq!(east, Rect::new(124.0, 100.0, 24.0, 24.0));

        let west = probe.reach_rect(&prober(Direction::West));
        assert_eq!(west, Rect::new(76.0, 100.0, 24.0, 24.0));

        let north = probe.reach_rect(&prober(Direction::North));
        assert_eq!(north, Rect::new(100.0, 76.0, 24.0, 24.0));

        let south = probe.reach_rect(&prober(Direction::South));
        assert_eq!(south, Rect::new(100.0, 124.0, 24.0, 24.0));
    }
}
