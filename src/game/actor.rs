//! # Actor Module
//!
//! The actor container and its component lifecycle.
//!
//! Actors represent anything on a map that is not a tile. An actor is a
//! named, positioned box plus a set of single-responsibility components,
//! at most one per [`ComponentKind`]. Components communicate through
//! [`ActorEvent`]s queued on their owner and dispatched once per tick, so
//! no component ever holds a direct reference to a sibling.
//!
//! Construction is two-phase: add all components, then call
//! [`Actor::refresh_components`] once. Refreshing is what wires each
//! component into the event flow; a component added but never refreshed
//! receives no events. Removing a component unwires it before the owner
//! link is cleared.

use std::collections::HashSet;

use crate::game::components::{
    DialogComponent, InputComponent, InteractionComponent, PhysicsComponent, SoundComponent,
    SpriteComponent, TriggerComponent,
};
use crate::game::{new_actor_id, ActorId, Direction, Rect, Vec2};
use crate::map::collision::CollisionMap;
use crate::map::layer::ActorLayer;
use crate::map::scene::SceneCommand;
use crate::{GreenwoodError, GreenwoodResult};

/// Tags for the component slots an actor can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Input,
    Graphics,
    Physics,
    Sound,
    Dialog,
    Trigger,
    Interaction,
}

impl ComponentKind {
    /// All kinds, in event dispatch order.
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Graphics,
        ComponentKind::Sound,
        ComponentKind::Trigger,
        ComponentKind::Dialog,
        ComponentKind::Interaction,
        ComponentKind::Input,
        ComponentKind::Physics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Input => "input",
            ComponentKind::Graphics => "graphics",
            ComponentKind::Physics => "physics",
            ComponentKind::Sound => "sound",
            ComponentKind::Dialog => "dialog",
            ComponentKind::Trigger => "trigger",
            ComponentKind::Interaction => "interaction",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events queued on an actor and delivered to its wired components.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorEvent {
    /// The actor's position changed.
    Moved { x: f32, y: f32, dx: f32, dy: f32 },
    /// The movement direction vector changed. Distinct from `Moved` so
    /// animation can resync without diffing velocities.
    DirectionChanged { direction: Vec2 },
    /// The facing changed (movement or an interaction turned the actor).
    Faced { facing: Direction },
    /// Movement was blocked this tick on the flagged axes.
    Collision { collided_x: bool, collided_y: bool },
    /// Another actor entered this actor's region.
    RegionEntered { other: ActorId },
    /// Another actor left this actor's region.
    RegionExited { other: ActorId },
}

/// Discriminant for [`ActorEvent`], used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorEventKind {
    Moved,
    DirectionChanged,
    Faced,
    Collision,
    RegionEntered,
    RegionExited,
}

impl ActorEvent {
    pub fn kind(&self) -> ActorEventKind {
        match self {
            ActorEvent::Moved { .. } => ActorEventKind::Moved,
            ActorEvent::DirectionChanged { .. } => ActorEventKind::DirectionChanged,
            ActorEvent::Faced { .. } => ActorEventKind::Faced,
            ActorEvent::Collision { .. } => ActorEventKind::Collision,
            ActorEvent::RegionEntered { .. } => ActorEventKind::RegionEntered,
            ActorEvent::RegionExited { .. } => ActorEventKind::RegionExited,
        }
    }
}

/// Common lifecycle for all components.
///
/// A component belongs to exactly one actor at a time. The owner link is
/// set on attach, must not already be set, and is cleared again on detach.
pub trait Component {
    /// The slot this component fills.
    fn kind(&self) -> ComponentKind;

    /// The owning actor, if attached.
    fn owner(&self) -> Option<ActorId>;

    /// Sets or clears the owner link. Called by [`Actor`] only.
    fn set_owner(&mut self, owner: Option<ActorId>);

    /// Event kinds this component wants delivered once it is wired.
    fn subscriptions(&self) -> &'static [ActorEventKind] {
        &[]
    }

    /// Called by [`Actor::refresh_components`]. Resets transient state and
    /// prepares the component for event delivery.
    fn on_refresh(&mut self) {}

    /// Called when the component is detached. A well-behaved component
    /// drops anything tied to its old owner here.
    fn on_detach(&mut self) {}

    /// Delivers one subscribed event. Side effects that reach beyond the
    /// component itself are expressed as [`SceneCommand`]s.
    fn handle_event(&mut self, _event: &ActorEvent, _out: &mut Vec<SceneCommand>) {}
}

/// Owned wrapper over every concrete component type.
#[derive(Debug)]
pub enum ConcreteComponent {
    Input(InputComponent),
    Graphics(SpriteComponent),
    Physics(PhysicsComponent),
    Sound(SoundComponent),
    Dialog(DialogComponent),
    Trigger(TriggerComponent),
    Interaction(InteractionComponent),
}

impl ConcreteComponent {
    fn as_dyn(&self) -> &dyn Component {
        match self {
            ConcreteComponent::Input(c) => c,
            ConcreteComponent::Graphics(c) => c,
            ConcreteComponent::Physics(c) => c,
            ConcreteComponent::Sound(c) => c,
            ConcreteComponent::Dialog(c) => c,
            ConcreteComponent::Trigger(c) => c,
            ConcreteComponent::Interaction(c) => c,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn Component {
        match self {
            ConcreteComponent::Input(c) => c,
            ConcreteComponent::Graphics(c) => c,
            ConcreteComponent::Physics(c) => c,
            ConcreteComponent::Sound(c) => c,
            ConcreteComponent::Dialog(c) => c,
            ConcreteComponent::Trigger(c) => c,
            ConcreteComponent::Interaction(c) => c,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.as_dyn().kind()
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.as_dyn().owner()
    }
}

impl From<InputComponent> for ConcreteComponent {
    fn from(c: InputComponent) -> Self {
        ConcreteComponent::Input(c)
    }
}
impl From<SpriteComponent> for ConcreteComponent {
    fn from(c: SpriteComponent) -> Self {
        ConcreteComponent::Graphics(c)
    }
}
impl From<PhysicsComponent> for ConcreteComponent {
    fn from(c: PhysicsComponent) -> Self {
        ConcreteComponent::Physics(c)
    }
}
impl From<SoundComponent> for ConcreteComponent {
    fn from(c: SoundComponent) -> Self {
        ConcreteComponent::Sound(c)
    }
}
impl From<DialogComponent> for ConcreteComponent {
    fn from(c: DialogComponent) -> Self {
        ConcreteComponent::Dialog(c)
    }
}
impl From<TriggerComponent> for ConcreteComponent {
    fn from(c: TriggerComponent) -> Self {
        ConcreteComponent::Trigger(c)
    }
}
impl From<InteractionComponent> for ConcreteComponent {
    fn from(c: InteractionComponent) -> Self {
        ConcreteComponent::Interaction(c)
    }
}

/// One optional slot per component kind. The shape statically guarantees
/// the at-most-one-per-kind invariant and lets the tick pipeline borrow
/// sibling slots independently.
#[derive(Debug, Default)]
pub(crate) struct ComponentSet {
    pub(crate) input: Option<InputComponent>,
    pub(crate) graphics: Option<SpriteComponent>,
    pub(crate) physics: Option<PhysicsComponent>,
    pub(crate) sound: Option<SoundComponent>,
    pub(crate) dialog: Option<DialogComponent>,
    pub(crate) trigger: Option<TriggerComponent>,
    pub(crate) interaction: Option<InteractionComponent>,
}

impl ComponentSet {
    fn get_dyn(&self, kind: ComponentKind) -> Option<&dyn Component> {
        match kind {
            ComponentKind::Input => self.input.as_ref().map(|c| c as &dyn Component),
            ComponentKind::Graphics => self.graphics.as_ref().map(|c| c as &dyn Component),
            ComponentKind::Physics => self.physics.as_ref().map(|c| c as &dyn Component),
            ComponentKind::Sound => self.sound.as_ref().map(|c| c as &dyn Component),
            ComponentKind::Dialog => self.dialog.as_ref().map(|c| c as &dyn Component),
            ComponentKind::Trigger => self.trigger.as_ref().map(|c| c as &dyn Component),
            ComponentKind::Interaction => self.interaction.as_ref().map(|c| c as &dyn Component),
        }
    }

    fn get_dyn_mut(&mut self, kind: ComponentKind) -> Option<&mut dyn Component> {
        match kind {
            ComponentKind::Input => self.input.as_mut().map(|c| c as &mut dyn Component),
            ComponentKind::Graphics => self.graphics.as_mut().map(|c| c as &mut dyn Component),
            ComponentKind::Physics => self.physics.as_mut().map(|c| c as &mut dyn Component),
            ComponentKind::Sound => self.sound.as_mut().map(|c| c as &mut dyn Component),
            ComponentKind::Dialog => self.dialog.as_mut().map(|c| c as &mut dyn Component),
            ComponentKind::Trigger => self.trigger.as_mut().map(|c| c as &mut dyn Component),
            ComponentKind::Interaction => self.interaction.as_mut().map(|c| c as &mut dyn Component),
        }
    }

    fn take(&mut self, kind: ComponentKind) -> Option<ConcreteComponent> {
        match kind {
            ComponentKind::Input => self.input.take().map(ConcreteComponent::Input),
            ComponentKind::Graphics => self.graphics.take().map(ConcreteComponent::Graphics),
            ComponentKind::Physics => self.physics.take().map(ConcreteComponent::Physics),
            ComponentKind::Sound => self.sound.take().map(ConcreteComponent::Sound),
            ComponentKind::Dialog => self.dialog.take().map(ConcreteComponent::Dialog),
            ComponentKind::Trigger => self.trigger.take().map(ConcreteComponent::Trigger),
            ComponentKind::Interaction => self.interaction.take().map(ConcreteComponent::Interaction),
        }
    }

    fn put(&mut self, component: ConcreteComponent) {
        match component {
            ConcreteComponent::Input(c) => self.input = Some(c),
            ConcreteComponent::Graphics(c) => self.graphics = Some(c),
            ConcreteComponent::Physics(c) => self.physics = Some(c),
            ConcreteComponent::Sound(c) => self.sound = Some(c),
            ConcreteComponent::Dialog(c) => self.dialog = Some(c),
            ConcreteComponent::Trigger(c) => self.trigger = Some(c),
            ConcreteComponent::Interaction(c) => self.interaction = Some(c),
        }
    }
}

/// A positioned, named map entity composed of components.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    pub name: String,
    pub group: Option<String>,
    x: f32,
    y: f32,
    pub width: f32,
    pub height: f32,
    facing: Direction,
    parent_map: Option<String>,
    pub(crate) components: ComponentSet,
    wired: HashSet<ComponentKind>,
    pending_events: Vec<ActorEvent>,
}

impl Actor {
    /// Creates an empty actor at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_actor_id(),
            name: name.into(),
            group: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            facing: Direction::South,
            parent_map: None,
            components: ComponentSet::default(),
            wired: HashSet::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bounding box in pixel space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// The map this actor currently lives on, if any. Maintained by the
    /// actor layer.
    pub fn parent_map(&self) -> Option<&str> {
        self.parent_map.as_deref()
    }

    pub(crate) fn set_parent_map(&mut self, map: Option<String>) {
        self.parent_map = map;
    }

    /// Moves the actor and queues a `Moved` event carrying the delta.
    pub fn set_position(&mut self, x: f32, y: f32) {
        let dx = x - self.x;
        let dy = y - self.y;
        self.x = x;
        self.y = y;
        self.pending_events.push(ActorEvent::Moved { x, y, dx, dy });
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Turns the actor, queuing a `Faced` event when the facing changes.
    pub fn set_facing(&mut self, facing: Direction) {
        if self.facing != facing {
            self.facing = facing;
            self.pending_events.push(ActorEvent::Faced { facing });
        }
    }

    /// Queues an event for the next dispatch pass.
    pub fn push_event(&mut self, event: ActorEvent) {
        self.pending_events.push(event);
    }

    /// Events queued but not yet dispatched.
    pub fn pending_events(&self) -> &[ActorEvent] {
        &self.pending_events
    }

    /// Attaches a component, replacing any existing component of the same
    /// kind. The replaced component is detached (cleanup hook, unwire,
    /// owner cleared) before the new one takes the slot, and is returned.
    ///
    /// Does not wire the new component; call [`Actor::refresh_components`]
    /// once all components are in place.
    pub fn add_component(
        &mut self,
        component: impl Into<ConcreteComponent>,
    ) -> GreenwoodResult<Option<ConcreteComponent>> {
        let mut component = component.into();
        let kind = component.kind();
        if component.owner().is_some() {
            return Err(GreenwoodError::ComponentOwned { kind });
        }

        let previous = match self.components.take(kind) {
            Some(mut old) => {
                self.wired.remove(&kind);
                old.as_dyn_mut().on_detach();
                old.as_dyn_mut().set_owner(None);
                Some(old)
            }
            None => None,
        };

        component.as_dyn_mut().set_owner(Some(self.id));
        self.components.put(component);
        Ok(previous)
    }

    /// Detaches and returns the component of the given kind.
    pub fn remove_component(&mut self, kind: ComponentKind) -> GreenwoodResult<ConcreteComponent> {
        let mut component =
            self.components
                .take(kind)
                .ok_or_else(|| GreenwoodError::ComponentNotFound {
                    actor: self.name.clone(),
                    kind,
                })?;
        self.wired.remove(&kind);
        component.as_dyn_mut().on_detach();
        component.as_dyn_mut().set_owner(None);
        Ok(component)
    }

    /// Tests if a component of the given kind is attached.
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.get_dyn(kind).is_some()
    }

    /// Borrows the component of the given kind.
    pub fn get_component(&self, kind: ComponentKind) -> GreenwoodResult<&dyn Component> {
        self.components
            .get_dyn(kind)
            .ok_or_else(|| GreenwoodError::ComponentNotFound {
                actor: self.name.clone(),
                kind,
            })
    }

    /// Wires every attached component into the event flow. Call once after
    /// the initial component assembly, and again after any later
    /// add/remove.
    pub fn refresh_components(&mut self) {
        for kind in ComponentKind::ALL {
            if let Some(component) = self.components.get_dyn_mut(kind) {
                component.on_refresh();
                self.wired.insert(kind);
            }
        }
    }

    /// True once the component of the given kind has been refreshed and
    /// receives events.
    pub fn is_wired(&self, kind: ComponentKind) -> bool {
        self.wired.contains(&kind)
    }

    /// Unwires all components, e.g. when the actor leaves a map. The
    /// components stay attached and are rewired by the next refresh.
    pub(crate) fn unwire_all(&mut self) {
        self.wired.clear();
        self.pending_events.clear();
    }

    // ---- typed accessors -------------------------------------------------

    pub fn input(&self) -> GreenwoodResult<&InputComponent> {
        self.components
            .input
            .as_ref()
            .ok_or_else(|| self.missing(ComponentKind::Input))
    }

    pub fn input_mut(&mut self) -> GreenwoodResult<&mut InputComponent> {
        let name = self.name.clone();
        self.components.input.as_mut().ok_or({
            GreenwoodError::ComponentNotFound {
                actor: name,
                kind: ComponentKind::Input,
            }
        })
    }

    pub fn physics(&self) -> GreenwoodResult<&PhysicsComponent> {
        self.components
            .physics
            .as_ref()
            .ok_or_else(|| self.missing(ComponentKind::Physics))
    }

    pub fn sprite(&self) -> GreenwoodResult<&SpriteComponent> {
        self.components
            .graphics
            .as_ref()
            .ok_or_else(|| self.missing(ComponentKind::Graphics))
    }

    pub fn dialog(&self) -> GreenwoodResult<&DialogComponent> {
        self.components
            .dialog
            .as_ref()
            .ok_or_else(|| self.missing(ComponentKind::Dialog))
    }

    pub fn trigger(&self) -> GreenwoodResult<&TriggerComponent> {
        self.components
            .trigger
            .as_ref()
            .ok_or_else(|| self.missing(ComponentKind::Trigger))
    }

    pub fn interaction(&self) -> GreenwoodResult<&InteractionComponent> {
        self.components
            .interaction
            .as_ref()
            .ok_or_else(|| self.missing(ComponentKind::Interaction))
    }

    fn missing(&self, kind: ComponentKind) -> GreenwoodError {
        GreenwoodError::ComponentNotFound {
            actor: self.name.clone(),
            kind,
        }
    }

    /// Whether this actor blocks other actors' movement.
    pub fn is_collidable(&self) -> bool {
        self.components
            .physics
            .as_ref()
            .map(|p| p.collidable)
            .unwrap_or(false)
    }

    /// Stops the actor: clears held input and zeroes the movement
    /// direction.
    pub fn halt(&mut self) {
        if let Some(input) = self.components.input.as_mut() {
            input.clear();
        }
        if let Some(physics) = self.components.physics.as_mut() {
            physics.set_direction(Vec2::ZERO, &mut self.pending_events);
        }
    }

    /// Applies a steering intent: updates the physics direction vector and
    /// the facing.
    pub fn steer(&mut self, direction: Vec2) {
        if let Some(physics) = self.components.physics.as_mut() {
            physics.set_direction(direction, &mut self.pending_events);
        }
        if let Some(facing) = Direction::from_vector(direction) {
            self.set_facing(facing);
        }
    }

    /// Runs one simulation tick for this actor. The actor itself has been
    /// taken out of `others` for the duration of the call, so region and
    /// collision queries never see it.
    pub fn update(
        &mut self,
        dt: f32,
        collision: &CollisionMap,
        others: &ActorLayer,
        out: &mut Vec<SceneCommand>,
    ) {
        // Steering intent
        if let Some(mut input) = self.components.input.take() {
            let intent = input.steering(self, others, dt);
            self.components.input = Some(input);
            self.steer(intent);
        }

        // Movement and collision resolution
        if let Some(mut physics) = self.components.physics.take() {
            physics.step(dt, self, collision, others);
            self.components.physics = Some(physics);
        }

        // Region enter/exit detection
        if let Some(mut trigger) = self.components.trigger.take() {
            trigger.step(self, others);
            self.components.trigger = Some(trigger);
        }

        // Cooldown timers
        if let Some(sound) = self.components.sound.as_mut() {
            sound.update(dt);
        }

        self.dispatch_events(out);
    }

    /// Delivers every queued event to the wired components subscribed to
    /// its kind.
    pub fn dispatch_events(&mut self, out: &mut Vec<SceneCommand>) {
        let events = std::mem::take(&mut self.pending_events);
        let wired = &self.wired;
        let components = &mut self.components;
        for event in events {
            let event_kind = event.kind();
            for kind in ComponentKind::ALL {
                if !wired.contains(&kind) {
                    continue;
                }
                if let Some(component) = components.get_dyn_mut(kind) {
                    if component.subscriptions().contains(&event_kind) {
                        component.handle_event(&event, out);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{PhysicsComponent, SpriteComponent};

    fn actor_with_physics() -> Actor {
        let mut actor = Actor::new("test");
        actor.set_size(24.0, 24.0);
        actor
            .add_component(PhysicsComponent::new(100.0))
            .expect("attach physics");
        actor
    }

    #[test]
    fn test_has_component_tracks_add_and_remove() {
        let mut actor = actor_with_physics();
        assert!(actor.has_component(ComponentKind::Physics));
        actor
            .remove_component(ComponentKind::Physics)
            .expect("remove physics");
        assert!(!actor.has_component(ComponentKind::Physics));
    }

    #[test]
    fn test_attaching_owned_component_fails() {
        let donor = actor_with_physics();
        let mut physics = PhysicsComponent::new(50.0);
        // Simulate a component that still belongs to another actor
        physics.set_owner(Some(donor.id()));
        let mut actor = Actor::new("thief");
        let err = actor.add_component(physics).unwrap_err();
        assert!(matches!(
            err,
            crate::GreenwoodError::ComponentOwned {
                kind: ComponentKind::Physics
            }
        ));
    }

    #[test]
    fn test_remove_missing_component_fails() {
        let mut actor = Actor::new("empty");
        let err = actor.remove_component(ComponentKind::Sound).unwrap_err();
        assert!(matches!(
            err,
            crate::GreenwoodError::ComponentNotFound { .. }
        ));
    }

    #[test]
    fn test_owner_set_on_attach_cleared_on_detach() {
        let mut actor = actor_with_physics();
        let id = actor.id();
        assert_eq!(actor.physics().unwrap().owner(), Some(id));
        let removed = actor.remove_component(ComponentKind::Physics).unwrap();
        assert_eq!(removed.owner(), None);
    }

    #[test]
    fn test_replacing_component_detaches_old_first() {
        let mut actor = Actor::new("test");
        actor.add_component(SpriteComponent::new("king", Vec2::ZERO)).unwrap();
        actor.refresh_components();
        assert!(actor.is_wired(ComponentKind::Graphics));

        let old = actor
            .add_component(SpriteComponent::new("queen", Vec2::ZERO))
            .unwrap()
            .expect("old sprite returned");
        // Old component was detached: owner cleared, slot unwired
        assert_eq!(old.owner(), None);
        assert!(!actor.is_wired(ComponentKind::Graphics));
        assert!(actor.has_component(ComponentKind::Graphics));
    }

    #[test]
    fn test_set_position_queues_move_event() {
        let mut actor = Actor::new("test");
        actor.set_position(10.0, 20.0);
        assert_eq!(
            actor.pending_events,
            vec![ActorEvent::Moved {
                x: 10.0,
                y: 20.0,
                dx: 10.0,
                dy: 20.0
            }]
        );
    }

    #[test]
    fn test_events_only_delivered_after_refresh() {
        let mut actor = Actor::new("test");
        actor.add_component(SpriteComponent::new("king", Vec2::ZERO)).unwrap();

        // Not refreshed yet: event is dropped on dispatch
        actor.set_position(5.0, 5.0);
        actor.dispatch_events(&mut Vec::new());
        assert_eq!(actor.sprite().unwrap().position(), Vec2::ZERO);

        actor.refresh_components();
        actor.set_position(7.0, 9.0);
        actor.dispatch_events(&mut Vec::new());
        assert_eq!(actor.sprite().unwrap().position(), Vec2::new(7.0, 9.0));
    }

    #[test]
    fn test_facing_event_only_on_change() {
        let mut actor = Actor::new("test");
        actor.set_facing(Direction::South); // initial facing, no change
        assert!(actor.pending_events.is_empty());
        actor.set_facing(Direction::East);
        assert_eq!(
            actor.pending_events,
            vec![ActorEvent::Faced {
                facing: Direction::East
            }]
        );
    }
}
