//! # Game Module
//!
//! Core spatial primitives and the actor/component runtime.
//!
//! This module contains the building blocks every other system works in
//! terms of:
//! - Vectors, rectangles, and facing directions
//! - The [`Actor`](actor::Actor) container and its component lifecycle
//! - The concrete component implementations

pub mod actor;
pub mod components;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for actors.
pub type ActorId = Uuid;

/// Creates a new unique actor ID.
pub fn new_actor_id() -> ActorId {
    Uuid::new_v4()
}

/// A 2D vector in pixel space.
///
/// The coordinate system is screen-oriented: x grows east and y grows
/// south, so north is negative y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Creates a new vector.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the vector scaled to unit length, or zero for the zero
    /// vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Squared distance to another point.
    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, scale: f32) -> Self {
        Self::new(self.x * scale, self.y * scale)
    }
}

/// An axis-aligned bounding box.
///
/// Boundaries are inclusive: two rects that merely touch along an edge
/// count as intersecting. Collision resolution relies on this when it
/// settles an actor flush against a wall.
///
/// # Examples
///
/// ```
/// use greenwood::Rect;
///
/// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
/// let b = Rect::new(5.0, 5.0, 10.0, 10.0);
/// assert!(a.intersects(&b));
/// assert!(b.intersects(&a));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Creates a new rect. Width and height must be non-negative.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (y + height). y grows south.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Tests for overlap with another rect, boundaries inclusive.
    /// Symmetric, and true for any rect against itself.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || other.right() < self.x
            || self.bottom() < other.y
            || other.bottom() < self.y)
    }

    /// Tests whether the point lies inside the rect, boundaries inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Returns a copy shifted by the given deltas.
    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Cardinal facing directions for actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit vector for the direction, in screen coordinates (north is -y).
    pub fn to_vector(self) -> Vec2 {
        match self {
            Direction::North => Vec2::new(0.0, -1.0),
            Direction::South => Vec2::new(0.0, 1.0),
            Direction::East => Vec2::new(1.0, 0.0),
            Direction::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// The opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Derives a facing from a movement vector. The x axis wins on
    /// diagonals. Returns None for the zero vector.
    pub fn from_vector(v: Vec2) -> Option<Direction> {
        if v.x > 0.0 {
            Some(Direction::East)
        } else if v.x < 0.0 {
            Some(Direction::West)
        } else if v.y < 0.0 {
            Some(Direction::North)
        } else if v.y > 0.0 {
            Some(Direction::South)
        } else {
            None
        }
    }

    /// Lowercase name, used to build animation keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}
