//! Shared kinematic state for every flyer
//!
//! Positions are the top-left corner of the body's box in world coordinates
//! (y grows downward). Velocities are per-tick displacements.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::BodyKind;
use crate::consts::CEILING_NUDGE;

/// Movement intent along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Playable rectangle. Bodies stay inside `[left, right - w] x [top, bottom - h]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Resting y of a body of the given height standing on the ground
    #[inline]
    pub fn ground_y(&self, height: f32) -> f32 {
        self.bottom - height
    }
}

/// World-wide gravity parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    /// Added to vy every tick
    pub accel: f32,
    /// Gravity never pushes vy past this
    pub terminal_velocity: f32,
}

/// Which edges a body touched during a clamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeContact {
    pub side_wall: bool,
    pub ceiling: bool,
    pub ground: bool,
}

impl EdgeContact {
    #[inline]
    pub fn any(&self) -> bool {
        self.side_wall || self.ceiling || self.ground
    }
}

/// A moving entity (player or ball)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Roster index, stable for the arena's lifetime
    pub id: usize,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Restored on reset
    pub spawn: Vec2,
    /// Velocity change per impulse
    pub accel: f32,
    /// Per-axis speed cap
    pub max_speed: f32,
    /// Whether `Direction::Down` impulses are honoured
    pub can_dive: bool,
    /// Multiplier on velocity when integrating position
    pub speed_scale: f32,
    /// Dormant bodies skip movement, collision and rendering
    pub alive: bool,
    /// Ball is in flight after a pass; cleared on any edge contact
    pub passing: bool,
}

impl Body {
    pub fn new(id: usize, kind: BodyKind, spawn: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos: spawn,
            vel: Vec2::ZERO,
            size,
            spawn,
            accel: crate::consts::ACCELERATION,
            max_speed: crate::consts::MAX_SPEED,
            can_dive: true,
            speed_scale: 1.0,
            alive: true,
            passing: false,
        }
    }

    /// Can knock down / be knocked down by other bumpable bodies
    #[inline]
    pub fn bumpable(&self) -> bool {
        self.kind.is_player()
    }

    /// Can be carried by a player
    #[inline]
    pub fn catchable(&self) -> bool {
        self.kind.is_catchable()
    }

    /// The primary bonus object (gold ball)
    #[inline]
    pub fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    /// Nudge velocity one step along an axis, clamped to the speed cap
    pub fn apply_impulse(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.vel.x = (self.vel.x - self.accel).max(-self.max_speed),
            Direction::Right => self.vel.x = (self.vel.x + self.accel).min(self.max_speed),
            Direction::Up => self.vel.y = (self.vel.y - self.accel).max(-self.max_speed),
            Direction::Down => {
                if self.can_dive {
                    self.vel.y = (self.vel.y + self.accel).min(self.max_speed);
                }
            }
        }
    }

    /// Advance one tick: move, apply gravity, clamp to the arena
    pub fn integrate(&mut self, gravity: Gravity, bounds: &Bounds) -> EdgeContact {
        self.pos += self.vel * self.speed_scale;

        if self.vel.y < gravity.terminal_velocity {
            self.vel.y = (self.vel.y + gravity.accel).min(gravity.terminal_velocity);
        }

        self.clamp_to_bounds(bounds)
    }

    /// Pin the body inside the arena, bouncing off walls and ceiling and
    /// landing dead on the ground
    pub fn clamp_to_bounds(&mut self, bounds: &Bounds) -> EdgeContact {
        let mut contact = EdgeContact::default();

        if self.pos.x < bounds.left {
            self.pos.x = bounds.left;
            self.vel.x = -self.vel.x;
            contact.side_wall = true;
        }

        let max_x = bounds.right - self.size.x;
        if self.pos.x > max_x {
            self.pos.x = max_x;
            self.vel.x = -self.vel.x;
            contact.side_wall = true;
        }

        if self.pos.y < bounds.top {
            self.pos.y = bounds.top;
            self.vel.y = -self.vel.y;
            // Zero speed at the ceiling would pin the body there
            if self.vel.y == 0.0 {
                self.vel.y += CEILING_NUDGE;
            }
            contact.ceiling = true;
        }

        let ground = bounds.ground_y(self.size.y);
        if self.pos.y > ground {
            self.pos.y = ground;
            self.vel = Vec2::ZERO;
            contact.ground = true;
        }

        if contact.any() {
            self.passing = false;
        }
        contact
    }

    /// Knock the body down: the next clamp puts it on the ground
    pub fn bump(&mut self) {
        self.pos.y = crate::consts::BUMP_SENTINEL_Y;
        self.vel = Vec2::ZERO;
    }

    /// Return to spawn at rest
    pub fn reset(&mut self) {
        self.pos = self.spawn;
        self.vel = Vec2::ZERO;
        self.passing = false;
    }
}
