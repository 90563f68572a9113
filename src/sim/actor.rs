//! Actor variants and their movement policies
//!
//! Every body carries a [`BodyKind`] payload. Per-kind behaviour is resolved
//! by matching on it here rather than through trait objects; [`steer`] is the
//! single dispatch point called once per body per tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::body::{Body, Direction};
use crate::consts::*;

/// Team affiliation; each side attacks the opposite goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Starts on the left, scores in the right goal
    Left,
    /// Starts on the right, scores in the left goal
    Right,
}

impl Side {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Side::Left } else { Side::Right }
    }

    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Who drives a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Impulses come from external commands
    Manual,
    /// Probabilistic steering toward the ball or the goal
    Scripted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub side: Side,
    pub mode: ControlMode,
    /// 1..=30, a scripted player acts with probability 1/skill per tick
    pub skill: u8,
    /// Display model index
    pub model: u8,
    /// Throw the ball to the teammate on the next catch pass
    pub pass_requested: bool,
}

impl PlayerState {
    pub fn adjust_skill(&mut self, delta: i32) {
        let skill = i32::from(self.skill) + delta;
        self.skill = skill.clamp(i32::from(MIN_SKILL), i32::from(MAX_SKILL)) as u8;
    }

    pub fn switch_model(&mut self) {
        self.model = (self.model + 1) % PLAYER_MODELS;
    }
}

/// Regular ball colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallColor {
    /// Catchable scoring ball
    Red,
    /// Knocks players down on contact
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub color: BallColor,
    /// Held by a player during the current tick
    pub caught: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialState {
    /// Reacts to a nearby player with probability 1/smart per tick
    pub smart: u8,
    pub caught: bool,
}

/// Per-kind payload of a [`Body`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyKind {
    Player(PlayerState),
    Ball(BallState),
    /// The gold ball
    SpecialBall(SpecialState),
}

impl BodyKind {
    pub fn player(side: Side, mode: ControlMode, skill: u8, model: u8) -> Self {
        BodyKind::Player(PlayerState {
            side,
            mode,
            skill,
            model,
            pass_requested: false,
        })
    }

    pub fn ball(color: BallColor) -> Self {
        BodyKind::Ball(BallState {
            color,
            caught: false,
        })
    }

    pub fn special(smart: u8) -> Self {
        BodyKind::SpecialBall(SpecialState {
            smart,
            caught: false,
        })
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        matches!(self, BodyKind::Player(_))
    }

    pub fn is_catchable(&self) -> bool {
        match self {
            BodyKind::Player(_) => false,
            BodyKind::Ball(ball) => ball.color == BallColor::Red,
            BodyKind::SpecialBall(_) => true,
        }
    }

    #[inline]
    pub fn is_special(&self) -> bool {
        matches!(self, BodyKind::SpecialBall(_))
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            BodyKind::Player(p) => Some(p.side),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match self {
            BodyKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match self {
            BodyKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn caught(&self) -> bool {
        match self {
            BodyKind::Player(_) => false,
            BodyKind::Ball(b) => b.caught,
            BodyKind::SpecialBall(s) => s.caught,
        }
    }

    pub fn set_caught(&mut self, caught: bool) {
        match self {
            BodyKind::Player(_) => {}
            BodyKind::Ball(b) => b.caught = caught,
            BodyKind::SpecialBall(s) => s.caught = caught,
        }
    }

    /// Box size for this kind
    pub fn size(&self) -> Vec2 {
        match self {
            BodyKind::Player(_) => Vec2::splat(PLAYER_SIZE),
            BodyKind::Ball(_) => Vec2::splat(BALL_SIZE),
            BodyKind::SpecialBall(_) => Vec2::splat(GOLD_BALL_SIZE),
        }
    }
}

/// Horizontal display orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// Vertical display orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pitch {
    Up,
    Down,
}

/// Display orientation from velocity; idle players face the goal they attack.
/// Has no physical effect.
pub fn orientation(body: &Body) -> (Facing, Pitch) {
    let facing = if body.vel.x > 0.0 {
        Facing::Right
    } else if body.vel.x < 0.0 {
        Facing::Left
    } else {
        match body.kind.side() {
            Some(Side::Right) => Facing::Left,
            _ => Facing::Right,
        }
    };
    let pitch = if body.vel.y < 0.0 { Pitch::Up } else { Pitch::Down };
    (facing, pitch)
}

/// Impulses body `index` wants to apply this tick
pub fn steer<R: Rng + ?Sized>(arena: &Arena, index: usize, rng: &mut R) -> Vec<Direction> {
    let body = &arena.bodies[index];
    if !body.alive {
        return Vec::new();
    }
    match &body.kind {
        BodyKind::Player(player) => match player.mode {
            ControlMode::Manual => Vec::new(),
            ControlMode::Scripted => steer_robot(arena, body, player, rng),
        },
        BodyKind::Ball(_) => steer_ball(arena, body, rng),
        BodyKind::SpecialBall(state) => steer_gold(arena, body, state.smart, rng),
    }
}

fn steer_robot<R: Rng + ?Sized>(
    arena: &Arena,
    body: &Body,
    player: &PlayerState,
    rng: &mut R,
) -> Vec<Direction> {
    let mut dirs = Vec::new();
    if rng.random_range(0..u32::from(player.skill.max(MIN_SKILL))) != 0 {
        return dirs;
    }

    let mid_y = arena.mid_y();
    if arena.team_basket[player.side.index()] {
        // Carry the ball to the far goal
        match player.side {
            Side::Left => {
                if body.pos.x < arena.bounds.right - ATTACK_STOP_DISTANCE {
                    dirs.push(Direction::Right);
                }
            }
            Side::Right => {
                if body.pos.x > arena.bounds.left + ATTACK_STOP_DISTANCE {
                    dirs.push(Direction::Left);
                }
            }
        }
        if body.pos.y > mid_y - CHASE_DEAD_ZONE {
            dirs.push(Direction::Up);
        }
        return dirs;
    }

    let Some(target) = arena.chase_target() else {
        return dirs;
    };
    let target = &arena.bodies[target];

    if target.pos.y < body.pos.y {
        dirs.push(Direction::Up);
    }
    if (target.pos.y - body.pos.y).abs() < CHASE_VERTICAL_WINDOW {
        if target.pos.x < body.pos.x - CHASE_DEAD_ZONE {
            dirs.push(Direction::Left);
        } else if target.pos.x > body.pos.x + CHASE_DEAD_ZONE {
            dirs.push(Direction::Right);
        }
    }
    if target.pos.y > body.pos.y {
        dirs.push(Direction::Down);
    }
    dirs
}

fn steer_ball<R: Rng + ?Sized>(arena: &Arena, body: &Body, rng: &mut R) -> Vec<Direction> {
    let mut dirs = Vec::new();
    if body.passing {
        return dirs;
    }
    if rng.random_ratio(1, BALL_WANDER_ODDS) {
        dirs.push(match rng.random_range(0..3) {
            0 => Direction::Up,
            1 => Direction::Left,
            _ => Direction::Right,
        });
    }
    if body.pos.y > arena.field_height - BALL_FLOAT_MARGIN {
        dirs.push(Direction::Up);
    }
    dirs
}

fn steer_gold<R: Rng + ?Sized>(arena: &Arena, body: &Body, smart: u8, rng: &mut R) -> Vec<Direction> {
    let mut dirs = Vec::new();
    if body.passing {
        return dirs;
    }

    let nearest = arena
        .bodies
        .iter()
        .filter(|other| other.alive && other.bumpable())
        .filter(|other| {
            let d = other.pos - body.pos;
            d.x.abs() < GOLD_SEEK_RADIUS && d.y.abs() < GOLD_SEEK_RADIUS
        })
        .min_by(|a, b| {
            let da = a.pos.distance_squared(body.pos);
            let db = b.pos.distance_squared(body.pos);
            da.total_cmp(&db)
        });

    let Some(player) = nearest else {
        return dirs;
    };
    if rng.random_range(0..u32::from(smart.max(1))) != 0 {
        return dirs;
    }

    if player.pos.x > body.pos.x {
        dirs.push(Direction::Right);
    } else if player.pos.x < body.pos.x {
        dirs.push(Direction::Left);
    }
    if player.pos.y > body.pos.y {
        dirs.push(Direction::Down);
    } else if player.pos.y < body.pos.y {
        dirs.push(Direction::Up);
    }
    dirs
}
