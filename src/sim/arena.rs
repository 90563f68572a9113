//! Arena: bounds, goals, roster and team scores
//!
//! The roster is fixed at construction and ordered players first, then red,
//! black and gold balls. Roster indices double as body ids.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{BallColor, BodyKind, ControlMode, Side};
use super::body::{Body, Bounds, Gravity};
use crate::consts::*;
use crate::settings::Settings;

/// Display models assigned to roster slots at spawn
const SPAWN_MODELS: [u8; 4] = [1, 4, 2, 3];

/// A goal at one end of the field, at mid height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalZone {
    /// The side whose goal this is; the other side scores here
    pub defended_by: Side,
    /// Scoring line, `GOAL_INSET` in from the wall
    pub line_x: f32,
    /// Goal centre height
    pub y: f32,
    /// Vertical scoring tolerance around `y`
    pub tolerance: f32,
}

impl GoalZone {
    /// Whether `holder` carrying `ball` is far enough into this goal to score
    pub fn scores(&self, holder: &Body, ball: &Body) -> bool {
        let across = match self.defended_by {
            Side::Right => holder.pos.x > self.line_x - holder.size.x,
            Side::Left => holder.pos.x < self.line_x,
        };
        across && (ball.pos.y - self.y).abs() < self.tolerance
    }

    /// Scoring rectangle as (min, max) corners, for display
    pub fn rect(&self, bounds: &Bounds) -> (Vec2, Vec2) {
        let (x0, x1) = match self.defended_by {
            Side::Left => (bounds.left, self.line_x),
            Side::Right => (self.line_x, bounds.right),
        };
        (
            Vec2::new(x0, self.y - self.tolerance),
            Vec2::new(x1, self.y + self.tolerance),
        )
    }
}

/// The playing field and everything on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub bounds: Bounds,
    pub gravity: Gravity,
    pub field_width: f32,
    pub field_height: f32,
    /// Left goal (defended by `Side::Left`) and right goal
    pub goals: [GoalZone; 2],
    /// Fixed roster, indexed by body id
    pub bodies: Vec<Body>,
    /// Team scores by side index
    pub scores: [u32; 2],
    /// Which sides hold a catchable ball this tick
    pub team_basket: [bool; 2],
}

impl Arena {
    /// Build the arena and its roster. Settings are expected to be validated.
    pub fn new(settings: &Settings) -> Self {
        let bounds = Bounds::new(
            0.0,
            settings.hud_margin,
            settings.field_width,
            settings.field_height - settings.ground_margin,
        );
        let mid_x = settings.field_width / 2.0;
        let mid_y = settings.field_height / 2.0;

        let goal = |defended_by, line_x| GoalZone {
            defended_by,
            line_x,
            y: mid_y,
            tolerance: settings.goal_tolerance,
        };
        let goals = [
            goal(Side::Left, bounds.left + GOAL_INSET),
            goal(Side::Right, bounds.right - GOAL_INSET),
        ];

        let mut bodies: Vec<Body> = Vec::new();
        let mut push = |kind: BodyKind, spawn: Vec2| {
            let size = kind.size();
            let mut body = Body::new(bodies.len(), kind, spawn, size);
            body.accel = settings.acceleration;
            body.max_speed = settings.max_speed;
            body.can_dive = settings.dive_enabled;
            bodies.push(body);
        };

        for slot in 0..settings.player_count {
            let side = Side::from_index(slot);
            let column = (slot / 2 + 1) as f32 * 100.0;
            let x = match side {
                Side::Left => bounds.left + column,
                Side::Right => bounds.right - column,
            };
            let mode = if slot < settings.human_players {
                ControlMode::Manual
            } else {
                ControlMode::Scripted
            };
            let kind = BodyKind::player(side, mode, settings.robot_skill, SPAWN_MODELS[slot % 4]);
            push(kind, Vec2::new(x, mid_y));
        }
        for i in 0..settings.red_balls {
            push(
                BodyKind::ball(BallColor::Red),
                Vec2::new(mid_x, mid_y - 20.0 - 30.0 * i as f32),
            );
        }
        for i in 0..settings.black_balls {
            push(
                BodyKind::ball(BallColor::Black),
                Vec2::new(mid_x, mid_y + 20.0 + 30.0 * i as f32),
            );
        }
        for _ in 0..settings.gold_balls {
            push(
                BodyKind::special(settings.gold_smart),
                Vec2::new(mid_x, bounds.top + 40.0),
            );
        }

        for body in bodies.iter_mut().filter(|b| b.is_special()) {
            body.accel *= GOLD_SPEED_FACTOR;
            body.max_speed *= GOLD_SPEED_FACTOR;
            body.can_dive = true;
            body.alive = false;
        }

        Self {
            bounds,
            gravity: Gravity {
                accel: settings.gravity,
                terminal_velocity: settings.terminal_velocity,
            },
            field_width: settings.field_width,
            field_height: settings.field_height,
            goals,
            bodies,
            scores: [0, 0],
            team_basket: [false, false],
        }
    }

    /// Every body in roster order
    pub fn list_bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Goal defended by `side`
    pub fn goal(&self, side: Side) -> &GoalZone {
        &self.goals[side.index()]
    }

    /// Goal that `side` scores in
    pub fn target_goal(&self, side: Side) -> &GoalZone {
        self.goal(side.opponent())
    }

    #[inline]
    pub fn mid_y(&self) -> f32 {
        self.field_height / 2.0
    }

    #[inline]
    pub fn mid_x(&self) -> f32 {
        self.field_width / 2.0
    }

    /// Indices of player bodies
    pub fn players(&self) -> impl Iterator<Item = usize> + '_ {
        self.bodies
            .iter()
            .filter(|b| b.kind.is_player())
            .map(|b| b.id)
    }

    /// Ball robots chase: the first live red ball, else the live gold ball
    pub fn chase_target(&self) -> Option<usize> {
        self.bodies
            .iter()
            .find(|b| b.alive && b.catchable() && !b.is_special())
            .or_else(|| self.bodies.iter().find(|b| b.alive && b.is_special()))
            .map(|b| b.id)
    }

    /// Teammate slot in four-player games (0<->2, 1<->3)
    pub fn teammate(&self, player: usize) -> Option<usize> {
        let players = self.players().count();
        if players < 4 || player >= players {
            return None;
        }
        Some((player + 2) % 4)
    }

    /// Put every body back at spawn and put the gold ball back to sleep.
    /// Scores are untouched.
    pub fn reset_bodies(&mut self) {
        for body in &mut self.bodies {
            body.reset();
            body.kind.set_caught(false);
            if let Some(player) = body.kind.as_player_mut() {
                player.pass_requested = false;
            }
            if body.is_special() {
                body.alive = false;
            }
        }
        self.team_basket = [false, false];
    }

    /// Full reset for a new session
    pub fn reset(&mut self) {
        self.reset_bodies();
        self.scores = [0, 0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let arena = Arena::new(&Settings::default());
        // 2 players, 1 red, 2 black, 1 gold
        assert_eq!(arena.list_bodies().len(), 6);
        assert_eq!(arena.players().count(), 2);
        assert!(arena.bodies.iter().enumerate().all(|(i, b)| b.id == i));
        assert_eq!(arena.bodies[0].kind.side(), Some(Side::Left));
        assert_eq!(arena.bodies[1].kind.side(), Some(Side::Right));
        assert_eq!(
            arena.bodies[0].kind.as_player().unwrap().mode,
            ControlMode::Manual
        );
        assert_eq!(
            arena.bodies[1].kind.as_player().unwrap().mode,
            ControlMode::Scripted
        );
        assert_eq!(arena.bodies.iter().filter(|b| b.is_special()).count(), 1);
    }

    #[test]
    fn test_gold_ball_profile() {
        let arena = Arena::new(&Settings::default());
        let gold = arena.bodies.iter().find(|b| b.is_special()).unwrap();
        assert!(!gold.alive);
        assert!(gold.can_dive);
        assert_eq!(gold.max_speed, MAX_SPEED * GOLD_SPEED_FACTOR);
        assert_eq!(gold.size, Vec2::splat(GOLD_BALL_SIZE));
    }

    #[test]
    fn test_four_player_teams() {
        let arena = Arena::new(&Settings {
            player_count: 4,
            ..Default::default()
        });
        let sides: Vec<_> = arena.players().map(|i| arena.bodies[i].kind.side().unwrap()).collect();
        assert_eq!(sides, vec![Side::Left, Side::Right, Side::Left, Side::Right]);
        assert_eq!(arena.teammate(0), Some(2));
        assert_eq!(arena.teammate(3), Some(1));
        assert_eq!(arena.bodies[2].spawn.x, 200.0);
        assert_eq!(arena.bodies[3].spawn.x, 440.0);
    }

    #[test]
    fn test_no_teammate_one_on_one() {
        let arena = Arena::new(&Settings::default());
        assert_eq!(arena.teammate(0), None);
    }

    #[test]
    fn test_bounds_reserve_margins() {
        let arena = Arena::new(&Settings::default());
        assert_eq!(arena.bounds, Bounds::new(0.0, 20.0, 640.0, 380.0));
        assert_eq!(arena.goals[0].line_x, 17.0);
        assert_eq!(arena.goals[1].line_x, 623.0);
        assert_eq!(arena.goals[1].y, 200.0);
    }

    #[test]
    fn test_goal_rect() {
        let arena = Arena::new(&Settings::default());
        let (min, max) = arena.goal(Side::Left).rect(&arena.bounds);
        assert_eq!(min, Vec2::new(0.0, 180.0));
        assert_eq!(max, Vec2::new(17.0, 220.0));
    }

    #[test]
    fn test_reset_restores_spawn_and_scores() {
        let mut arena = Arena::new(&Settings::default());
        arena.scores = [30, 20];
        arena.team_basket = [true, false];
        arena.bodies[0].pos = Vec2::new(5.0, 5.0);
        arena.bodies[0].vel = Vec2::new(1.0, 1.0);
        let gold = arena.bodies.iter().position(|b| b.is_special()).unwrap();
        arena.bodies[gold].alive = true;

        arena.reset();
        assert_eq!(arena.scores, [0, 0]);
        assert_eq!(arena.team_basket, [false, false]);
        assert_eq!(arena.bodies[0].pos, arena.bodies[0].spawn);
        assert_eq!(arena.bodies[0].vel, Vec2::ZERO);
        assert!(!arena.bodies[gold].alive);
    }

    #[test]
    fn test_chase_target_prefers_red() {
        let mut arena = Arena::new(&Settings::default());
        let red = arena.chase_target().unwrap();
        assert!(arena.bodies[red].catchable() && !arena.bodies[red].is_special());

        let mut no_red = Arena::new(&Settings {
            red_balls: 0,
            ..Default::default()
        });
        assert_eq!(no_red.chase_target(), None);
        let gold = no_red.bodies.iter().position(|b| b.is_special()).unwrap();
        no_red.bodies[gold].alive = true;
        assert_eq!(no_red.chase_target(), Some(gold));

        arena.bodies[red].alive = false;
        assert_eq!(arena.chase_target(), None);
    }
}
