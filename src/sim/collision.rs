//! Pairwise interactions: bumps, catches and goals
//!
//! Runs once per tick over every live pair. The roster is tiny (at most ten
//! bodies) so plain O(n^2) loops in roster order are used throughout, which
//! also makes the outcome deterministic.

use glam::Vec2;
use rand::Rng;

use super::actor::Side;
use super::arena::Arena;
use super::state::GameEvent;
use crate::consts::*;
use crate::settings::Settings;

/// Point values and the win threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub points_per_goal: u32,
    pub gold_points: u32,
    pub win_score: u32,
}

impl ScoringRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            points_per_goal: settings.points_per_goal,
            gold_points: settings.gold_points,
            win_score: settings.win_score,
        }
    }
}

/// Result of one catch pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchOutcome {
    pub events: Vec<GameEvent>,
    /// Set when the pass ended the session; holds the winning side
    pub winner: Option<Side>,
}

/// Per-axis proximity between a player's anchor point and a ball
#[inline]
fn near_anchor(player_pos: Vec2, ball_pos: Vec2) -> bool {
    let d = (player_pos + Vec2::splat(PLAYER_ANCHOR_OFFSET) - ball_pos).abs();
    d.x < CATCH_RADIUS && d.y < CATCH_RADIUS
}

/// Knock down the lower of any two overlapping players, and any player
/// touched by a black ball.
///
/// The lower body (larger y) is thrown to the bump sentinel; equal heights
/// leave both alone. Calling this again before bodies move changes nothing.
pub fn resolve_bumps(arena: &mut Arena) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let n = arena.bodies.len();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (f1, f2) = (&arena.bodies[i], &arena.bodies[j]);
            if !(f1.alive && f2.alive && f1.bumpable() && f2.bumpable()) {
                continue;
            }
            let d = (f1.pos - f2.pos).abs();
            if !(d.x < f1.size.x && d.y < f1.size.y) {
                continue;
            }
            let (bumped, by) = if f1.pos.y < f2.pos.y {
                (j, i)
            } else if f2.pos.y < f1.pos.y {
                (i, j)
            } else {
                continue;
            };
            log::trace!("player {by} knocked down player {bumped}");
            arena.bodies[bumped].bump();
            events.push(GameEvent::Bumped { bumped, by });
        }
    }

    for p in 0..n {
        for b in 0..n {
            let (player, ball) = (&arena.bodies[p], &arena.bodies[b]);
            let is_bumper = !ball.bumpable() && !ball.catchable();
            if !(player.alive && ball.alive && player.bumpable() && is_bumper) {
                continue;
            }
            if near_anchor(player.pos, ball.pos) {
                log::trace!("ball {b} knocked down player {p}");
                arena.bodies[p].bump();
                events.push(GameEvent::HitByBall { player: p, ball: b });
            }
        }
    }

    events
}

/// Attach catchable balls to nearby players, perform requested passes and
/// award goals.
///
/// Players are visited in roster order; a ball claimed by an earlier player
/// is not available to later ones in the same tick. Catching the gold ball
/// ends the session on the spot.
pub fn resolve_catches<R: Rng + ?Sized>(
    arena: &mut Arena,
    rules: &ScoringRules,
    rng: &mut R,
) -> CatchOutcome {
    let mut outcome = CatchOutcome::default();
    arena.team_basket = [false, false];
    for body in &mut arena.bodies {
        body.kind.set_caught(false);
    }

    let players: Vec<usize> = arena.players().collect();
    for p in players {
        let holder = &arena.bodies[p];
        if !holder.alive {
            continue;
        }
        let (holder_pos, holder_vel) = (holder.pos, holder.vel);
        let Some(player) = holder.kind.as_player() else {
            continue;
        };
        let side = player.side;
        let wants_pass = player.pass_requested;

        for b in 0..arena.bodies.len() {
            let ball = &arena.bodies[b];
            if !(ball.alive && ball.catchable()) || ball.kind.caught() {
                continue;
            }
            if !near_anchor(holder_pos, ball.pos) {
                continue;
            }

            let x_offset = if holder_vel.x > 0.0 {
                HELD_BALL_OFFSET_RIGHT
            } else {
                HELD_BALL_OFFSET_LEFT
            };
            let ball = &mut arena.bodies[b];
            ball.pos = holder_pos + Vec2::new(x_offset, HELD_BALL_OFFSET_Y);
            ball.kind.set_caught(true);
            let special = ball.is_special();
            log::debug!("player {p} caught ball {b}");
            outcome.events.push(GameEvent::Caught { player: p, ball: b });

            if special {
                arena.team_basket[side.index()] = true;
                arena.scores[side.index()] += rules.gold_points;
                log::info!(
                    "Gold ball caught by player {p}! {} to {}",
                    arena.scores[0],
                    arena.scores[1]
                );
                outcome.events.push(GameEvent::GoldCaught {
                    side,
                    points: rules.gold_points,
                });
                outcome.winner = Some(side);
                return outcome;
            }

            if wants_pass {
                if let Some(to) = pass_ball(arena, p, b, rng) {
                    // In flight, not held
                    arena.bodies[b].kind.set_caught(false);
                    outcome.events.push(GameEvent::Passed {
                        from: p,
                        to,
                        ball: b,
                    });
                    continue;
                }
            }

            arena.team_basket[side.index()] = true;
            let goal = *arena.target_goal(side);
            if goal.scores(&arena.bodies[p], &arena.bodies[b]) {
                arena.scores[side.index()] += rules.points_per_goal;
                arena.bodies[b].pos.x = arena.mid_x();
                log::info!("Score! {} to {}", arena.scores[0], arena.scores[1]);
                outcome.events.push(GameEvent::Goal {
                    side,
                    points: rules.points_per_goal,
                });
                if arena.scores[side.index()] >= rules.win_score {
                    outcome.winner = Some(side);
                    return outcome;
                }
            }
        }

        if let Some(player) = arena.bodies[p].kind.as_player_mut() {
            player.pass_requested = false;
        }
    }

    outcome
}

/// Throw ball `b` from player `p` toward the teammate. Returns the receiver.
fn pass_ball<R: Rng + ?Sized>(arena: &mut Arena, p: usize, b: usize, rng: &mut R) -> Option<usize> {
    let to = arena.teammate(p)?;
    let dir = (arena.bodies[to].pos - arena.bodies[p].pos).normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    let ball = &mut arena.bodies[b];
    ball.vel = dir * ball.max_speed;
    let jitter = Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * 5.0;
    ball.pos += ball.vel * 6.0 + jitter;
    ball.passing = true;
    log::debug!("player {p} passed ball {b} to player {to}");
    Some(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{BallColor, BallState, BodyKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn arena() -> Arena {
        Arena::new(&Settings::default())
    }

    fn rules() -> ScoringRules {
        ScoringRules::from_settings(&Settings::default())
    }

    fn index_of(arena: &Arena, pred: impl Fn(&BodyKind) -> bool) -> usize {
        arena.bodies.iter().position(|b| pred(&b.kind)).unwrap()
    }

    fn red(arena: &Arena) -> usize {
        index_of(arena, |k| matches!(k, BodyKind::Ball(BallState { color: BallColor::Red, .. })))
    }

    fn black(arena: &Arena) -> usize {
        index_of(arena, |k| matches!(k, BodyKind::Ball(BallState { color: BallColor::Black, .. })))
    }

    /// Move every ball far away from the players
    fn park_balls(arena: &mut Arena) {
        for body in arena.bodies.iter_mut().filter(|b| !b.kind.is_player()) {
            body.pos = Vec2::new(320.0, 40.0);
        }
    }

    #[test]
    fn test_lower_player_is_bumped() {
        let mut a = arena();
        park_balls(&mut a);
        a.bodies[0].pos = Vec2::new(300.0, 200.0);
        a.bodies[1].pos = Vec2::new(310.0, 225.0);

        let events = resolve_bumps(&mut a);
        assert_eq!(a.bodies[1].pos.y, BUMP_SENTINEL_Y);
        assert_eq!(a.bodies[1].vel, Vec2::ZERO);
        assert_eq!(a.bodies[0].pos, Vec2::new(300.0, 200.0));
        assert_eq!(events, vec![GameEvent::Bumped { bumped: 1, by: 0 }]);
    }

    #[test]
    fn test_bump_independent_of_roster_order() {
        let mut a = arena();
        park_balls(&mut a);
        a.bodies[0].pos = Vec2::new(300.0, 225.0);
        a.bodies[1].pos = Vec2::new(310.0, 200.0);
        resolve_bumps(&mut a);
        assert_eq!(a.bodies[0].pos.y, BUMP_SENTINEL_Y);
        assert_eq!(a.bodies[1].pos.y, 200.0);
    }

    #[test]
    fn test_equal_height_no_bump() {
        let mut a = arena();
        park_balls(&mut a);
        a.bodies[0].pos = Vec2::new(300.0, 200.0);
        a.bodies[1].pos = Vec2::new(310.0, 200.0);
        let events = resolve_bumps(&mut a);
        assert!(events.is_empty());
        assert_eq!(a.bodies[0].pos.y, 200.0);
        assert_eq!(a.bodies[1].pos.y, 200.0);
    }

    #[test]
    fn test_bumps_are_idempotent() {
        let mut a = arena();
        park_balls(&mut a);
        a.bodies[0].pos = Vec2::new(300.0, 200.0);
        a.bodies[1].pos = Vec2::new(310.0, 230.0);
        resolve_bumps(&mut a);
        let first: Vec<Vec2> = a.bodies.iter().map(|b| b.pos).collect();
        let again = resolve_bumps(&mut a);
        let second: Vec<Vec2> = a.bodies.iter().map(|b| b.pos).collect();
        assert!(again.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_bumped_player_lands_on_ground() {
        let mut a = arena();
        park_balls(&mut a);
        a.bodies[0].pos = Vec2::new(300.0, 200.0);
        a.bodies[1].pos = Vec2::new(300.0, 236.0);
        resolve_bumps(&mut a);
        assert_eq!(a.bodies[1].pos.y, BUMP_SENTINEL_Y);
        let bounds = a.bounds;
        a.bodies[1].clamp_to_bounds(&bounds);
        assert_eq!(a.bodies[1].pos.y, bounds.ground_y(PLAYER_SIZE));
        assert_eq!(a.bodies[0].pos.y, 200.0);
    }

    #[test]
    fn test_black_ball_bumps_player() {
        let mut a = arena();
        park_balls(&mut a);
        let b = black(&a);
        a.bodies[0].pos = Vec2::new(100.0, 150.0);
        a.bodies[b].pos = Vec2::new(115.0, 160.0);
        let events = resolve_bumps(&mut a);
        assert_eq!(a.bodies[0].pos.y, BUMP_SENTINEL_Y);
        assert_eq!(events, vec![GameEvent::HitByBall { player: 0, ball: b }]);
        // The ball itself is not moved
        assert_eq!(a.bodies[b].pos, Vec2::new(115.0, 160.0));
    }

    #[test]
    fn test_dormant_bodies_are_ignored() {
        let mut a = arena();
        park_balls(&mut a);
        let b = black(&a);
        a.bodies[b].alive = false;
        a.bodies[0].pos = Vec2::new(100.0, 150.0);
        a.bodies[b].pos = Vec2::new(110.0, 155.0);
        assert!(resolve_bumps(&mut a).is_empty());
    }

    #[test]
    fn test_catch_snaps_ball_in_front() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[0].pos = Vec2::new(200.0, 150.0);
        a.bodies[0].vel = Vec2::new(2.0, 0.0);
        a.bodies[r].pos = Vec2::new(210.0, 160.0);

        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.bodies[r].pos, Vec2::new(218.0, 165.0));
        assert!(a.bodies[r].kind.caught());
        assert_eq!(a.team_basket, [true, false]);
        assert_eq!(outcome.events, vec![GameEvent::Caught { player: 0, ball: r }]);

        // Facing left (or idle) holds the ball closer
        a.bodies[0].vel = Vec2::new(-2.0, 0.0);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.bodies[r].pos, Vec2::new(208.0, 165.0));
    }

    #[test]
    fn test_basket_clears_when_ball_is_dropped() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[0].pos = Vec2::new(200.0, 150.0);
        a.bodies[r].pos = Vec2::new(205.0, 155.0);
        let mut rng = Pcg32::seed_from_u64(1);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.team_basket, [true, false]);

        a.bodies[r].pos = Vec2::new(500.0, 60.0);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.team_basket, [false, false]);
        assert!(!a.bodies[r].kind.caught());
    }

    #[test]
    fn test_catch_at_goal_scores_and_respawns() {
        // Player at the right goal carrying the ball at goal height
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[0].pos = Vec2::new(630.0, 200.0);
        a.bodies[0].vel = Vec2::new(1.0, 0.0);
        a.bodies[r].pos = Vec2::new(634.0, 202.0);

        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.scores, [10, 0]);
        assert_eq!(a.bodies[r].pos, Vec2::new(320.0, 215.0));
        assert_eq!(outcome.winner, None);
        assert!(outcome.events.contains(&GameEvent::Goal {
            side: Side::Left,
            points: 10
        }));
    }

    #[test]
    fn test_no_score_in_own_goal() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        // Left player in the left goal
        a.bodies[0].pos = Vec2::new(2.0, 190.0);
        a.bodies[r].pos = Vec2::new(10.0, 200.0);
        let mut rng = Pcg32::seed_from_u64(1);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.scores, [0, 0]);
        assert!(a.bodies[r].kind.caught());
    }

    #[test]
    fn test_right_side_scores_left() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[1].pos = Vec2::new(5.0, 190.0);
        a.bodies[r].pos = Vec2::new(10.0, 195.0);
        let mut rng = Pcg32::seed_from_u64(1);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.scores, [0, 10]);
    }

    #[test]
    fn test_score_needs_goal_height() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[0].pos = Vec2::new(630.0, 100.0);
        a.bodies[r].pos = Vec2::new(634.0, 102.0);
        let mut rng = Pcg32::seed_from_u64(1);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.scores, [0, 0]);
    }

    #[test]
    fn test_reaching_win_score_ends_session() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.scores = [40, 0];
        a.bodies[0].pos = Vec2::new(630.0, 200.0);
        a.bodies[r].pos = Vec2::new(634.0, 202.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.scores, [50, 0]);
        assert_eq!(outcome.winner, Some(Side::Left));
    }

    #[test]
    fn test_gold_catch_ends_session_anywhere() {
        let mut a = arena();
        park_balls(&mut a);
        let gold = a.bodies.iter().position(|b| b.is_special()).unwrap();
        a.bodies[gold].alive = true;
        a.bodies[1].pos = Vec2::new(300.0, 250.0);
        a.bodies[gold].pos = Vec2::new(305.0, 262.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(a.scores, [0, GOLD_POINTS]);
        assert_eq!(outcome.winner, Some(Side::Right));
        assert!(outcome.events.contains(&GameEvent::GoldCaught {
            side: Side::Right,
            points: GOLD_POINTS
        }));
    }

    #[test]
    fn test_dormant_gold_cannot_be_caught() {
        let mut a = arena();
        park_balls(&mut a);
        let gold = a.bodies.iter().position(|b| b.is_special()).unwrap();
        a.bodies[1].pos = Vec2::new(300.0, 250.0);
        a.bodies[gold].pos = Vec2::new(305.0, 262.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_first_player_in_roster_keeps_contested_ball() {
        let mut a = arena();
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[0].pos = Vec2::new(300.0, 150.0);
        a.bodies[1].pos = Vec2::new(302.0, 150.0);
        a.bodies[r].pos = Vec2::new(310.0, 158.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert_eq!(outcome.events, vec![GameEvent::Caught { player: 0, ball: r }]);
        assert_eq!(a.team_basket, [true, false]);
        assert_eq!(a.bodies[r].pos, Vec2::new(308.0, 165.0));
    }

    #[test]
    fn test_pass_throws_ball_to_teammate() {
        let mut a = Arena::new(&Settings {
            player_count: 4,
            ..Default::default()
        });
        park_balls(&mut a);
        let r = red(&a);
        a.bodies[0].pos = Vec2::new(100.0, 200.0);
        a.bodies[2].pos = Vec2::new(300.0, 200.0);
        a.bodies[r].pos = Vec2::new(110.0, 210.0);
        a.bodies[0].kind.as_player_mut().unwrap().pass_requested = true;

        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolve_catches(&mut a, &rules(), &mut rng);
        assert!(outcome.events.contains(&GameEvent::Passed {
            from: 0,
            to: 2,
            ball: r
        }));
        let ball = &a.bodies[r];
        assert!(ball.passing);
        assert!(!ball.kind.caught());
        assert_eq!(a.team_basket, [false, false]);
        assert_eq!(ball.vel, Vec2::new(ball.max_speed, 0.0));
        assert!(ball.pos.x > 108.0 + 6.0 * ball.max_speed - 0.01);
        assert!(!a.bodies[0].kind.as_player().unwrap().pass_requested);
    }

    #[test]
    fn test_pass_request_consumed_without_ball() {
        let mut a = Arena::new(&Settings {
            player_count: 4,
            ..Default::default()
        });
        park_balls(&mut a);
        a.bodies[0].kind.as_player_mut().unwrap().pass_requested = true;
        let mut rng = Pcg32::seed_from_u64(1);
        resolve_catches(&mut a, &rules(), &mut rng);
        assert!(!a.bodies[0].kind.as_player().unwrap().pass_requested);
    }
}
