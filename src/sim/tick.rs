//! Fixed timestep simulation tick
//!
//! Order within a tick: commands, gold activation, bumps, catches and goals,
//! then steering and integration of every live body in roster order.

use super::actor::steer;
use super::collision::{resolve_bumps, resolve_catches};
use super::state::{Command, GameEvent, Session, SessionPhase};

/// Advance the session by one fixed step.
///
/// Commands are applied first so the whole tick sees a consistent input.
/// Outside of `Playing` only the commands are processed.
pub fn tick(session: &mut Session, commands: &[Command]) {
    session.events.clear();
    session.time_ticks += 1;

    for &command in commands {
        session.apply(command);
    }

    if session.phase != SessionPhase::Playing {
        return;
    }

    session.score_flash = session.score_flash.saturating_sub(1);

    // Wake the gold ball once its delay has elapsed
    if !session.gold_activated && session.play_ticks >= session.gold_delay_ticks {
        session.gold_activated = true;
        for body in session.arena.bodies.iter_mut().filter(|b| b.is_special()) {
            body.alive = true;
            log::info!("Gold ball {} is in play", body.id);
            session.events.push(GameEvent::GoldActivated { ball: body.id });
        }
    }

    let bumps = resolve_bumps(&mut session.arena);
    session.events.extend(bumps);

    let outcome = resolve_catches(&mut session.arena, &session.rules, &mut session.rng);
    if outcome
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::Goal { .. }))
    {
        session.score_flash = crate::consts::SCORE_FLASH_TICKS;
    }
    session.events.extend(outcome.events);
    if let Some(winner) = outcome.winner {
        session.end(winner);
        return;
    }

    let arena = &mut session.arena;
    for i in 0..arena.bodies.len() {
        if !arena.bodies[i].alive {
            continue;
        }
        let dirs = steer(arena, i, &mut session.rng);
        let (gravity, bounds) = (arena.gravity, arena.bounds);
        let body = &mut arena.bodies[i];
        for dir in dirs {
            body.apply_impulse(dir);
        }
        body.integrate(gravity, &bounds);
    }

    session.play_ticks += 1;
}
