//! Session state and the command surface
//!
//! A [`Session`] owns the arena, the seeded RNG and the play-state machine:
//! `NotStarted -> Playing -> GameOver -> (restart) -> NotStarted`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{ControlMode, Side};
use super::arena::Arena;
use super::body::Direction;
use super::collision::ScoringRules;
use super::snapshot::{BodySnapshot, Frame, GoalHighlight};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Current phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Menu / intro; waiting for a start signal
    NotStarted,
    /// Active gameplay
    Playing,
    /// Session ended; waiting for a restart signal
    GameOver,
}

/// Input commands consumed at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// One impulse for a manually controlled player
    Move { actor: usize, dir: Direction },
    SwitchModel { actor: usize },
    SetComputerControlled { actor: usize, enabled: bool },
    /// Positive makes the robot act less often, negative more often
    AdjustSkill { actor: usize, delta: i32 },
    /// Throw the ball to the teammate on the next catch (four-player games)
    PassBall { actor: usize },
    Start,
    Restart,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: SessionPhase, to: SessionPhase },
    /// Two players collided; the lower one was knocked down
    Bumped { bumped: usize, by: usize },
    /// A black ball knocked a player down
    HitByBall { player: usize, ball: usize },
    Caught { player: usize, ball: usize },
    Passed { from: usize, to: usize, ball: usize },
    Goal { side: Side, points: u32 },
    GoldActivated { ball: usize },
    GoldCaught { side: Side, points: u32 },
}

/// One arena plus everything needed to play it deterministically
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) settings: Settings,
    pub(crate) arena: Arena,
    pub(crate) rules: ScoringRules,
    pub(crate) rng: Pcg32,
    pub(crate) phase: SessionPhase,
    /// Ticks simulated since the session started
    pub(crate) play_ticks: u64,
    /// Ticks processed since creation, including idle ones
    pub(crate) time_ticks: u64,
    pub(crate) gold_delay_ticks: u64,
    pub(crate) gold_activated: bool,
    /// Remaining ticks of the post-goal HUD flash
    pub(crate) score_flash: u32,
    pub(crate) winner: Option<Side>,
    /// Events raised by the most recent tick
    pub(crate) events: Vec<GameEvent>,
}

impl Session {
    /// Validate the settings and build a fresh arena
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let arena = Arena::new(&settings);
        log::info!(
            "Arena ready: {} players, {} bodies, seed {}",
            settings.player_count,
            arena.bodies.len(),
            settings.seed
        );
        Ok(Self {
            rules: ScoringRules::from_settings(&settings),
            rng: Pcg32::seed_from_u64(settings.seed),
            gold_delay_ticks: settings.gold_delay_ticks(),
            settings,
            arena,
            phase: SessionPhase::NotStarted,
            play_ticks: 0,
            time_ticks: 0,
            gold_activated: false,
            score_flash: 0,
            winner: None,
            events: Vec::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable arena access for scripted setups and tests
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn team_scores(&self) -> (u32, u32) {
        (self.arena.scores[0], self.arena.scores[1])
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn play_ticks(&self) -> u64 {
        self.play_ticks
    }

    /// Events raised by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Goal to highlight: the one attacked by the side holding a ball
    pub fn highlighted_goal(&self) -> GoalHighlight {
        match self.arena.team_basket {
            [true, false] => GoalHighlight::Right,
            [false, true] => GoalHighlight::Left,
            _ => GoalHighlight::None,
        }
    }

    /// Snapshot of every body in roster order
    pub fn bodies(&self) -> Vec<BodySnapshot> {
        self.arena
            .list_bodies()
            .iter()
            .map(BodySnapshot::from_body)
            .collect()
    }

    /// Everything a renderer needs for one frame
    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.time_ticks,
            phase: self.phase,
            scores: self.arena.scores,
            highlighted_goal: self.highlighted_goal(),
            winner: self.winner,
            score_flash: self.score_flash,
            bodies: self.bodies(),
        }
    }

    /// Apply one input command
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Restart => self.restart(),
            Command::Move { actor, dir } => {
                if self.phase != SessionPhase::Playing {
                    return;
                }
                let Some(body) = self.arena.bodies.get_mut(actor) else {
                    log::warn!("Move for unknown actor {actor}");
                    return;
                };
                match body.kind.as_player().map(|p| p.mode) {
                    Some(ControlMode::Manual) => body.apply_impulse(dir),
                    Some(ControlMode::Scripted) => {
                        log::debug!("Ignoring move for computer-controlled actor {actor}")
                    }
                    None => log::warn!("Move for non-player body {actor}"),
                }
            }
            Command::SwitchModel { actor } => {
                if let Some(player) = self.player_mut(actor) {
                    player.switch_model();
                }
            }
            Command::SetComputerControlled { actor, enabled } => {
                let Some(player) = self.player_mut(actor) else {
                    return;
                };
                player.mode = if enabled {
                    ControlMode::Scripted
                } else {
                    ControlMode::Manual
                };
                self.arena.bodies[actor].vel.x = 0.0;
                log::info!(
                    "Player {actor} is now {}",
                    if enabled { "computer controlled" } else { "manual" }
                );
            }
            Command::AdjustSkill { actor, delta } => {
                if let Some(player) = self.player_mut(actor) {
                    player.adjust_skill(delta);
                    log::debug!("Player {actor} skill now {}", player.skill);
                }
            }
            Command::PassBall { actor } => {
                if let Some(player) = self.player_mut(actor) {
                    player.pass_requested = true;
                }
            }
        }
    }

    fn player_mut(&mut self, actor: usize) -> Option<&mut super::actor::PlayerState> {
        let player = self
            .arena
            .bodies
            .get_mut(actor)
            .and_then(|b| b.kind.as_player_mut());
        if player.is_none() {
            log::warn!("Command for unknown player {actor}");
        }
        player
    }

    /// `NotStarted -> Playing`; zeroes scores and respawns everything
    pub fn start(&mut self) {
        if self.phase != SessionPhase::NotStarted {
            log::debug!("Start ignored in {:?}", self.phase);
            return;
        }
        self.arena.reset();
        self.play_ticks = 0;
        self.gold_activated = false;
        self.score_flash = 0;
        self.winner = None;
        self.set_phase(SessionPhase::Playing);
        log::info!("Session started");
    }

    /// Back to `NotStarted` from any phase, with scores zeroed and bodies at spawn
    pub fn restart(&mut self) {
        self.arena.reset();
        self.play_ticks = 0;
        self.gold_activated = false;
        self.score_flash = 0;
        self.winner = None;
        self.set_phase(SessionPhase::NotStarted);
        log::info!("Session reset");
    }

    /// `Playing -> GameOver`; bodies go back to spawn, scores stay for display
    pub(crate) fn end(&mut self, winner: Side) {
        self.winner = Some(winner);
        self.arena.reset_bodies();
        self.set_phase(SessionPhase::GameOver);
        let (left, right) = self.team_scores();
        log::info!("Game over: {winner:?} wins {left} to {right}");
    }

    fn set_phase(&mut self, to: SessionPhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn session() -> Session {
        Session::new(Settings::default()).unwrap()
    }

    #[test]
    fn test_invalid_settings_fail_fast() {
        let settings = Settings {
            player_count: 0,
            ..Default::default()
        };
        assert!(Session::new(settings).is_err());
    }

    #[test]
    fn test_start_only_from_not_started() {
        let mut s = session();
        assert_eq!(s.phase(), SessionPhase::NotStarted);
        s.apply(Command::Start);
        assert_eq!(s.phase(), SessionPhase::Playing);

        s.end(Side::Left);
        assert_eq!(s.phase(), SessionPhase::GameOver);
        s.apply(Command::Start);
        assert_eq!(s.phase(), SessionPhase::GameOver);

        s.apply(Command::Restart);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_restart_zeroes_scores_and_respawns() {
        let mut s = session();
        s.apply(Command::Start);
        s.arena.scores = [50, 20];
        s.arena.bodies[0].pos = Vec2::new(10.0, 30.0);
        s.arena.bodies[0].vel = Vec2::new(2.0, -1.0);
        s.end(Side::Left);
        // Game over keeps the score on display but respawns bodies
        assert_eq!(s.team_scores(), (50, 20));
        assert_eq!(s.arena.bodies[0].pos, s.arena.bodies[0].spawn);

        s.arena.bodies[0].pos = Vec2::new(10.0, 30.0);
        s.apply(Command::Restart);
        assert_eq!(s.team_scores(), (0, 0));
        assert_eq!(s.winner(), None);
        for body in &s.arena.bodies {
            assert_eq!(body.pos, body.spawn);
            assert_eq!(body.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn test_move_only_for_manual_players_while_playing() {
        let mut s = session();
        s.apply(Command::Move {
            actor: 0,
            dir: Direction::Up,
        });
        assert_eq!(s.arena.bodies[0].vel, Vec2::ZERO);

        s.apply(Command::Start);
        s.apply(Command::Move {
            actor: 0,
            dir: Direction::Up,
        });
        assert_eq!(s.arena.bodies[0].vel.y, -s.settings.acceleration);

        // Player 1 is computer controlled by default
        s.apply(Command::Move {
            actor: 1,
            dir: Direction::Up,
        });
        assert_eq!(s.arena.bodies[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_unknown_actor_is_ignored() {
        let mut s = session();
        s.apply(Command::Start);
        s.apply(Command::Move {
            actor: 99,
            dir: Direction::Left,
        });
        s.apply(Command::SwitchModel { actor: 99 });
        // A ball is not a player
        s.apply(Command::AdjustSkill { actor: 3, delta: 5 });
        assert_eq!(s.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_toggle_computer_control() {
        let mut s = session();
        s.arena.bodies[0].vel.x = 3.0;
        s.apply(Command::SetComputerControlled {
            actor: 0,
            enabled: true,
        });
        let p = s.arena.bodies[0].kind.as_player().unwrap();
        assert_eq!(p.mode, ControlMode::Scripted);
        assert_eq!(s.arena.bodies[0].vel.x, 0.0);
    }

    #[test]
    fn test_adjust_skill_and_model() {
        let mut s = session();
        s.apply(Command::AdjustSkill { actor: 1, delta: -40 });
        s.apply(Command::SwitchModel { actor: 1 });
        let p = s.arena.bodies[1].kind.as_player().unwrap();
        assert_eq!(p.skill, crate::consts::MIN_SKILL);
        assert_eq!(p.model, 0);
    }

    #[test]
    fn test_highlighted_goal() {
        let mut s = session();
        assert_eq!(s.highlighted_goal(), GoalHighlight::None);
        s.arena.team_basket = [true, false];
        assert_eq!(s.highlighted_goal(), GoalHighlight::Right);
        s.arena.team_basket = [false, true];
        assert_eq!(s.highlighted_goal(), GoalHighlight::Left);
        s.arena.team_basket = [true, true];
        assert_eq!(s.highlighted_goal(), GoalHighlight::None);
    }

    #[test]
    fn test_phase_change_events() {
        let mut s = session();
        s.apply(Command::Start);
        assert_eq!(
            s.events(),
            &[GameEvent::PhaseChanged {
                from: SessionPhase::NotStarted,
                to: SessionPhase::Playing
            }]
        );
    }
}
