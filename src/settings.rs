//! Game settings
//!
//! Every option has a default and a valid range. Settings are checked once,
//! when a session is built, so the simulation never sees an arena with a
//! broken roster or nonsensical physics.

use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    /// Band at the top kept free for the score HUD
    pub hud_margin: f32,
    /// Band at the bottom kept free for the field strip
    pub ground_margin: f32,

    // === Roster ===
    /// 2 for one-on-one, 4 for two teams of two
    pub player_count: usize,
    /// The first `human_players` players start under manual control
    pub human_players: usize,
    pub red_balls: usize,
    pub black_balls: usize,
    pub gold_balls: usize,

    // === Physics ===
    pub acceleration: f32,
    pub max_speed: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// Whether players may accelerate downward
    pub dive_enabled: bool,

    // === Scoring ===
    pub win_score: u32,
    pub points_per_goal: u32,
    pub gold_points: u32,
    /// Vertical distance from the goal that still counts as a score
    pub goal_tolerance: f32,
    /// Seconds of play before the gold ball appears
    pub gold_delay_secs: f32,

    // === AI ===
    /// Initial skill of computer-controlled players (1 = acts every tick)
    pub robot_skill: u8,
    /// Gold ball reacts to nearby players once every `gold_smart` ticks on average
    pub gold_smart: u8,

    // === Timing ===
    pub tick_interval_ms: u64,
    /// Renderer refresh interval while no session is being played
    pub idle_interval_ms: u64,

    /// RNG seed for the session
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            hud_margin: HUD_MARGIN,
            ground_margin: GROUND_MARGIN,

            player_count: 2,
            human_players: 1,
            red_balls: 1,
            black_balls: 2,
            gold_balls: 1,

            acceleration: ACCELERATION,
            max_speed: MAX_SPEED,
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            dive_enabled: true,

            win_score: WIN_SCORE,
            points_per_goal: POINTS_PER_GOAL,
            gold_points: GOLD_POINTS,
            goal_tolerance: GOAL_TOLERANCE,
            gold_delay_secs: 30.0,

            robot_skill: DEFAULT_SKILL,
            gold_smart: 1,

            tick_interval_ms: TICK_INTERVAL_MS,
            idle_interval_ms: IDLE_INTERVAL_MS,

            seed: 0,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Build settings from `key=value` style parameters on top of the defaults
    pub fn from_params<'a, I>(params: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut settings = Self::default();
        for (key, value) in params {
            settings.set_param(key, value)?;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Set one option from its textual form. Range checks happen in [`validate`](Self::validate).
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.trim();
        let value = value.trim();
        match key {
            "field_width" => self.field_width = parse(key, value)?,
            "field_height" => self.field_height = parse(key, value)?,
            "hud_margin" => self.hud_margin = parse(key, value)?,
            "ground_margin" => self.ground_margin = parse(key, value)?,
            "player_count" => self.player_count = parse(key, value)?,
            "human_players" => self.human_players = parse(key, value)?,
            "red_balls" => self.red_balls = parse(key, value)?,
            "black_balls" => self.black_balls = parse(key, value)?,
            "gold_balls" => self.gold_balls = parse(key, value)?,
            "acceleration" => self.acceleration = parse(key, value)?,
            "max_speed" => self.max_speed = parse(key, value)?,
            "gravity" => self.gravity = parse(key, value)?,
            "terminal_velocity" => self.terminal_velocity = parse(key, value)?,
            "dive_enabled" => self.dive_enabled = parse_flag(key, value)?,
            "win_score" => self.win_score = parse(key, value)?,
            "points_per_goal" => self.points_per_goal = parse(key, value)?,
            "gold_points" => self.gold_points = parse(key, value)?,
            "goal_tolerance" => self.goal_tolerance = parse(key, value)?,
            "gold_delay_secs" => self.gold_delay_secs = parse(key, value)?,
            "robot_skill" => self.robot_skill = parse(key, value)?,
            "gold_smart" => self.gold_smart = parse(key, value)?,
            "tick_interval_ms" => self.tick_interval_ms = parse(key, value)?,
            "idle_interval_ms" => self.idle_interval_ms = parse(key, value)?,
            "seed" => self.seed = parse(key, value)?,
            _ => return Err(ConfigError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    /// Check every option against its range and the cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        in_range("field_width", self.field_width, 200.0..=2000.0)?;
        // Must stay below the bump sentinel so a bumped body is always out of bounds
        in_range("field_height", self.field_height, 150.0..=960.0)?;
        in_range("hud_margin", self.hud_margin, 0.0..=100.0)?;
        in_range("ground_margin", self.ground_margin, 0.0..=100.0)?;

        if self.player_count != 2 && self.player_count != 4 {
            return Err(ConfigError::OutOfRange {
                field: "player_count",
                value: self.player_count.to_string(),
                expected: "2 or 4",
            });
        }
        if self.human_players > self.player_count {
            return Err(ConfigError::OutOfRange {
                field: "human_players",
                value: self.human_players.to_string(),
                expected: "at most player_count",
            });
        }
        in_range("red_balls", self.red_balls, 0..=4)?;
        in_range("black_balls", self.black_balls, 0..=4)?;
        in_range("gold_balls", self.gold_balls, 0..=1)?;

        positive("acceleration", self.acceleration, 20.0)?;
        positive("max_speed", self.max_speed, 40.0)?;
        in_range("gravity", self.gravity, 0.0..=5.0)?;
        positive("terminal_velocity", self.terminal_velocity, 40.0)?;
        if self.terminal_velocity > self.max_speed {
            return Err(ConfigError::Inconsistent(
                "terminal_velocity must not exceed max_speed",
            ));
        }

        in_range("win_score", self.win_score, 1..=10_000)?;
        in_range("points_per_goal", self.points_per_goal, 1..=1000)?;
        in_range("gold_points", self.gold_points, 1..=10_000)?;
        positive("goal_tolerance", self.goal_tolerance, 100.0)?;
        in_range("gold_delay_secs", self.gold_delay_secs, 0.0..=3600.0)?;

        in_range("robot_skill", self.robot_skill, MIN_SKILL..=MAX_SKILL)?;
        in_range("gold_smart", self.gold_smart, MIN_SKILL..=MAX_SKILL)?;

        in_range("tick_interval_ms", self.tick_interval_ms, 1..=1000)?;
        in_range("idle_interval_ms", self.idle_interval_ms, 1..=10_000)?;

        if self.hud_margin + self.ground_margin + PLAYER_SIZE >= self.field_height {
            return Err(ConfigError::Inconsistent(
                "field_height leaves no room for players between the margins",
            ));
        }
        Ok(())
    }

    /// Fixed simulation step
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Renderer refresh interval outside of play
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Number of Playing ticks before the gold ball activates
    pub fn gold_delay_ticks(&self) -> u64 {
        let ms = f64::from(self.gold_delay_secs) * 1000.0;
        (ms / self.tick_interval_ms as f64).ceil() as u64
    }
}

fn parse<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn in_range<T>(field: &'static str, value: T, range: RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    // NaN fails `contains`, which is what we want
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "see Settings documentation",
        })
    }
}

fn positive(field: &'static str, value: f32, max: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "a positive number",
        })
    }
}
