//! Broomsticks - a two-team arcade flying game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, scoring, session state)
//! - `scheduler`: Fixed-cadence tick driver with a command queue for input threads
//! - `settings`: Validated game configuration
//!
//! Rendering, audio and input devices live outside this crate. They read
//! [`sim::Frame`] snapshots and push [`sim::Command`]s.

pub mod error;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use scheduler::{RenderHook, Scheduler, SchedulerHandle};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default tick interval in milliseconds (~33 Hz)
    pub const TICK_INTERVAL_MS: u64 = 30;
    /// Renderer notification interval while no session is being played
    pub const IDLE_INTERVAL_MS: u64 = 1000;

    /// Velocity change per impulse
    pub const ACCELERATION: f32 = 2.0;
    /// Per-axis speed cap
    pub const MAX_SPEED: f32 = 4.0;
    /// Downward velocity added every tick
    pub const GRAVITY: f32 = 0.1;
    /// Gravity stops adding speed past this
    pub const TERMINAL_VELOCITY: f32 = 2.0;
    /// Nudge applied when a body bounces off the ceiling with zero speed
    pub const CEILING_NUDGE: f32 = 0.1;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 640.0;
    pub const FIELD_HEIGHT: f32 = 400.0;
    /// Band reserved for the score HUD at the top of the field
    pub const HUD_MARGIN: f32 = 20.0;
    /// Band reserved for the field strip at the bottom
    pub const GROUND_MARGIN: f32 = 20.0;

    /// Sprite sizes
    pub const PLAYER_SIZE: f32 = 38.0;
    pub const BALL_SIZE: f32 = 16.0;
    pub const GOLD_BALL_SIZE: f32 = 8.0;

    /// Gold ball speed and acceleration relative to the configured values
    pub const GOLD_SPEED_FACTOR: f32 = 2.0;

    /// Offset from a player's corner to the point used for ball proximity tests
    pub const PLAYER_ANCHOR_OFFSET: f32 = 8.0;
    /// Per-axis proximity for catching a ball or being hit by a black ball
    pub const CATCH_RADIUS: f32 = 20.0;
    /// Held ball x offset from the holder when moving right
    pub const HELD_BALL_OFFSET_RIGHT: f32 = 18.0;
    /// Held ball x offset from the holder otherwise
    pub const HELD_BALL_OFFSET_LEFT: f32 = 8.0;
    /// Held ball y offset below the holder
    pub const HELD_BALL_OFFSET_Y: f32 = 15.0;

    /// Bumped bodies are thrown here; the next clamp lands them on the ground
    pub const BUMP_SENTINEL_Y: f32 = 1000.0;

    /// Horizontal inset of each goal line from its side wall
    pub const GOAL_INSET: f32 = 17.0;
    /// Default vertical scoring tolerance around the goal
    pub const GOAL_TOLERANCE: f32 = 20.0;

    /// Scoring defaults
    pub const POINTS_PER_GOAL: u32 = 10;
    pub const GOLD_POINTS: u32 = 150;
    pub const WIN_SCORE: u32 = 50;
    /// Ticks the HUD flashes after a goal
    pub const SCORE_FLASH_TICKS: u32 = 15;

    /// Robot skill bounds (lower acts more often)
    pub const MIN_SKILL: u8 = 1;
    pub const MAX_SKILL: u8 = 30;
    pub const DEFAULT_SKILL: u8 = 15;
    /// Robots chase horizontally only when this close vertically
    pub const CHASE_VERTICAL_WINDOW: f32 = 100.0;
    /// Horizontal dead zone around the chase target
    pub const CHASE_DEAD_ZONE: f32 = 10.0;
    /// Robots carrying the ball stop advancing this far from the far wall
    pub const ATTACK_STOP_DISTANCE: f32 = 50.0;

    /// A ball acts on average once every this many ticks
    pub const BALL_WANDER_ODDS: u32 = 20;
    /// Balls lower than `field_height - BALL_FLOAT_MARGIN` always fly up
    pub const BALL_FLOAT_MARGIN: f32 = 90.0;
    /// Gold ball notices players inside this per-axis window
    pub const GOLD_SEEK_RADIUS: f32 = 100.0;

    /// Number of selectable player models
    pub const PLAYER_MODELS: u8 = 5;
}
