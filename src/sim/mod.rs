//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by roster index)
//! - No rendering, timing or threading dependencies

pub mod actor;
pub mod arena;
pub mod body;
pub mod collision;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use actor::{
    BallColor, BallState, BodyKind, ControlMode, Facing, Pitch, PlayerState, Side, SpecialState,
    orientation, steer,
};
pub use arena::{Arena, GoalZone};
pub use body::{Body, Bounds, Direction, EdgeContact, Gravity};
pub use collision::{CatchOutcome, ScoringRules, resolve_bumps, resolve_catches};
pub use snapshot::{BodySnapshot, BodyTag, Frame, GoalHighlight};
pub use state::{Command, GameEvent, Session, SessionPhase};
pub use tick::tick;
