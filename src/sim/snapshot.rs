//! Read-only views handed to renderers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{BallColor, BodyKind, ControlMode, Facing, Pitch, Side, orientation};
use super::body::Body;
use super::state::SessionPhase;

/// Which goal the HUD should highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalHighlight {
    None,
    Left,
    Right,
}

/// What a body is, for choosing a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTag {
    Player {
        side: Side,
        model: u8,
        computer: bool,
        skill: u8,
    },
    RedBall,
    BlackBall,
    GoldBall,
}

/// Display state of one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: usize,
    pub tag: BodyTag,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub pitch: Pitch,
    pub alive: bool,
    pub caught: bool,
}

impl BodySnapshot {
    pub fn from_body(body: &Body) -> Self {
        let tag = match &body.kind {
            BodyKind::Player(p) => BodyTag::Player {
                side: p.side,
                model: p.model,
                computer: p.mode == ControlMode::Scripted,
                skill: p.skill,
            },
            BodyKind::Ball(b) => match b.color {
                BallColor::Red => BodyTag::RedBall,
                BallColor::Black => BodyTag::BlackBall,
            },
            BodyKind::SpecialBall(_) => BodyTag::GoldBall,
        };
        let (facing, pitch) = orientation(body);
        Self {
            id: body.id,
            tag,
            pos: body.pos,
            vel: body.vel,
            size: body.size,
            facing,
            pitch,
            alive: body.alive,
            caught: body.kind.caught(),
        }
    }
}

/// Complete renderer view after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub phase: SessionPhase,
    /// Team scores by side index
    pub scores: [u32; 2],
    pub highlighted_goal: GoalHighlight,
    pub winner: Option<Side>,
    /// Remaining ticks of the post-goal flash
    pub score_flash: u32,
    pub bodies: Vec<BodySnapshot>,
}

impl Frame {
    /// Bodies a renderer should draw
    pub fn visible(&self) -> impl Iterator<Item = &BodySnapshot> {
        self.bodies.iter().filter(|b| b.alive)
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::sim::{BodyTag, Session};

    #[test]
    fn test_frame_lists_roster_in_order() {
        let session = Session::new(Settings::default()).unwrap();
        let frame = session.frame();
        assert_eq!(frame.bodies.len(), 6);
        assert!(matches!(frame.bodies[0].tag, BodyTag::Player { computer: false, .. }));
        assert!(matches!(frame.bodies[1].tag, BodyTag::Player { computer: true, .. }));
        assert_eq!(frame.bodies[2].tag, BodyTag::RedBall);
        assert_eq!(frame.bodies[5].tag, BodyTag::GoldBall);
        // Gold ball is dormant until the session has run for a while
        assert_eq!(frame.visible().count(), 5);
    }

    #[test]
    fn test_frame_serializes_to_json() {
        let session = Session::new(Settings::default()).unwrap();
        let json = serde_json::to_string(&session.frame()).unwrap();
        assert!(json.contains("\"phase\":\"NotStarted\""));
        assert!(json.contains("\"GoldBall\""));
    }
}
