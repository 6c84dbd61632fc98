#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]

pub mod common;
pub mod grading;
mod logger;
pub mod maneuver_control;

pub use common::{EntrySnapshot, PathPoint, Runway, RunwayEnd, TelemetrySample};
pub use grading::{Grade, PathSkill, SkillLevel};
pub use maneuver_control::{ApproachPhase, ManeuverResult, ManeuverSession, SessionError};
