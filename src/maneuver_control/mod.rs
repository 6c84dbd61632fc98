//! Maneuver tracking state machines and the session controller that owns
//! them. Everything here is driven purely by sample timestamps; nothing
//! reads a wall clock.

mod approach;
mod bust_window;
mod glidepath;
mod path_following;
mod phase;
mod result;
mod session;
mod steep_turn;

#[cfg(test)]
mod tests;

pub use approach::{
    ApproachOutcome, ApproachTracker, ApproachUpdate, PhaseViolation, Touchdown,
    TouchdownFirmness,
};
pub use bust_window::{bust_window, BustWindowOptions, BustWindowResult};
pub use glidepath::{
    check_gate_passage, check_phase_compliance, glidepath_target_agl_ft, ComplianceReport,
    GatePassage, GlidepathGate, GLIDEPATH_GATES,
};
pub use path_following::{PathDeviations, PathFollowingTracker, PathOutcome, PathUpdate};
pub use phase::{classify_phase, ApproachPhase, PhaseContext, PHASE_RULES};
pub use result::{ManeuverKind, ManeuverOutcome, ManeuverResult, SaveGuard, TracePoint};
pub use session::{IngestReport, ManeuverSession, SessionError};
pub use steep_turn::{
    SteepTurnArmer, SteepTurnOutcome, SteepTurnProgress, SteepTurnTracker, TrackerInvalidation,
    TurnDirection,
};
