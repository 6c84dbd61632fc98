mod grade;
mod landing_scale;
mod path_scale;
mod severity;
mod skill;
mod steep_turn_scale;

pub use grade::Grade;
pub use landing_scale::{
    grade_approach, ApproachGradeResult, PhaseDeviationSample, PhaseGrade, PhaseMaxima,
    METRIC_WEIGHTS, PHASE_WEIGHTS,
};
pub use path_scale::{grade_path_following, PathBusts, PathGradeResult};
pub use severity::{classify_severity, Severity};
pub use skill::{PassTolerances, PathSkill, SkillLevel};
pub use steep_turn_scale::{grade_steep_turn, SteepTurnBusts, SteepTurnGradeResult, TARGET_BANK};
