use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Pass/fail tolerance window for a steep turn, checked only after the
/// maneuver is established.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassTolerances {
    pub altitude_ft: f64,
    pub airspeed_kt: f64,
    pub bank_min_deg: f64,
    pub bank_max_deg: f64,
    pub rollout_heading_deg: f64,
}

/// Pilot skill level for steep turn evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Dev,
    Beginner,
    Novice,
    Pro,
}

impl From<&str> for SkillLevel {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "dev" => SkillLevel::Dev,
            "beginner" => SkillLevel::Beginner,
            "novice" => SkillLevel::Novice,
            _ => SkillLevel::Pro, // TODO: conversion error should be logged
        }
    }
}

impl SkillLevel {
    /// Bank angle at which the turn counts as established.
    pub fn establishment_threshold_deg(self) -> f64 {
        match self {
            SkillLevel::Dev => 15.0,
            SkillLevel::Beginner => 25.0,
            SkillLevel::Novice => 35.0,
            SkillLevel::Pro => 40.0,
        }
    }

    /// Entry window: how far the bank may sit from 45 degrees for the
    /// auto-start arming check.
    pub fn entry_bank_window_deg(self) -> f64 {
        match self {
            SkillLevel::Dev => 45.0,
            SkillLevel::Beginner => 20.0,
            SkillLevel::Novice => 10.0,
            SkillLevel::Pro => 5.0,
        }
    }

    pub fn pass_tolerances(self) -> PassTolerances {
        match self {
            SkillLevel::Dev => PassTolerances {
                altitude_ft: 100_000.0,
                airspeed_kt: 2000.0,
                bank_min_deg: 0.0,
                bank_max_deg: 180.0,
                rollout_heading_deg: 90.0,
            },
            SkillLevel::Beginner => PassTolerances {
                altitude_ft: 200.0,
                airspeed_kt: 20.0,
                bank_min_deg: 35.0,
                bank_max_deg: 55.0,
                rollout_heading_deg: 20.0,
            },
            SkillLevel::Novice => PassTolerances {
                altitude_ft: 150.0,
                airspeed_kt: 15.0,
                bank_min_deg: 35.0,
                bank_max_deg: 55.0,
                rollout_heading_deg: 15.0,
            },
            SkillLevel::Pro => PassTolerances {
                altitude_ft: 100.0,
                airspeed_kt: 10.0,
                bank_min_deg: 40.0,
                bank_max_deg: 50.0,
                rollout_heading_deg: 10.0,
            },
        }
    }
}

/// Skill level for path following and approach evaluation.
///
/// Kept distinct from [`SkillLevel`]: the two maneuver families use different
/// table shapes and different default fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PathSkill {
    Acs,
    Novice,
    Beginner,
}

impl From<&str> for PathSkill {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "novice" => PathSkill::Novice,
            "beginner" => PathSkill::Beginner,
            _ => PathSkill::Acs, // TODO: conversion error should be logged
        }
    }
}
