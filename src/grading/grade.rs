use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Letter grade ladder from best to worst.
///
/// The derived `Ord` follows declaration order, so a "worse" grade compares
/// greater. Bust caps and penalty steps rely on that ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
pub enum Grade {
    #[strum(serialize = "A+")]
    #[serde(rename = "A+")]
    APlus,
    #[strum(serialize = "A")]
    #[serde(rename = "A")]
    A,
    #[strum(serialize = "A-")]
    #[serde(rename = "A-")]
    AMinus,
    #[strum(serialize = "B+")]
    #[serde(rename = "B+")]
    BPlus,
    #[strum(serialize = "B")]
    #[serde(rename = "B")]
    B,
    #[strum(serialize = "B-")]
    #[serde(rename = "B-")]
    BMinus,
    #[strum(serialize = "C+")]
    #[serde(rename = "C+")]
    CPlus,
    #[strum(serialize = "C")]
    #[serde(rename = "C")]
    C,
    #[strum(serialize = "C-")]
    #[serde(rename = "C-")]
    CMinus,
    #[strum(serialize = "D+")]
    #[serde(rename = "D+")]
    DPlus,
    #[strum(serialize = "D")]
    #[serde(rename = "D")]
    D,
    #[strum(serialize = "D-")]
    #[serde(rename = "D-")]
    DMinus,
    #[strum(serialize = "F")]
    #[serde(rename = "F")]
    F,
}

pub const GRADE_LADDER: [Grade; 13] = [
    Grade::APlus,
    Grade::A,
    Grade::AMinus,
    Grade::BPlus,
    Grade::B,
    Grade::BMinus,
    Grade::CPlus,
    Grade::C,
    Grade::CMinus,
    Grade::DPlus,
    Grade::D,
    Grade::DMinus,
    Grade::F,
];

impl From<&str> for Grade {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "A+" => Grade::APlus,
            "A" => Grade::A,
            "A-" => Grade::AMinus,
            "B+" => Grade::BPlus,
            "B" => Grade::B,
            "B-" => Grade::BMinus,
            "C+" => Grade::CPlus,
            "C" => Grade::C,
            "C-" => Grade::CMinus,
            "D+" => Grade::DPlus,
            "D" => Grade::D,
            "D-" => Grade::DMinus,
            _ => Grade::F, // TODO: conversion error should be logged
        }
    }
}

impl Grade {
    /// Returns the worse of two grades.
    pub fn worse(self, other: Grade) -> Grade { self.max(other) }

    /// Caps a grade so it never reads better than `max_allowed`.
    pub fn cap(self, max_allowed: Grade) -> Grade { self.max(max_allowed) }

    /// Position in the ladder, 0 for A+.
    pub fn rank(self) -> usize { self as usize }

    /// Quality points: A+ is worth 12, F is worth 0.
    pub fn points(self) -> u8 { 12 - self.rank() as u8 }

    /// Converts (possibly fractional) quality points back to a grade.
    pub fn from_points(points: f64) -> Grade {
        let rounded = points.round().clamp(0.0, 12.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = 12 - rounded as usize;
        GRADE_LADDER[idx]
    }

    /// Worsens the grade by `steps` ladder positions, saturating at F.
    pub fn penalize(self, steps: usize) -> Grade {
        let idx = (self.rank() + steps).min(GRADE_LADDER.len() - 1);
        GRADE_LADDER[idx]
    }

    pub fn is_passing(self) -> bool { self != Grade::F }
}
