use crate::common::{
    bearing_deg, cross_track_nm, distance_nm, normalize_angle, KinematicView, Runway,
};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Traffic pattern phase of a landing approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApproachPhase {
    None,
    Downwind,
    Base,
    Final,
    Threshold,
    Rollout,
}

impl From<&str> for ApproachPhase {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "downwind" => ApproachPhase::Downwind,
            "base" => ApproachPhase::Base,
            "final" => ApproachPhase::Final,
            "threshold" => ApproachPhase::Threshold,
            "rollout" => ApproachPhase::Rollout,
            _ => ApproachPhase::None, // TODO: conversion error should be logged
        }
    }
}

/// Derived geometry a phase rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext {
    pub dist_threshold_nm: f64,
    pub dist_opposite_nm: f64,
    pub cross_track_abs_nm: f64,
    /// Deviation from runway heading, absolute degrees.
    pub heading_dev_deg: f64,
    /// Deviation from either perpendicular to the runway heading.
    pub perpendicular_dev_deg: f64,
    /// Deviation from the reciprocal runway heading.
    pub reciprocal_dev_deg: f64,
    pub agl_ft: f64,
    pub on_ground: bool,
    pub previous: ApproachPhase,
}

impl PhaseContext {
    pub fn new(view: &KinematicView, runway: &Runway, previous: ApproachPhase) -> Self {
        let dist_threshold_nm =
            distance_nm(view.lat, view.lon, runway.threshold.lat, runway.threshold.lon);
        let dist_opposite_nm =
            distance_nm(view.lat, view.lon, runway.opposite_end.lat, runway.opposite_end.lon);
        let cross_track_abs_nm = cross_track_nm(
            view.lat,
            view.lon,
            runway.threshold.lat,
            runway.threshold.lon,
            runway.opposite_end.lat,
            runway.opposite_end.lon,
        )
        .abs();
        let heading_dev_deg = normalize_angle(view.hdg_true - runway.heading_deg).abs();
        let perpendicular = (runway.heading_deg + 90.0) % 360.0;
        let perpendicular_dev_deg = normalize_angle(view.hdg_true - perpendicular)
            .abs()
            .min(normalize_angle(view.hdg_true - (perpendicular + 180.0)).abs());
        let reciprocal = (runway.heading_deg + 180.0) % 360.0;
        let reciprocal_dev_deg = normalize_angle(view.hdg_true - reciprocal).abs();
        Self {
            dist_threshold_nm,
            dist_opposite_nm,
            cross_track_abs_nm,
            heading_dev_deg,
            perpendicular_dev_deg,
            reciprocal_dev_deg,
            agl_ft: runway.agl_ft(view.alt_ft),
            on_ground: view.on_ground,
            previous,
        }
    }

    /// Course from the aircraft to the runway threshold, degrees true.
    pub fn bearing_to_threshold(view: &KinematicView, runway: &Runway) -> f64 {
        bearing_deg(view.lat, view.lon, runway.threshold.lat, runway.threshold.lon)
    }
}

/// One entry of the ordered classification list. Rules overlap; the first
/// match wins, so the order of [`PHASE_RULES`] is load bearing.
pub struct PhaseRule {
    pub name: &'static str,
    pub matches: fn(&PhaseContext) -> bool,
    pub result: ApproachPhase,
}

pub static PHASE_RULES: [PhaseRule; 6] = [
    PhaseRule {
        name: "rollout",
        matches: |c| {
            c.on_ground
                && c.dist_threshold_nm < 2.0
                && matches!(c.previous, ApproachPhase::Rollout | ApproachPhase::Threshold)
        },
        result: ApproachPhase::Rollout,
    },
    // Any other on-ground state ends classification before airborne rules.
    PhaseRule {
        name: "ground",
        matches: |c| c.on_ground,
        result: ApproachPhase::None,
    },
    PhaseRule {
        name: "threshold",
        matches: |c| c.dist_threshold_nm < 0.1 && c.agl_ft > 10.0 && c.agl_ft < 100.0,
        result: ApproachPhase::Threshold,
    },
    PhaseRule {
        name: "final",
        matches: |c| {
            c.dist_threshold_nm >= 0.1
                && c.dist_threshold_nm < 5.0
                && c.heading_dev_deg < 30.0
                && c.cross_track_abs_nm < 0.5
        },
        result: ApproachPhase::Final,
    },
    PhaseRule {
        name: "base",
        matches: |c| {
            c.dist_threshold_nm > 0.5
                && c.dist_threshold_nm < 3.0
                && c.perpendicular_dev_deg < 60.0
                && c.cross_track_abs_nm > 0.3
                && c.cross_track_abs_nm < 1.5
                && c.agl_ft > 300.0
                && c.agl_ft < 1500.0
        },
        result: ApproachPhase::Base,
    },
    PhaseRule {
        name: "downwind",
        matches: |c| {
            c.reciprocal_dev_deg < 30.0
                && c.cross_track_abs_nm > 0.5
                && c.cross_track_abs_nm < 1.5
                && c.agl_ft > 800.0
                && c.agl_ft < 1300.0
                && c.dist_opposite_nm < 2.0
        },
        result: ApproachPhase::Downwind,
    },
];

/// Classifies the sample into a pattern phase. Pure: identical inputs yield
/// identical outputs, all history flows through `previous`.
pub fn classify_phase(
    view: &KinematicView,
    runway: &Runway,
    previous: ApproachPhase,
) -> ApproachPhase {
    let ctx = PhaseContext::new(view, runway, previous);
    for rule in &PHASE_RULES {
        if (rule.matches)(&ctx) {
            return rule.result;
        }
    }
    ApproachPhase::None
}
