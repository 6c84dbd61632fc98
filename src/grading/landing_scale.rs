use super::grade::{Grade, GRADE_LADDER};
use super::severity::{
    severity_final_altitude, severity_final_bank, severity_final_lateral, severity_final_speed,
    severity_threshold_altitude, severity_threshold_speed, Severity,
};
use super::skill::PathSkill;
use crate::maneuver_control::ApproachPhase;
use itertools::Itertools;
use std::collections::HashMap;

const FT_PER_NM: f64 = 6076.0;

/// Relative weight of each pattern phase in the overall approach grade.
/// Weights are renormalized over the phases actually flown.
pub const PHASE_WEIGHTS: [(ApproachPhase, f64); 4] = [
    (ApproachPhase::Downwind, 0.10),
    (ApproachPhase::Base, 0.20),
    (ApproachPhase::Final, 0.50),
    (ApproachPhase::Threshold, 0.20),
];

/// Relative weight of each deviation metric inside one phase.
pub const METRIC_WEIGHTS: MetricWeights = MetricWeights {
    lateral: 0.35,
    altitude: 0.30,
    speed: 0.20,
    bank: 0.10,
    pitch: 0.05,
};

#[derive(Debug, Clone, Copy)]
pub struct MetricWeights {
    pub lateral: f64,
    pub altitude: f64,
    pub speed: f64,
    pub bank: f64,
    pub pitch: f64,
}

/// One throttled deviation sample attributed to a pattern phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDeviationSample {
    pub phase: ApproachPhase,
    /// Altitude deviation from the phase target in feet, signed.
    pub alt_dev_ft: f64,
    /// Lateral deviation from the extended centerline in NM, signed.
    pub lateral_dev_nm: f64,
    /// Airspeed deviation from the phase target in knots, signed.
    pub speed_dev_kt: f64,
    /// Absolute bank angle in degrees.
    pub bank_abs_deg: f64,
    /// Pitch deviation from the phase target in degrees, signed.
    pub pitch_dev_deg: f64,
}

struct PhaseScale {
    altitude: [f64; 12],
    lateral_ft: [f64; 12],
    speed: [f64; 12],
    bank: [f64; 12],
    pitch: [f64; 12],
}

static DOWNWIND: PhaseScale = PhaseScale {
    altitude: [50.0, 75.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0, 500.0, 600.0],
    lateral_ft: [
        400.0, 600.0, 800.0, 1000.0, 1300.0, 1600.0, 1900.0, 2200.0, 2600.0, 3000.0, 3500.0,
        4000.0,
    ],
    speed: [5.0, 7.0, 10.0, 12.0, 15.0, 18.0, 20.0, 22.0, 25.0, 28.0, 30.0, 35.0],
    bank: [15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0],
    pitch: [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0, 18.0],
};

static BASE: PhaseScale = PhaseScale {
    altitude: [60.0, 90.0, 120.0, 160.0, 200.0, 250.0, 300.0, 350.0, 400.0, 500.0, 600.0, 700.0],
    lateral_ft: [
        350.0, 500.0, 700.0, 900.0, 1100.0, 1400.0, 1700.0, 2000.0, 2400.0, 2800.0, 3300.0,
        3800.0,
    ],
    speed: [5.0, 7.0, 10.0, 12.0, 15.0, 18.0, 20.0, 22.0, 25.0, 28.0, 30.0, 35.0],
    bank: [20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0],
    pitch: [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0, 18.0],
};

static FINAL: PhaseScale = PhaseScale {
    altitude: [50.0, 75.0, 100.0, 125.0, 150.0, 175.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0],
    lateral_ft: [
        150.0, 250.0, 350.0, 450.0, 600.0, 750.0, 900.0, 1100.0, 1400.0, 1700.0, 2000.0, 2300.0,
    ],
    speed: [3.0, 5.0, 7.0, 8.0, 10.0, 12.0, 15.0, 18.0, 20.0, 22.0, 25.0, 28.0],
    bank: [10.0, 12.0, 15.0, 18.0, 20.0, 22.0, 25.0, 28.0, 30.0, 33.0, 35.0, 38.0],
    pitch: [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0, 18.0],
};

static THRESHOLD: PhaseScale = PhaseScale {
    altitude: [20.0, 30.0, 40.0, 60.0, 80.0, 100.0, 120.0, 150.0, 180.0, 220.0, 250.0, 300.0],
    lateral_ft: [
        50.0, 80.0, 120.0, 160.0, 220.0, 300.0, 380.0, 500.0, 650.0, 800.0, 1000.0, 1200.0,
    ],
    speed: [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0],
    bank: [5.0, 7.0, 10.0, 12.0, 15.0, 18.0, 20.0, 22.0, 25.0, 28.0, 30.0, 35.0],
    pitch: [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0],
};

fn phase_scale(phase: ApproachPhase) -> Option<&'static PhaseScale> {
    match phase {
        ApproachPhase::Downwind => Some(&DOWNWIND),
        ApproachPhase::Base => Some(&BASE),
        ApproachPhase::Final => Some(&FINAL),
        ApproachPhase::Threshold => Some(&THRESHOLD),
        ApproachPhase::None | ApproachPhase::Rollout => None,
    }
}

struct SkillMultipliers {
    altitude: f64,
    lateral: f64,
    speed: f64,
    bank: f64,
    pitch: f64,
}

fn multipliers(skill: PathSkill) -> SkillMultipliers {
    match skill {
        PathSkill::Acs => SkillMultipliers {
            altitude: 1.0,
            lateral: 1.0,
            speed: 1.0,
            bank: 1.0,
            pitch: 1.0,
        },
        PathSkill::Novice => SkillMultipliers {
            altitude: 1.5,
            lateral: 1.5,
            speed: 1.4,
            bank: 1.2,
            pitch: 1.3,
        },
        PathSkill::Beginner => SkillMultipliers {
            altitude: 2.5,
            lateral: 2.5,
            speed: 2.0,
            bank: 1.5,
            pitch: 1.8,
        },
    }
}

fn grade_scaled(dev_abs: f64, thresholds: &[f64; 12], multiplier: f64) -> Grade {
    for (i, limit) in thresholds.iter().enumerate() {
        if dev_abs <= limit * multiplier {
            return GRADE_LADDER[i];
        }
    }
    Grade::F
}

/// Peak absolute deviations observed within one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct PhaseMaxima {
    pub altitude_ft: f64,
    pub lateral_ft: f64,
    pub speed_kt: f64,
    pub bank_deg: f64,
    pub pitch_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PhaseGrade {
    pub grade: Grade,
    pub altitude: Grade,
    pub lateral: Grade,
    pub speed: Grade,
    pub bank: Grade,
    pub pitch: Grade,
    pub maxima: PhaseMaxima,
    pub points: f64,
}

/// Minimum samples for a phase to count toward the overall grade.
const MIN_PHASE_SAMPLES: usize = 5;

fn grade_phase(
    samples: &[&PhaseDeviationSample],
    phase: ApproachPhase,
    skill: PathSkill,
) -> Option<PhaseGrade> {
    if samples.len() < MIN_PHASE_SAMPLES {
        return None;
    }
    let scale = phase_scale(phase)?;
    let mult = multipliers(skill);

    let mut maxima = PhaseMaxima::default();
    for s in samples {
        maxima.altitude_ft = maxima.altitude_ft.max(s.alt_dev_ft.abs());
        maxima.lateral_ft = maxima.lateral_ft.max((s.lateral_dev_nm * FT_PER_NM).abs());
        maxima.speed_kt = maxima.speed_kt.max(s.speed_dev_kt.abs());
        maxima.bank_deg = maxima.bank_deg.max(s.bank_abs_deg);
        maxima.pitch_deg = maxima.pitch_deg.max(s.pitch_dev_deg.abs());
    }

    let altitude = grade_scaled(maxima.altitude_ft, &scale.altitude, mult.altitude);
    let lateral = grade_scaled(maxima.lateral_ft, &scale.lateral_ft, mult.lateral);
    let speed = grade_scaled(maxima.speed_kt, &scale.speed, mult.speed);
    let bank = grade_scaled(maxima.bank_deg, &scale.bank, mult.bank);
    let pitch = grade_scaled(maxima.pitch_deg, &scale.pitch, mult.pitch);

    let points = f64::from(altitude.points()) * METRIC_WEIGHTS.altitude
        + f64::from(lateral.points()) * METRIC_WEIGHTS.lateral
        + f64::from(speed.points()) * METRIC_WEIGHTS.speed
        + f64::from(bank.points()) * METRIC_WEIGHTS.bank
        + f64::from(pitch.points()) * METRIC_WEIGHTS.pitch;

    Some(PhaseGrade {
        grade: Grade::from_points(points),
        altitude,
        lateral,
        speed,
        bank,
        pitch,
        maxima,
        points,
    })
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ApproachGradeResult {
    pub final_grade: Grade,
    pub base_grade: Grade,
    pub phase_grades: HashMap<ApproachPhase, PhaseGrade>,
    pub final_phase_busted: bool,
    pub threshold_phase_busted: bool,
    pub penalty_steps: usize,
    pub notes: Vec<String>,
}

fn push_bust_note(notes: &mut Vec<String>, severity: Severity, metric: &str, phase: &str, steps: usize) {
    let sev = match severity {
        Severity::Mild => "Mild",
        Severity::Moderate => "Moderate",
        Severity::Severe => "Severe",
        Severity::None => return,
    };
    notes.push(format!("{sev} {metric} bust in {phase} phase: -{steps} grade steps"));
}

/// Grades a full landing approach from its per-phase deviation samples.
///
/// Each flown phase is graded on its own scale, weighted into an overall
/// point score, then bust penalties from the final and threshold phases step
/// the grade down the ladder.
pub fn grade_approach(samples: &[PhaseDeviationSample], skill: PathSkill) -> ApproachGradeResult {
    let mut phase_grades = HashMap::new();
    let mut notes = Vec::new();

    if samples.is_empty() {
        notes.push("No samples collected".to_string());
        return ApproachGradeResult {
            final_grade: Grade::F,
            base_grade: Grade::F,
            phase_grades,
            final_phase_busted: false,
            threshold_phase_busted: false,
            penalty_steps: 0,
            notes,
        };
    }

    let by_phase: HashMap<ApproachPhase, Vec<&PhaseDeviationSample>> =
        samples.iter().map(|s| (s.phase, s)).into_group_map();
    for (phase, _) in PHASE_WEIGHTS {
        if let Some(phase_samples) = by_phase.get(&phase) {
            if let Some(graded) = grade_phase(phase_samples, phase, skill) {
                phase_grades.insert(phase, graded);
            }
        }
    }

    if phase_grades.is_empty() {
        notes.push("No valid phase data collected".to_string());
        return ApproachGradeResult {
            final_grade: Grade::F,
            base_grade: Grade::F,
            phase_grades,
            final_phase_busted: false,
            threshold_phase_busted: false,
            penalty_steps: 0,
            notes,
        };
    }

    let mut total_weight = 0.0;
    let mut weighted_points = 0.0;
    for (phase, weight) in PHASE_WEIGHTS {
        if let Some(graded) = phase_grades.get(&phase) {
            total_weight += weight;
            weighted_points += graded.points * weight;
        }
    }
    let base_grade = Grade::from_points(weighted_points / total_weight);

    let mut penalty_steps = 0;
    let mut final_phase_busted = false;
    let mut threshold_phase_busted = false;

    // Final approach busts step the grade down with base cost 1.
    if let Some(final_phase) = phase_grades.get(&ApproachPhase::Final) {
        let m = final_phase.maxima;
        if m.altitude_ft > 400.0 || m.lateral_ft > 2127.0 || m.speed_kt > 20.0 || m.bank_deg > 35.0
        {
            final_phase_busted = true;
        }
        let checks = [
            (severity_final_altitude(m.altitude_ft), "altitude"),
            (severity_final_lateral(m.lateral_ft / FT_PER_NM), "lateral"),
            (severity_final_speed(m.speed_kt), "speed"),
            (severity_final_bank(m.bank_deg), "bank"),
        ];
        for (severity, metric) in checks {
            if severity > Severity::None {
                let steps = 1 + severity.steps();
                penalty_steps += steps;
                push_bust_note(&mut notes, severity, metric, "final", steps);
            }
        }
    }

    // Threshold busts are costlier, base cost 2.
    if let Some(threshold) = phase_grades.get(&ApproachPhase::Threshold) {
        let m = threshold.maxima;
        if m.altitude_ft > 200.0 || m.lateral_ft > 600.0 || m.speed_kt > 15.0 || m.bank_deg > 25.0
        {
            threshold_phase_busted = true;
        }
        let checks = [
            (severity_threshold_altitude(m.altitude_ft), "altitude"),
            (severity_threshold_speed(m.speed_kt), "speed"),
        ];
        for (severity, metric) in checks {
            if severity > Severity::None {
                let steps = 2 + severity.steps();
                penalty_steps += steps;
                push_bust_note(&mut notes, severity, metric, "threshold", steps);
            }
        }
    }

    let final_grade = base_grade.penalize(penalty_steps);

    ApproachGradeResult {
        final_grade,
        base_grade,
        phase_grades,
        final_phase_busted,
        threshold_phase_busted,
        penalty_steps,
        notes,
    }
}
