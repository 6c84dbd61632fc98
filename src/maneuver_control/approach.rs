use super::glidepath::{
    check_gate_passage, check_phase_compliance, glidepath_target_agl_ft, GatePassage,
};
use super::phase::{classify_phase, ApproachPhase};
use crate::common::{cross_track_nm, distance_nm, normalize_angle, KinematicView, Runway};
use crate::grading::{grade_approach, ApproachGradeResult, PathSkill, PhaseDeviationSample};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

const FT_PER_NM: f64 = 6076.0;
/// Deviation samples are only collected inside this range of the threshold.
const SAMPLE_RANGE_NM: f64 = 5.0;
/// Per-phase deviation samples update at most this often.
const SAMPLE_THROTTLE: TimeDelta = TimeDelta::milliseconds(500);
/// Rolled out and slowed below this speed arms completion.
const COMPLETION_MAX_IAS_KT: f64 = 20.0;
/// Grounded rollout must hold this long before the approach completes.
const COMPLETION_DEBOUNCE: TimeDelta = TimeDelta::seconds(2);
/// Target airspeed offset above Vref for the deviation samples.
const SAMPLE_TARGET_SPEED_OFFSET_KT: f64 = 5.0;
/// Target pitch on approach, degrees.
const SAMPLE_TARGET_PITCH_DEG: f64 = -3.0;
/// A "final" sample this far off the runway heading is re-attributed to base.
const FINAL_HEADING_REATTRIBUTE_DEG: f64 = 30.0;

/// Touchdown firmness from vertical speed at ground contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TouchdownFirmness {
    Soft,
    Acceptable,
    Firm,
    Hard,
}

impl TouchdownFirmness {
    pub fn from_sink_rate(vs_abs_fpm: f64) -> Self {
        if vs_abs_fpm > 360.0 {
            TouchdownFirmness::Hard
        } else if vs_abs_fpm > 240.0 {
            TouchdownFirmness::Firm
        } else if vs_abs_fpm > 120.0 {
            TouchdownFirmness::Acceptable
        } else {
            TouchdownFirmness::Soft
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Touchdown {
    pub timestamp: DateTime<Utc>,
    pub distance_from_threshold_ft: f64,
    pub vertical_speed_fpm: f64,
    pub firmness: TouchdownFirmness,
    pub airspeed_kt: f64,
    pub heading_deg: f64,
}

/// One recorded standards violation with the phase it occurred in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseViolation {
    pub timestamp: DateTime<Utc>,
    pub phase: ApproachPhase,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachUpdate {
    pub phase: ApproachPhase,
    pub phase_changed: bool,
    pub gate_passed: Option<GatePassage>,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachOutcome {
    pub grade: ApproachGradeResult,
    pub violations: Vec<PhaseViolation>,
    pub gates_passed: Vec<GatePassage>,
    pub touchdown: Option<Touchdown>,
}

/// Tracks a full landing approach through the traffic pattern.
///
/// Classifies every sample into a phase, records standards violations and
/// glidepath gate passages, collects throttled per-phase deviation samples
/// near the runway, and completes once the rollout has slowed.
#[derive(Debug, Clone)]
pub struct ApproachTracker {
    runway: Runway,
    vref_kt: f64,
    skill: PathSkill,
    phase: ApproachPhase,
    phase_history: Vec<(DateTime<Utc>, ApproachPhase)>,
    violations: Vec<PhaseViolation>,
    gates_passed: Vec<GatePassage>,
    samples: Vec<PhaseDeviationSample>,
    last_sample_at: Option<DateTime<Utc>>,
    touchdown: Option<Touchdown>,
    completion_armed_at: Option<DateTime<Utc>>,
    complete: bool,
}

impl ApproachTracker {
    pub fn new(runway: Runway, vref_kt: f64, skill: PathSkill) -> Self {
        Self {
            runway,
            vref_kt,
            skill,
            phase: ApproachPhase::None,
            phase_history: Vec::new(),
            violations: Vec::new(),
            gates_passed: Vec::new(),
            samples: Vec::new(),
            last_sample_at: None,
            touchdown: None,
            completion_armed_at: None,
            complete: false,
        }
    }

    pub fn phase(&self) -> ApproachPhase { self.phase }
    pub fn is_complete(&self) -> bool { self.complete }
    pub fn runway(&self) -> &Runway { &self.runway }
    pub fn vref_kt(&self) -> f64 { self.vref_kt }
    pub fn phase_history(&self) -> &[(DateTime<Utc>, ApproachPhase)] { &self.phase_history }
    pub fn violations(&self) -> &[PhaseViolation] { &self.violations }
    pub fn gates_passed(&self) -> &[GatePassage] { &self.gates_passed }
    pub fn samples(&self) -> &[PhaseDeviationSample] { &self.samples }
    pub fn touchdown(&self) -> Option<Touchdown> { self.touchdown }

    /// Disarms the completion debounce after a session cancellation.
    pub fn disarm_completion(&mut self) { self.completion_armed_at = None; }

    pub fn update(&mut self, view: &KinematicView) -> ApproachUpdate {
        if self.complete {
            return ApproachUpdate {
                phase: self.phase,
                phase_changed: false,
                gate_passed: None,
                complete: true,
            };
        }

        let prev_phase = self.phase;
        let phase = classify_phase(view, &self.runway, self.phase);
        let phase_changed = phase != self.phase && phase != ApproachPhase::None;
        if phase_changed {
            self.phase_history.push((view.timestamp, phase));
            self.phase = phase;
        } else if phase != ApproachPhase::None {
            self.phase = phase;
        }

        if phase != ApproachPhase::None {
            let report = check_phase_compliance(view, phase, &self.runway, self.vref_kt);
            for message in report.violations {
                self.violations.push(PhaseViolation {
                    timestamp: view.timestamp,
                    phase,
                    message,
                });
            }
        }

        // Gates only count while established on final; each fires once.
        let mut gate_passed = None;
        if phase == ApproachPhase::Final {
            if let Some(passage) = check_gate_passage(view, &self.runway) {
                if !self.gates_passed.iter().any(|g| g.gate == passage.gate) {
                    self.gates_passed.push(passage);
                    gate_passed = Some(passage);
                }
            }
        }

        // The first grounded sample reclassifies as rollout, so touchdown is
        // keyed on the phase flown before ground contact.
        let touched = view.on_ground
            && (prev_phase == ApproachPhase::Threshold || phase == ApproachPhase::Rollout);
        if touched && self.touchdown.is_none() {
            let dist_ft = distance_nm(
                view.lat,
                view.lon,
                self.runway.threshold.lat,
                self.runway.threshold.lon,
            ) * FT_PER_NM;
            self.touchdown = Some(Touchdown {
                timestamp: view.timestamp,
                distance_from_threshold_ft: dist_ft,
                vertical_speed_fpm: view.vs_fpm,
                firmness: TouchdownFirmness::from_sink_rate(view.vs_fpm.abs()),
                airspeed_kt: view.ias_kt,
                heading_deg: view.hdg_true,
            });
        }

        self.collect_sample(view, phase);
        self.check_completion(view, phase);

        ApproachUpdate { phase, phase_changed, gate_passed, complete: self.complete }
    }

    fn collect_sample(&mut self, view: &KinematicView, phase: ApproachPhase) {
        if view.on_ground || view.ias_kt <= 30.0 {
            return;
        }
        let due = self
            .last_sample_at
            .is_none_or(|last| view.timestamp - last >= SAMPLE_THROTTLE);
        if !due {
            return;
        }

        let dist = distance_nm(
            view.lat,
            view.lon,
            self.runway.threshold.lat,
            self.runway.threshold.lon,
        );
        if dist >= SAMPLE_RANGE_NM {
            return;
        }
        self.last_sample_at = Some(view.timestamp);

        let target_msl = glidepath_target_agl_ft(dist) + self.runway.elevation_ft;
        let alt_dev = view.alt_ft - target_msl;
        let speed_dev = view.ias_kt - (self.vref_kt + SAMPLE_TARGET_SPEED_OFFSET_KT);
        let pitch_dev = view.pitch_deg - SAMPLE_TARGET_PITCH_DEG;
        let lateral_dev = cross_track_nm(
            view.lat,
            view.lon,
            self.runway.threshold.lat,
            self.runway.threshold.lon,
            self.runway.opposite_end.lat,
            self.runway.opposite_end.lon,
        );

        // A sample classified as final but pointed well off the runway
        // heading belongs to the base turn.
        let heading_dev = normalize_angle(view.hdg_true - self.runway.heading_deg).abs();
        let sample_phase = if phase == ApproachPhase::Final
            && heading_dev > FINAL_HEADING_REATTRIBUTE_DEG
        {
            ApproachPhase::Base
        } else {
            phase
        };

        self.samples.push(PhaseDeviationSample {
            phase: sample_phase,
            alt_dev_ft: alt_dev,
            lateral_dev_nm: lateral_dev,
            speed_dev_kt: speed_dev,
            bank_abs_deg: view.bank_deg.abs(),
            pitch_dev_deg: pitch_dev,
        });
    }

    fn check_completion(&mut self, view: &KinematicView, phase: ApproachPhase) {
        if phase == ApproachPhase::Rollout
            && view.on_ground
            && view.ias_kt < COMPLETION_MAX_IAS_KT
        {
            let since = *self.completion_armed_at.get_or_insert(view.timestamp);
            if view.timestamp - since >= COMPLETION_DEBOUNCE {
                self.complete = true;
            }
        } else {
            self.completion_armed_at = None;
        }
    }

    /// Grades the approach from the collected per-phase samples.
    pub fn finalize(&self) -> ApproachOutcome {
        ApproachOutcome {
            grade: grade_approach(&self.samples, self.skill),
            violations: self.violations.clone(),
            gates_passed: self.gates_passed.clone(),
            touchdown: self.touchdown,
        }
    }
}
