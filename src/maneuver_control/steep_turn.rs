use crate::common::{normalize_angle, EntrySnapshot, KinematicView};
use crate::grading::{
    grade_steep_turn, SkillLevel, SteepTurnBusts, SteepTurnGradeResult, TARGET_BANK,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Bank angle that locks the turn direction and starts accumulation.
const DIRECTION_LOCK_BANK_DEG: f64 = 20.0;
/// Bank considered "wings level" for rollout completion and abandonment.
const LEVEL_BANK_DEG: f64 = 5.0;
/// Bank at which a turn is considered seriously begun; dropping back below
/// the direction lock bank after reaching this invalidates the attempt.
const HIGH_BANK_DEG: f64 = 25.0;
/// Returning to this bank before establishment invalidates the attempt.
const RESET_BANK_DEG: f64 = 3.0;
/// Total turn after which a decreasing bank is read as the rollout.
const ROLLOUT_ARM_TURN_DEG: f64 = 325.0;
/// Previous bank must exceed half the target bank for the rollout trigger.
const ROLLOUT_MIN_PREV_BANK_DEG: f64 = TARGET_BANK / 2.0;
/// Bank deviation window: only count while the turn is through this range.
const BANK_DEV_MIN_TURN_DEG: f64 = 45.0;
const BANK_DEV_MAX_TURN_DEG: f64 = 330.0;
/// Bank must be at least this steep for bank deviation tracking.
const BANK_DEV_MIN_BANK_DEG: f64 = 40.0;
/// Wings level for this long after establishment abandons the turn.
const LEVEL_ABANDON_WINDOW: TimeDelta = TimeDelta::seconds(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Reasons a steep turn attempt stops counting. The caller discards the
/// tracker and rearms acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerInvalidation {
    /// Bank reached 25 degrees but fell back below 20 before establishment.
    BankLostBeforeEstablishment,
    /// Bank returned to wings level before establishment.
    LeveledBeforeEstablishment,
    /// Wings level for 3 seconds after establishment.
    AbandonedAfterEstablishment,
}

/// Live progress snapshot returned from every accepted update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteepTurnProgress {
    pub total_turn_deg: f64,
    pub direction: Option<TurnDirection>,
    pub established: bool,
    pub rollout_started: bool,
    pub complete: bool,
}

/// Terminal summary produced by [`SteepTurnTracker::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteepTurnOutcome {
    pub grade: SteepTurnGradeResult,
    pub passed: bool,
    pub total_turn_deg: f64,
    pub direction: Option<TurnDirection>,
    pub rollout_heading_error_deg: f64,
    pub heading_within_tolerance: bool,
    pub avg_bank_deg: f64,
    pub busted: SteepTurnBusts,
    /// True when the rollout trigger never fired and the final sample stood
    /// in for the rollout point. Downstream feedback should caveat the
    /// rollout numbers in that case.
    pub rollout_inferred: bool,
}

/// Latched state machine for one 360 degree steep turn.
///
/// Direction lock, establishment, rollout start and rollout completion are
/// one way latches; cancellation means dropping the tracker.
#[derive(Debug, Clone)]
pub struct SteepTurnTracker {
    skill: SkillLevel,
    entry: EntrySnapshot,
    direction: Option<TurnDirection>,
    total_turn_deg: f64,
    last_heading: Option<f64>,
    last_bank_abs: Option<f64>,
    reached_high_bank: bool,
    established: bool,
    level_since: Option<DateTime<Utc>>,
    rollout_started: bool,
    rollout_start_heading: Option<f64>,
    rollout_completed: bool,
    rollout_end_heading: Option<f64>,
    max_alt_dev: f64,
    max_spd_dev: f64,
    max_bank_dev: f64,
    bank_sum: f64,
    bank_samples: u32,
    busted: SteepTurnBusts,
}

impl SteepTurnTracker {
    pub fn new(entry: EntrySnapshot, skill: SkillLevel) -> Self {
        Self {
            skill,
            entry,
            direction: None,
            total_turn_deg: 0.0,
            last_heading: Some(entry.hdg_true),
            last_bank_abs: None,
            reached_high_bank: false,
            established: false,
            level_since: None,
            rollout_started: false,
            rollout_start_heading: None,
            rollout_completed: false,
            rollout_end_heading: None,
            max_alt_dev: 0.0,
            max_spd_dev: 0.0,
            max_bank_dev: 0.0,
            bank_sum: 0.0,
            bank_samples: 0,
            busted: SteepTurnBusts::default(),
        }
    }

    pub fn entry(&self) -> EntrySnapshot { self.entry }
    pub fn skill(&self) -> SkillLevel { self.skill }
    pub fn total_turn_deg(&self) -> f64 { self.total_turn_deg }
    pub fn direction(&self) -> Option<TurnDirection> { self.direction }
    pub fn is_established(&self) -> bool { self.established }
    pub fn rollout_started(&self) -> bool { self.rollout_started }
    pub fn rollout_start_heading(&self) -> Option<f64> { self.rollout_start_heading }
    pub fn is_complete(&self) -> bool { self.rollout_completed }
    pub fn busted(&self) -> SteepTurnBusts { self.busted }
    pub fn max_alt_dev(&self) -> f64 { self.max_alt_dev }
    pub fn max_spd_dev(&self) -> f64 { self.max_spd_dev }
    pub fn max_bank_dev(&self) -> f64 { self.max_bank_dev }

    /// Feeds one sample through the state machine.
    ///
    /// # Errors
    /// Returns a [`TrackerInvalidation`] when the attempt stops counting as
    /// a steep turn; the tracker must then be discarded.
    pub fn update(&mut self, view: &KinematicView) -> Result<SteepTurnProgress, TrackerInvalidation> {
        if self.rollout_completed {
            return Ok(self.progress());
        }

        let bank_abs = view.bank_deg.abs();
        let prev_bank_abs = self.last_bank_abs;

        if self.direction.is_none() && bank_abs > DIRECTION_LOCK_BANK_DEG {
            self.direction =
                Some(if view.bank_deg > 0.0 { TurnDirection::Right } else { TurnDirection::Left });
        }

        // Only direction-consistent heading deltas accumulate.
        if let (Some(direction), Some(last)) = (self.direction, self.last_heading) {
            let delta = normalize_angle(view.hdg_true - last);
            match direction {
                TurnDirection::Right if delta > 0.0 => self.total_turn_deg += delta,
                TurnDirection::Left if delta < 0.0 => self.total_turn_deg += delta.abs(),
                _ => (),
            }
        }
        self.last_heading = Some(view.hdg_true);
        self.last_bank_abs = Some(bank_abs);

        if !self.established && bank_abs >= self.skill.establishment_threshold_deg() {
            self.established = true;
        }

        if !self.established {
            if bank_abs >= HIGH_BANK_DEG {
                self.reached_high_bank = true;
            }
            if self.reached_high_bank && bank_abs < DIRECTION_LOCK_BANK_DEG {
                return Err(TrackerInvalidation::BankLostBeforeEstablishment);
            }
            if self.direction.is_some() && bank_abs <= RESET_BANK_DEG {
                return Err(TrackerInvalidation::LeveledBeforeEstablishment);
            }
        }

        // Rollout trigger: enough turn accumulated and the bank is coming
        // off a steep value.
        if !self.rollout_started
            && self.total_turn_deg >= ROLLOUT_ARM_TURN_DEG
            && prev_bank_abs.is_some_and(|prev| {
                prev > ROLLOUT_MIN_PREV_BANK_DEG && bank_abs < prev
            })
        {
            self.rollout_started = true;
            self.rollout_start_heading = Some(view.hdg_true);
        }

        if self.rollout_started && bank_abs <= LEVEL_BANK_DEG {
            self.rollout_completed = true;
            self.rollout_end_heading = Some(view.hdg_true);
            return Ok(self.progress());
        }

        // Wings held level after establishment means the turn was abandoned.
        if self.established && !self.rollout_started {
            if bank_abs <= LEVEL_BANK_DEG {
                let since = *self.level_since.get_or_insert(view.timestamp);
                if view.timestamp - since >= LEVEL_ABANDON_WINDOW {
                    return Err(TrackerInvalidation::AbandonedAfterEstablishment);
                }
            } else {
                self.level_since = None;
            }
        }

        self.track_deviations(view, bank_abs);
        Ok(self.progress())
    }

    fn track_deviations(&mut self, view: &KinematicView, bank_abs: f64) {
        let alt_dev = view.alt_ft - self.entry.alt_ft;
        let spd_dev = view.ias_kt - self.entry.ias_kt;

        if alt_dev.abs() > self.max_alt_dev.abs() {
            self.max_alt_dev = alt_dev;
        }
        if spd_dev.abs() > self.max_spd_dev.abs() {
            self.max_spd_dev = spd_dev;
        }

        // Bank deviation ignores the roll-in and roll-out transients.
        if (BANK_DEV_MIN_TURN_DEG..BANK_DEV_MAX_TURN_DEG).contains(&self.total_turn_deg)
            && bank_abs >= BANK_DEV_MIN_BANK_DEG
        {
            let bank_dev = bank_abs - TARGET_BANK;
            if bank_dev.abs() > self.max_bank_dev.abs() {
                self.max_bank_dev = bank_dev;
            }
        }

        if bank_abs > DIRECTION_LOCK_BANK_DEG {
            self.bank_sum += bank_abs;
            self.bank_samples += 1;
        }

        if self.established {
            let tol = self.skill.pass_tolerances();
            if alt_dev.abs() > tol.altitude_ft {
                self.busted.alt = true;
            }
            if spd_dev.abs() > tol.airspeed_kt {
                self.busted.spd = true;
            }
            if !self.rollout_started && (bank_abs < tol.bank_min_deg || bank_abs > tol.bank_max_deg)
            {
                self.busted.bank = true;
            }
        }
    }

    fn progress(&self) -> SteepTurnProgress {
        SteepTurnProgress {
            total_turn_deg: self.total_turn_deg,
            direction: self.direction,
            established: self.established,
            rollout_started: self.rollout_started,
            complete: self.rollout_completed,
        }
    }

    pub fn avg_bank_deg(&self) -> f64 {
        if self.bank_samples == 0 {
            0.0
        } else {
            self.bank_sum / f64::from(self.bank_samples)
        }
    }

    /// Grades the turn. Call once the maneuver is complete or the sample
    /// stream has ended.
    pub fn finalize(&self) -> SteepTurnOutcome {
        let rollout_inferred = !self.rollout_completed;
        let end_heading = self
            .rollout_end_heading
            .or(self.last_heading)
            .unwrap_or(self.entry.hdg_true);
        let heading_error = normalize_angle(end_heading - self.entry.hdg_true).abs();
        let tol = self.skill.pass_tolerances();
        let heading_within_tolerance = heading_error <= tol.rollout_heading_deg;

        let grade = grade_steep_turn(
            self.avg_bank_deg(),
            self.max_bank_dev,
            self.max_alt_dev,
            self.max_spd_dev,
            self.busted,
            self.skill,
        );
        let passed = self.busted.count() == 0 && heading_within_tolerance;

        SteepTurnOutcome {
            grade,
            passed,
            total_turn_deg: self.total_turn_deg,
            direction: self.direction,
            rollout_heading_error_deg: heading_error,
            heading_within_tolerance,
            avg_bank_deg: self.avg_bank_deg(),
            busted: self.busted,
            rollout_inferred,
        }
    }
}

/// Arms a steep turn session: the bank must sit inside the skill's entry
/// window around 45 degrees for two consecutive seconds before tracking
/// starts from the snapshot taken at the first in-range sample.
#[derive(Debug, Clone)]
pub struct SteepTurnArmer {
    skill: SkillLevel,
    in_range_since: Option<DateTime<Utc>>,
    pending_entry: Option<EntrySnapshot>,
}

const ARM_CONFIRM_WINDOW: TimeDelta = TimeDelta::seconds(2);

impl SteepTurnArmer {
    pub fn new(skill: SkillLevel) -> Self {
        Self { skill, in_range_since: None, pending_entry: None }
    }

    /// Returns a ready tracker once the entry window has held long enough.
    pub fn update(&mut self, view: &KinematicView) -> Option<SteepTurnTracker> {
        let bank_dev = (view.bank_deg.abs() - TARGET_BANK).abs();
        if bank_dev <= self.skill.entry_bank_window_deg() {
            let since = *self.in_range_since.get_or_insert(view.timestamp);
            if self.pending_entry.is_none() {
                self.pending_entry = Some(EntrySnapshot::from_view(view));
            }
            if view.timestamp - since >= ARM_CONFIRM_WINDOW {
                let entry = self.pending_entry.take()?;
                self.in_range_since = None;
                return Some(SteepTurnTracker::new(entry, self.skill));
            }
        } else {
            self.in_range_since = None;
            self.pending_entry = None;
        }
        None
    }
}
