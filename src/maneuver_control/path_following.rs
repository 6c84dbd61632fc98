use crate::common::{distance_nm, KinematicView, PathPoint};
use crate::grading::{grade_path_following, PathBusts, PathGradeResult, PathSkill};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Live position must come this close to the first path point to activate.
const START_RADIUS_NM: f64 = 0.3;
/// Samples farther than this from every path point are ignored.
const IGNORE_RADIUS_NM: f64 = 2.0;
/// Max deviations and the stored series update at most this often.
const SERIES_THROTTLE: TimeDelta = TimeDelta::milliseconds(500);
/// Grounded-and-slow must hold this long before completion fires.
const COMPLETION_DEBOUNCE: TimeDelta = TimeDelta::seconds(1);
/// Ground speed below which a grounded aircraft counts as stopped.
const COMPLETION_MAX_IAS_KT: f64 = 10.0;

const BUST_ALT_FT: f64 = 100.0;
const BUST_LATERAL_NM: f64 = 0.2;
const BUST_SPEED_KT: f64 = 10.0;
const BUST_BANK_DEG: f64 = 5.0;
const BUST_PITCH_DEG: f64 = 3.0;

/// Deviation of one sample from its nearest reference path point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDeviations {
    pub timestamp: DateTime<Utc>,
    pub alt_dev_ft: f64,
    pub lateral_dev_nm: f64,
    pub speed_dev_kt: f64,
    pub bank_dev_deg: f64,
    pub pitch_dev_deg: f64,
    /// Index of the matched reference point.
    pub matched_index: usize,
}

/// Per-sample report from [`PathFollowingTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathUpdate {
    pub start_reached: bool,
    /// False when the sample was too far from the path to evaluate.
    pub on_path: bool,
    pub current: Option<PathDeviations>,
    pub complete: bool,
}

/// Terminal summary for a path following run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathOutcome {
    pub grade: PathGradeResult,
    pub busted: PathBusts,
    pub start_reached: bool,
    pub sample_count: usize,
}

/// Tracks deviation from a pre-recorded reference path.
///
/// `start_reached` latches once and never resets within a session. Current
/// deviations refresh every sample; maxima and the stored series refresh at
/// the throttled cadence only.
#[derive(Debug, Clone)]
pub struct PathFollowingTracker {
    skill: PathSkill,
    path: Vec<PathPoint>,
    start_reached: bool,
    current: Option<PathDeviations>,
    max_alt_dev: f64,
    max_lateral_dev: f64,
    max_speed_dev: f64,
    max_bank_dev: f64,
    max_pitch_dev: f64,
    series: Vec<PathDeviations>,
    last_series_update: Option<DateTime<Utc>>,
    busted: PathBusts,
    completion_armed_at: Option<DateTime<Utc>>,
    complete: bool,
}

impl PathFollowingTracker {
    pub fn new(path: Vec<PathPoint>, skill: PathSkill) -> Self {
        Self {
            skill,
            path,
            start_reached: false,
            current: None,
            max_alt_dev: 0.0,
            max_lateral_dev: 0.0,
            max_speed_dev: 0.0,
            max_bank_dev: 0.0,
            max_pitch_dev: 0.0,
            series: Vec::new(),
            last_series_update: None,
            busted: PathBusts::default(),
            completion_armed_at: None,
            complete: false,
        }
    }

    pub fn skill(&self) -> PathSkill { self.skill }
    pub fn start_reached(&self) -> bool { self.start_reached }
    pub fn is_complete(&self) -> bool { self.complete }
    pub fn busted(&self) -> PathBusts { self.busted }
    pub fn current(&self) -> Option<PathDeviations> { self.current }
    pub fn series(&self) -> &[PathDeviations] { &self.series }

    /// Disarms the completion debounce. Called on session cancellation so a
    /// stale grounded-and-slow window cannot re-fire.
    pub fn disarm_completion(&mut self) { self.completion_armed_at = None; }

    fn nearest_point(&self, view: &KinematicView) -> Option<(usize, f64)> {
        self.path
            .iter()
            .enumerate()
            .map(|(i, p)| (i, distance_nm(view.lat, view.lon, p.lat, p.lon)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn update(&mut self, view: &KinematicView) -> PathUpdate {
        if self.complete {
            return PathUpdate {
                start_reached: self.start_reached,
                on_path: false,
                current: self.current,
                complete: true,
            };
        }

        if !self.start_reached {
            if let Some(first) = self.path.first() {
                if distance_nm(view.lat, view.lon, first.lat, first.lon) <= START_RADIUS_NM {
                    self.start_reached = true;
                }
            }
        }

        let mut on_path = false;
        if self.start_reached && !view.on_ground {
            if let Some((idx, dist)) = self.nearest_point(view) {
                if dist <= IGNORE_RADIUS_NM {
                    on_path = true;
                    let matched = self.path[idx];
                    let deviations = PathDeviations {
                        timestamp: view.timestamp,
                        alt_dev_ft: view.alt_ft - matched.alt_ft,
                        lateral_dev_nm: dist,
                        speed_dev_kt: view.ias_kt - matched.ias_kt,
                        bank_dev_deg: view.bank_deg - matched.bank_deg,
                        pitch_dev_deg: view.pitch_deg - matched.pitch_deg,
                        matched_index: idx,
                    };
                    self.current = Some(deviations);
                    self.update_maxima(&deviations);
                    self.update_busts(&deviations);
                }
            }
        }

        self.check_completion(view);

        PathUpdate {
            start_reached: self.start_reached,
            on_path,
            current: self.current,
            complete: self.complete,
        }
    }

    fn update_maxima(&mut self, d: &PathDeviations) {
        let due = self
            .last_series_update
            .is_none_or(|last| d.timestamp - last >= SERIES_THROTTLE);
        if !due {
            return;
        }
        self.last_series_update = Some(d.timestamp);

        if d.alt_dev_ft.abs() > self.max_alt_dev.abs() {
            self.max_alt_dev = d.alt_dev_ft;
        }
        if d.lateral_dev_nm > self.max_lateral_dev {
            self.max_lateral_dev = d.lateral_dev_nm;
        }
        if d.speed_dev_kt.abs() > self.max_speed_dev.abs() {
            self.max_speed_dev = d.speed_dev_kt;
        }
        if d.bank_dev_deg.abs() > self.max_bank_dev.abs() {
            self.max_bank_dev = d.bank_dev_deg;
        }
        if d.pitch_dev_deg.abs() > self.max_pitch_dev.abs() {
            self.max_pitch_dev = d.pitch_dev_deg;
        }
        self.series.push(*d);
    }

    fn update_busts(&mut self, d: &PathDeviations) {
        if d.alt_dev_ft.abs() > BUST_ALT_FT {
            self.busted.altitude = true;
        }
        if d.lateral_dev_nm > BUST_LATERAL_NM {
            self.busted.lateral = true;
        }
        if d.speed_dev_kt.abs() > BUST_SPEED_KT {
            self.busted.speed = true;
        }
        if d.bank_dev_deg.abs() > BUST_BANK_DEG {
            self.busted.bank = true;
        }
        if d.pitch_dev_deg.abs() > BUST_PITCH_DEG {
            self.busted.pitch = true;
        }
    }

    fn check_completion(&mut self, view: &KinematicView) {
        if !self.start_reached {
            return;
        }
        if view.on_ground && view.ias_kt < COMPLETION_MAX_IAS_KT {
            let since = *self.completion_armed_at.get_or_insert(view.timestamp);
            if view.timestamp - since >= COMPLETION_DEBOUNCE {
                self.complete = true;
            }
        } else {
            // Touch-and-go bounce: the window starts over.
            self.completion_armed_at = None;
        }
    }

    /// Grades the run from the accumulated maxima and bust flags.
    pub fn finalize(&self) -> PathOutcome {
        let grade = grade_path_following(
            self.max_alt_dev,
            self.max_lateral_dev,
            self.max_speed_dev,
            self.max_bank_dev,
            self.max_pitch_dev,
            self.busted,
            self.skill,
        );
        PathOutcome {
            grade,
            busted: self.busted,
            start_reached: self.start_reached,
            sample_count: self.series.len(),
        }
    }
}
