use super::approach::ApproachTracker;
use super::path_following::PathFollowingTracker;
use super::result::{ManeuverKind, ManeuverOutcome, ManeuverResult, TracePoint};
use super::steep_turn::{SteepTurnArmer, SteepTurnTracker};
use crate::common::{KinematicView, PathPoint, Runway, TelemetrySample};
use crate::grading::{PathSkill, SkillLevel};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// Trace points are appended at most this often.
const TRACE_THROTTLE: TimeDelta = TimeDelta::milliseconds(500);
/// Minimum airspeed for a sample to enter the flight path trace.
const TRACE_MIN_IAS_KT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    AlreadyStarted,
    NotStarted,
    AlreadyFinished,
    /// A steep turn session was stopped before acquisition ever armed, so
    /// there is nothing to grade.
    NoManeuverDetected,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyStarted => write!(f, "Session is already started"),
            SessionError::NotStarted => write!(f, "Session has not been started"),
            SessionError::AlreadyFinished => write!(f, "Session already produced its result"),
            SessionError::NoManeuverDetected => {
                write!(f, "No maneuver was detected before the session stopped")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Per-sample report from [`ManeuverSession::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// The sample was missing kinematic fields and was dropped whole.
    pub skipped: bool,
    /// Steep turn acquisition armed on this sample.
    pub armed: bool,
    /// The maneuver completed on this sample; the result is now frozen.
    pub completed: bool,
}

/// Immutable session parameters, kept so cancellation can rebuild the
/// tracker from scratch.
#[derive(Debug, Clone)]
enum SessionConfig {
    SteepTurn { skill: SkillLevel },
    PathFollowing { path: Vec<PathPoint>, skill: PathSkill },
    Approach { runway: Runway, vref_kt: f64, skill: PathSkill },
}

#[derive(Debug, Clone)]
enum TrackerSlot {
    SteepTurn { armer: SteepTurnArmer, tracker: Option<SteepTurnTracker> },
    PathFollowing(PathFollowingTracker),
    Approach(ApproachTracker),
}

impl TrackerSlot {
    fn build(config: &SessionConfig) -> Self {
        match config {
            SessionConfig::SteepTurn { skill } => TrackerSlot::SteepTurn {
                armer: SteepTurnArmer::new(*skill),
                tracker: None,
            },
            SessionConfig::PathFollowing { path, skill } => {
                TrackerSlot::PathFollowing(PathFollowingTracker::new(path.clone(), *skill))
            }
            SessionConfig::Approach { runway, vref_kt, skill } => {
                TrackerSlot::Approach(ApproachTracker::new(*runway, *vref_kt, *skill))
            }
        }
    }
}

/// Owns one maneuver attempt from start to its single terminal result.
///
/// Telemetry flows in through [`ingest`](Self::ingest); the session routes
/// it to the configured tracker, maintains the throttled flight path trace,
/// and freezes a [`ManeuverResult`] exactly once, either when the tracker
/// reports completion or when the caller stops the session early.
#[derive(Debug)]
pub struct ManeuverSession {
    kind: ManeuverKind,
    config: SessionConfig,
    slot: TrackerSlot,
    trace: Vec<TracePoint>,
    last_trace_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    result: Option<ManeuverResult>,
}

impl ManeuverSession {
    fn new(kind: ManeuverKind, config: SessionConfig) -> Self {
        let slot = TrackerSlot::build(&config);
        Self {
            kind,
            config,
            slot,
            trace: Vec::new(),
            last_trace_at: None,
            started_at: None,
            result: None,
        }
    }

    pub fn steep_turn(skill: SkillLevel) -> Self {
        Self::new(ManeuverKind::SteepTurn, SessionConfig::SteepTurn { skill })
    }

    pub fn path_following(path: Vec<PathPoint>, skill: PathSkill) -> Self {
        Self::new(ManeuverKind::PathFollowing, SessionConfig::PathFollowing { path, skill })
    }

    pub fn approach(runway: Runway, vref_kt: f64, skill: PathSkill) -> Self {
        Self::new(ManeuverKind::Approach, SessionConfig::Approach { runway, vref_kt, skill })
    }

    pub fn kind(&self) -> ManeuverKind { self.kind }
    pub fn is_started(&self) -> bool { self.started_at.is_some() }
    pub fn is_finished(&self) -> bool { self.result.is_some() }
    pub fn trace(&self) -> &[TracePoint] { &self.trace }
    pub fn result(&self) -> Option<&ManeuverResult> { self.result.as_ref() }

    /// Opens the session for telemetry. `now` should be the timestamp of
    /// the telemetry stream, not wall time.
    ///
    /// # Errors
    /// [`SessionError::AlreadyStarted`] when called twice.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.started_at.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        self.started_at = Some(now);
        crate::info!("{} session started", self.kind);
        Ok(())
    }

    /// Throws away all tracking state and rearms from the session's
    /// configuration. The session stays started; the trace is cleared.
    ///
    /// # Errors
    /// [`SessionError::NotStarted`] before [`start`](Self::start),
    /// [`SessionError::AlreadyFinished`] once a result exists.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.started_at.is_none() {
            return Err(SessionError::NotStarted);
        }
        if self.result.is_some() {
            return Err(SessionError::AlreadyFinished);
        }
        self.slot = TrackerSlot::build(&self.config);
        self.trace.clear();
        self.last_trace_at = None;
        crate::log!("{} session cancelled, tracking rearmed", self.kind);
        Ok(())
    }

    /// Feeds one telemetry sample through the session.
    ///
    /// Samples with missing kinematic fields are skipped whole so a partial
    /// frame can never corrupt the tracker state.
    ///
    /// # Errors
    /// [`SessionError::NotStarted`] before [`start`](Self::start),
    /// [`SessionError::AlreadyFinished`] once a result exists.
    pub fn ingest(&mut self, sample: &TelemetrySample) -> Result<IngestReport, SessionError> {
        if self.started_at.is_none() {
            return Err(SessionError::NotStarted);
        }
        if self.result.is_some() {
            return Err(SessionError::AlreadyFinished);
        }
        let Some(view) = sample.kinematics() else {
            return Ok(IngestReport { skipped: true, ..IngestReport::default() });
        };

        let mut report = IngestReport::default();
        match &mut self.slot {
            TrackerSlot::SteepTurn { armer, tracker } => match tracker {
                None => {
                    if let Some(armed) = armer.update(&view) {
                        crate::event!(
                            "Steep turn acquisition armed at heading {:.0}",
                            armed.entry().hdg_true
                        );
                        *tracker = Some(armed);
                        report.armed = true;
                    }
                }
                Some(active) => match active.update(&view) {
                    Ok(progress) => report.completed = progress.complete,
                    Err(invalidation) => {
                        crate::warn!("Steep turn attempt dropped: {invalidation:?}, rearming");
                        let skill = active.skill();
                        *tracker = None;
                        *armer = SteepTurnArmer::new(skill);
                    }
                },
            },
            TrackerSlot::PathFollowing(tracker) => {
                report.completed = tracker.update(&view).complete;
            }
            TrackerSlot::Approach(tracker) => {
                report.completed = tracker.update(&view).complete;
            }
        }

        self.record_trace(&view);

        if report.completed {
            self.freeze(view.timestamp)?;
        }
        Ok(report)
    }

    /// Finalizes the session on the caller's initiative, before the tracker
    /// has reported completion. Repeated calls return the same result.
    ///
    /// # Errors
    /// [`SessionError::NotStarted`] before [`start`](Self::start),
    /// [`SessionError::NoManeuverDetected`] for a steep turn session that
    /// never armed.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<&ManeuverResult, SessionError> {
        if self.started_at.is_none() {
            return Err(SessionError::NotStarted);
        }
        if self.result.is_none() {
            self.freeze(now)?;
        }
        self.result.as_ref().ok_or(SessionError::NotStarted)
    }

    fn record_trace(&mut self, view: &KinematicView) {
        if view.on_ground || view.ias_kt <= TRACE_MIN_IAS_KT {
            return;
        }
        let due = self
            .last_trace_at
            .is_none_or(|last| view.timestamp - last >= TRACE_THROTTLE);
        if due {
            self.last_trace_at = Some(view.timestamp);
            self.trace.push(TracePoint::from_view(view));
        }
    }

    fn freeze(&mut self, completed_at: DateTime<Utc>) -> Result<(), SessionError> {
        let started_at = self.started_at.ok_or(SessionError::NotStarted)?;
        let (entry, outcome) = match &self.slot {
            TrackerSlot::SteepTurn { tracker, .. } => {
                let tracker = tracker.as_ref().ok_or(SessionError::NoManeuverDetected)?;
                (Some(tracker.entry()), ManeuverOutcome::SteepTurn(tracker.finalize()))
            }
            TrackerSlot::PathFollowing(tracker) => {
                (None, ManeuverOutcome::PathFollowing(tracker.finalize()))
            }
            TrackerSlot::Approach(tracker) => {
                (None, ManeuverOutcome::Approach(tracker.finalize()))
            }
        };
        crate::info!("{} session finished", self.kind);
        self.result = Some(ManeuverResult {
            kind: self.kind,
            started_at,
            completed_at,
            entry,
            outcome,
            trace: std::mem::take(&mut self.trace),
        });
        Ok(())
    }
}
