use super::approach::{ApproachTracker, TouchdownFirmness};
use super::bust_window::{bust_window, BustWindowOptions};
use super::glidepath::{check_gate_passage, check_phase_compliance};
use super::path_following::PathFollowingTracker;
use super::phase::{classify_phase, ApproachPhase};
use super::result::{ManeuverKind, SaveGuard};
use super::session::{ManeuverSession, SessionError};
use super::steep_turn::{SteepTurnArmer, SteepTurnTracker, TrackerInvalidation};
use crate::common::{
    destination_point, EntrySnapshot, KinematicView, PathPoint, Runway, RunwayEnd,
    TelemetrySample,
};
use crate::grading::{PathSkill, SkillLevel};
use chrono::{DateTime, TimeDelta, Utc};

const RWY_ELEVATION_FT: f64 = 17.0;

fn ts(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap() + TimeDelta::milliseconds(ms)
}

fn test_runway() -> Runway {
    let threshold = RunwayEnd { lat: 30.2958, lon: -87.6875 };
    let (lat, lon) = destination_point(threshold.lat, threshold.lon, 270.0, 1.147);
    Runway {
        threshold,
        opposite_end: RunwayEnd { lat, lon },
        heading_deg: 270.0,
        elevation_ft: RWY_ELEVATION_FT,
        length_ft: 6969.0,
        width_ft: 98.0,
    }
}

/// Position `dist_nm` out on final, i.e. east of the threshold.
fn final_position(runway: &Runway, dist_nm: f64) -> (f64, f64) {
    destination_point(runway.threshold.lat, runway.threshold.lon, 90.0, dist_nm)
}

fn base_view(ms: i64) -> KinematicView {
    KinematicView {
        timestamp: ts(ms),
        lat: 30.35,
        lon: -87.7,
        alt_ft: 3000.0,
        hdg_true: 0.0,
        bank_deg: 0.0,
        pitch_deg: 2.0,
        ias_kt: 100.0,
        vs_fpm: 0.0,
        on_ground: false,
    }
}

// --- phase classification ---

#[test]
fn test_phase_rollout_requires_landing_history() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (lat, lon) = final_position(&runway, 0.2);
    view.lat = lat;
    view.lon = lon;
    view.on_ground = true;
    view.alt_ft = RWY_ELEVATION_FT;

    assert_eq!(
        classify_phase(&view, &runway, ApproachPhase::Threshold),
        ApproachPhase::Rollout
    );
    assert_eq!(
        classify_phase(&view, &runway, ApproachPhase::Rollout),
        ApproachPhase::Rollout
    );
    // Grounded without having flown the threshold: taxiing, not rolling out.
    assert_eq!(classify_phase(&view, &runway, ApproachPhase::None), ApproachPhase::None);
}

#[test]
fn test_phase_threshold() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (lat, lon) = final_position(&runway, 0.05);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 270.0;
    view.alt_ft = RWY_ELEVATION_FT + 50.0;
    assert_eq!(classify_phase(&view, &runway, ApproachPhase::Final), ApproachPhase::Threshold);
}

#[test]
fn test_phase_final() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (lat, lon) = final_position(&runway, 1.0);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 270.0;
    view.alt_ft = RWY_ELEVATION_FT + 317.0;
    assert_eq!(classify_phase(&view, &runway, ApproachPhase::None), ApproachPhase::Final);
    // Pointed 90 degrees off the runway: no longer final.
    view.hdg_true = 0.0;
    assert_ne!(classify_phase(&view, &runway, ApproachPhase::None), ApproachPhase::Final);
}

#[test]
fn test_phase_base() {
    let runway = test_runway();
    let mut view = base_view(0);
    // A mile out, offset south of the centerline, turning perpendicular.
    let (abeam_lat, abeam_lon) = final_position(&runway, 1.0);
    let (lat, lon) = destination_point(abeam_lat, abeam_lon, 180.0, 0.8);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 0.0;
    view.alt_ft = RWY_ELEVATION_FT + 800.0;
    assert_eq!(classify_phase(&view, &runway, ApproachPhase::None), ApproachPhase::Base);
}

#[test]
fn test_phase_downwind() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (mid_lat, mid_lon) =
        destination_point(runway.threshold.lat, runway.threshold.lon, 270.0, 0.57);
    let (lat, lon) = destination_point(mid_lat, mid_lon, 0.0, 0.8);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 90.0;
    view.alt_ft = RWY_ELEVATION_FT + 1000.0;
    assert_eq!(classify_phase(&view, &runway, ApproachPhase::None), ApproachPhase::Downwind);
}

#[test]
fn test_phase_classification_is_pure() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (lat, lon) = final_position(&runway, 1.0);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 270.0;
    let first = classify_phase(&view, &runway, ApproachPhase::None);
    let second = classify_phase(&view, &runway, ApproachPhase::None);
    assert_eq!(first, second);
}

// --- glidepath ---

#[test]
fn test_gate_passage_one_mile_compliant() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (lat, lon) = final_position(&runway, 1.0);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 270.0;
    view.alt_ft = 335.0;

    let passage = check_gate_passage(&view, &runway).unwrap();
    assert_eq!(passage.gate, "1.0NM");
    // 300 ft AGL target plus 17 ft field elevation.
    assert!((passage.target_altitude_msl_ft - 317.0).abs() < 1.0);
    assert!(passage.compliant, "18 ft high is inside the 75 ft window");

    view.alt_ft = 425.0;
    let high = check_gate_passage(&view, &runway).unwrap();
    assert!(!high.compliant);
}

#[test]
fn test_gate_passage_outside_window() {
    let runway = test_runway();
    let mut view = base_view(0);
    let (lat, lon) = final_position(&runway, 1.2);
    view.lat = lat;
    view.lon = lon;
    assert!(check_gate_passage(&view, &runway).is_none());
}

#[test]
fn test_downwind_compliance_flags_altitude() {
    let runway = test_runway();
    let mut view = base_view(0);
    view.alt_ft = runway.pattern_altitude_ft() + 250.0;
    view.ias_kt = 85.0;
    let report = check_phase_compliance(&view, ApproachPhase::Downwind, &runway, 65.0);
    assert!(!report.compliant || !report.violations.is_empty());
    assert!(report.violations.iter().any(|v| v.contains("Altitude")));

    view.alt_ft = runway.pattern_altitude_ft();
    view.bank_deg = 5.0;
    let clean = check_phase_compliance(&view, ApproachPhase::Downwind, &runway, 65.0);
    assert!(clean.violations.is_empty());
}

// --- steep turn ---

fn entry_at(hdg: f64) -> EntrySnapshot {
    EntrySnapshot {
        timestamp: ts(0),
        hdg_true: hdg,
        alt_ft: 3000.0,
        ias_kt: 100.0,
        lat: 30.35,
        lon: -87.7,
    }
}

fn turn_view(ms: i64, hdg: f64, bank: f64) -> KinematicView {
    let mut view = base_view(ms);
    view.hdg_true = hdg;
    view.bank_deg = bank;
    view
}

#[test]
fn test_turn_accumulates_only_with_direction() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 12.0, 45.0)).unwrap();
    tracker.update(&turn_view(1000, 24.0, 45.0)).unwrap();
    assert!((tracker.total_turn_deg() - 24.0).abs() < 1e-9);
    // Heading jitter against the locked direction does not subtract.
    tracker.update(&turn_view(1500, 20.0, 45.0)).unwrap();
    assert!((tracker.total_turn_deg() - 24.0).abs() < 1e-9);
    tracker.update(&turn_view(2000, 32.0, 45.0)).unwrap();
    assert!((tracker.total_turn_deg() - 36.0).abs() < 1e-9);
}

#[test]
fn test_turn_accumulates_across_north() {
    let mut tracker = SteepTurnTracker::new(entry_at(350.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 2.0, 45.0)).unwrap();
    assert!((tracker.total_turn_deg() - 12.0).abs() < 1e-9);
}

#[test]
fn test_bank_lost_before_establishment() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 3.0, 26.0)).unwrap();
    let err = tracker.update(&turn_view(1000, 5.0, 15.0)).unwrap_err();
    assert_eq!(err, TrackerInvalidation::BankLostBeforeEstablishment);
}

#[test]
fn test_leveled_before_establishment() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 3.0, 22.0)).unwrap();
    let err = tracker.update(&turn_view(1000, 4.0, 2.0)).unwrap_err();
    assert_eq!(err, TrackerInvalidation::LeveledBeforeEstablishment);
}

#[test]
fn test_abandoned_after_establishment_needs_three_seconds() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 10.0, 45.0)).unwrap();
    assert!(tracker.is_established());
    tracker.update(&turn_view(1000, 15.0, 3.0)).unwrap();
    tracker.update(&turn_view(2500, 15.0, 3.0)).unwrap();
    let err = tracker.update(&turn_view(4000, 15.0, 3.0)).unwrap_err();
    assert_eq!(err, TrackerInvalidation::AbandonedAfterEstablishment);
}

#[test]
fn test_level_window_resets_when_bank_returns() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 10.0, 45.0)).unwrap();
    tracker.update(&turn_view(1000, 15.0, 3.0)).unwrap();
    tracker.update(&turn_view(2000, 20.0, 45.0)).unwrap();
    // Level again: the three second window starts over.
    tracker.update(&turn_view(2500, 25.0, 3.0)).unwrap();
    assert!(tracker.update(&turn_view(4500, 25.0, 3.0)).is_ok());
    assert!(tracker.update(&turn_view(5500, 25.0, 3.0)).is_err());
}

fn fly_full_turn(tracker: &mut SteepTurnTracker) {
    for i in 1..=28 {
        let hdg = f64::from(i) * 12.0 % 360.0;
        tracker.update(&turn_view(500 * i64::from(i), hdg, 45.0)).unwrap();
    }
}

#[test]
fn test_rollout_trigger_and_completion() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    fly_full_turn(&mut tracker);
    assert!((tracker.total_turn_deg() - 336.0).abs() < 1e-6);
    assert!(!tracker.rollout_started());

    // Bank coming down off 45 with the turn nearly closed reads as rollout.
    let progress = tracker.update(&turn_view(14_500, 336.0, 25.0)).unwrap();
    assert!(progress.rollout_started);
    assert!(!progress.complete);

    let progress = tracker.update(&turn_view(15_000, 336.0, 4.0)).unwrap();
    assert!(progress.complete);
    assert!(tracker.is_complete());

    let outcome = tracker.finalize();
    assert!(!outcome.rollout_inferred);
    assert!((outcome.rollout_heading_error_deg - 24.0).abs() < 1e-6);
    // 24 degrees off the entry heading is outside the pro tolerance.
    assert!(!outcome.heading_within_tolerance);
    assert!(!outcome.passed);
}

#[test]
fn test_rollout_not_triggered_by_early_shallow_bank() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    tracker.update(&turn_view(500, 12.0, 45.0)).unwrap();
    // Bank decreasing but the turn is nowhere near closed.
    tracker.update(&turn_view(1000, 24.0, 40.0)).unwrap();
    assert!(!tracker.rollout_started());
}

#[test]
fn test_finalize_without_rollout_is_inferred() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Dev);
    tracker.update(&turn_view(500, 12.0, 45.0)).unwrap();
    tracker.update(&turn_view(1000, 24.0, 45.0)).unwrap();
    let outcome = tracker.finalize();
    assert!(outcome.rollout_inferred);
    // Falls back to the last seen heading for the rollout error.
    assert!((outcome.rollout_heading_error_deg - 24.0).abs() < 1e-6);
}

#[test]
fn test_bank_bust_stops_at_rollout() {
    let mut tracker = SteepTurnTracker::new(entry_at(0.0), SkillLevel::Pro);
    fly_full_turn(&mut tracker);
    tracker.update(&turn_view(14_500, 336.0, 25.0)).unwrap();
    // Bank 25 is far outside the 40..50 pass window, but the rollout had
    // already begun on that sample.
    assert!(!tracker.busted().bank);
}

#[test]
fn test_armer_requires_sustained_entry_bank() {
    let mut armer = SteepTurnArmer::new(SkillLevel::Pro);
    assert!(armer.update(&turn_view(0, 0.0, 44.0)).is_none());
    assert!(armer.update(&turn_view(500, 0.0, 44.0)).is_none());
    // Out of the entry window: the hold starts over.
    assert!(armer.update(&turn_view(1000, 0.0, 30.0)).is_none());
    assert!(armer.update(&turn_view(1500, 0.0, 44.0)).is_none());
    assert!(armer.update(&turn_view(2000, 0.0, 44.0)).is_none());
    assert!(armer.update(&turn_view(3000, 0.0, 44.0)).is_none());
    let tracker = armer.update(&turn_view(3500, 0.0, 44.0)).unwrap();
    // Entry snapshot comes from the first in-window sample.
    assert_eq!(tracker.entry().timestamp, ts(1500));
}

// --- path following ---

fn straight_path() -> Vec<PathPoint> {
    let mut points = Vec::new();
    for i in 0..5 {
        let (lat, lon) = destination_point(30.0, -87.0, 90.0, 0.5 * f64::from(i));
        points.push(PathPoint {
            lat,
            lon,
            alt_ft: 1000.0,
            ias_kt: 100.0,
            bank_deg: 0.0,
            pitch_deg: 0.0,
        });
    }
    points
}

fn path_view(ms: i64, lat: f64, lon: f64) -> KinematicView {
    let mut view = base_view(ms);
    view.lat = lat;
    view.lon = lon;
    view.alt_ft = 1000.0;
    view.hdg_true = 90.0;
    view
}

#[test]
fn test_path_start_latch() {
    let mut tracker = PathFollowingTracker::new(straight_path(), PathSkill::Acs);
    // A mile short of the first point: nothing activates.
    let (lat, lon) = destination_point(30.0, -87.0, 270.0, 1.0);
    let update = tracker.update(&path_view(0, lat, lon));
    assert!(!update.start_reached);
    assert!(update.current.is_none());

    let update = tracker.update(&path_view(500, 30.0, -87.0));
    assert!(update.start_reached);
    assert!(update.on_path);
    // The latch holds even when the aircraft wanders off afterwards.
    let (lat, lon) = destination_point(30.0, -87.0, 0.0, 5.0);
    let update = tracker.update(&path_view(1000, lat, lon));
    assert!(update.start_reached);
    assert!(!update.on_path);
}

#[test]
fn test_path_deviation_and_bust() {
    let mut tracker = PathFollowingTracker::new(straight_path(), PathSkill::Acs);
    tracker.update(&path_view(0, 30.0, -87.0));

    let (lat, lon) = destination_point(30.0, -87.0, 90.0, 0.5);
    let mut view = path_view(500, lat, lon);
    view.alt_ft = 1150.0;
    let update = tracker.update(&view);
    let current = update.current.unwrap();
    assert_eq!(current.matched_index, 1);
    assert!((current.alt_dev_ft - 150.0).abs() < 1e-9);
    assert!(tracker.busted().altitude);
    assert!(!tracker.busted().lateral);
}

#[test]
fn test_path_completion_debounce_and_bounce() {
    let mut tracker = PathFollowingTracker::new(straight_path(), PathSkill::Acs);
    tracker.update(&path_view(0, 30.0, -87.0));

    let mut grounded = path_view(500, 30.0, -87.0);
    grounded.on_ground = true;
    grounded.ias_kt = 5.0;
    assert!(!tracker.update(&grounded).complete);

    // Touch and go: airborne again before the window elapses.
    let airborne = path_view(1000, 30.0, -87.0);
    assert!(!tracker.update(&airborne).complete);

    let mut grounded = path_view(1500, 30.0, -87.0);
    grounded.on_ground = true;
    grounded.ias_kt = 5.0;
    assert!(!tracker.update(&grounded).complete);
    grounded.timestamp = ts(2500);
    assert!(tracker.update(&grounded).complete);

    let outcome = tracker.finalize();
    assert!(outcome.start_reached);
    assert_eq!(outcome.busted.count(), 0);
}

// --- approach tracker ---

#[test]
fn test_approach_gate_fires_once() {
    let runway = test_runway();
    let mut tracker = ApproachTracker::new(runway, 65.0, PathSkill::Acs);
    let (lat, lon) = final_position(&runway, 1.0);
    let mut view = base_view(0);
    view.lat = lat;
    view.lon = lon;
    view.hdg_true = 270.0;
    view.alt_ft = 335.0;
    view.ias_kt = 70.0;
    view.vs_fpm = -500.0;

    let update = tracker.update(&view);
    assert_eq!(update.phase, ApproachPhase::Final);
    let passage = update.gate_passed.unwrap();
    assert_eq!(passage.gate, "1.0NM");
    assert!(passage.compliant);

    view.timestamp = ts(500);
    let update = tracker.update(&view);
    assert!(update.gate_passed.is_none(), "same gate must not fire twice");
    assert_eq!(tracker.gates_passed().len(), 1);
}

#[test]
fn test_approach_touchdown_and_completion() {
    let runway = test_runway();
    let mut tracker = ApproachTracker::new(runway, 65.0, PathSkill::Acs);

    let (lat, lon) = final_position(&runway, 0.05);
    let mut over_threshold = base_view(0);
    over_threshold.lat = lat;
    over_threshold.lon = lon;
    over_threshold.hdg_true = 270.0;
    over_threshold.alt_ft = RWY_ELEVATION_FT + 40.0;
    over_threshold.ias_kt = 65.0;
    over_threshold.vs_fpm = -200.0;
    assert_eq!(tracker.update(&over_threshold).phase, ApproachPhase::Threshold);

    let (lat, lon) = destination_point(runway.threshold.lat, runway.threshold.lon, 270.0, 0.1);
    let mut grounded = base_view(500);
    grounded.lat = lat;
    grounded.lon = lon;
    grounded.hdg_true = 270.0;
    grounded.alt_ft = RWY_ELEVATION_FT;
    grounded.ias_kt = 55.0;
    grounded.vs_fpm = -150.0;
    grounded.on_ground = true;
    let update = tracker.update(&grounded);
    assert_eq!(update.phase, ApproachPhase::Rollout);
    let touchdown = tracker.touchdown().unwrap();
    assert_eq!(touchdown.firmness, TouchdownFirmness::Acceptable);

    // Slowing through 20 kt holds for two seconds before completing.
    grounded.timestamp = ts(1000);
    grounded.ias_kt = 15.0;
    grounded.vs_fpm = 0.0;
    assert!(!tracker.update(&grounded).complete);
    grounded.timestamp = ts(3500);
    assert!(tracker.update(&grounded).complete);
}

// --- bust window ---

#[test]
fn test_bust_window_percent_and_consecutive() {
    let opts = BustWindowOptions::default();
    let empty: [f64; 0] = [];
    assert!(!bust_window(&empty, |_| true, opts).is_busted);

    let mut samples = vec![0.0; 10];
    samples[4] = 1.0;
    assert!(!bust_window(&samples, |s| *s > 0.5, opts).is_busted);

    samples[8] = 1.0;
    let result = bust_window(&samples, |s| *s > 0.5, opts);
    assert!(result.is_busted, "two of ten hits the 20 percent limit");
    assert!((result.percent_bad - 0.2).abs() < 1e-9);

    let mut long_run = vec![0.0; 30];
    for slot in &mut long_run[10..14] {
        *slot = 1.0;
    }
    let result = bust_window(&long_run, |s| *s > 0.5, opts);
    assert!(result.is_busted, "four consecutive busts regardless of ratio");
    assert_eq!(result.max_consecutive_bad, 4);
}

// --- session ---

fn steep_sample(ms: i64, hdg: f64, bank: f64) -> TelemetrySample {
    TelemetrySample {
        timestamp: ts(ms),
        lat: Some(30.35),
        lon: Some(-87.7),
        alt_ft: Some(3000.0),
        hdg_true: Some(hdg),
        bank_deg: Some(bank),
        pitch_deg: Some(2.0),
        ias_kt: Some(100.0),
        vs_fpm: Some(0.0),
        on_ground: false,
        yaw_rate: None,
        g_force: None,
    }
}

#[test]
fn test_session_lifecycle_guards() {
    let mut session = ManeuverSession::steep_turn(SkillLevel::Dev);
    assert_eq!(session.ingest(&steep_sample(0, 0.0, 44.0)), Err(SessionError::NotStarted));
    session.start(ts(0)).unwrap();
    assert_eq!(session.start(ts(0)), Err(SessionError::AlreadyStarted));
}

#[test]
fn test_session_skips_partial_samples() {
    let mut session = ManeuverSession::steep_turn(SkillLevel::Dev);
    session.start(ts(0)).unwrap();
    let mut sample = steep_sample(0, 0.0, 44.0);
    sample.ias_kt = None;
    let report = session.ingest(&sample).unwrap();
    assert!(report.skipped);
}

#[test]
fn test_session_stop_before_arming_has_no_result() {
    let mut session = ManeuverSession::steep_turn(SkillLevel::Pro);
    session.start(ts(0)).unwrap();
    session.ingest(&steep_sample(0, 0.0, 0.0)).unwrap();
    assert_eq!(session.stop(ts(500)).unwrap_err(), SessionError::NoManeuverDetected);
    assert!(session.result().is_none());
}

#[test]
fn test_session_full_steep_turn() {
    let mut session = ManeuverSession::steep_turn(SkillLevel::Dev);
    session.start(ts(0)).unwrap();

    // Hold the entry bank for two seconds to arm.
    let mut armed = false;
    for i in 0..=4 {
        let report = session.ingest(&steep_sample(500 * i, 0.0, 45.0)).unwrap();
        armed = armed || report.armed;
    }
    assert!(armed);

    // Fly the turn through 336 degrees, then roll out.
    let mut completed = false;
    for i in 1..=28 {
        let hdg = f64::from(i) * 12.0 % 360.0;
        let report =
            session.ingest(&steep_sample(2000 + 500 * i64::from(i), hdg, 45.0)).unwrap();
        assert!(!report.completed);
    }
    let report = session.ingest(&steep_sample(16_500, 336.0, 25.0)).unwrap();
    assert!(!report.completed);
    let report = session.ingest(&steep_sample(17_000, 336.0, 4.0)).unwrap();
    completed = completed || report.completed;
    assert!(completed);

    let result = session.result().unwrap();
    assert_eq!(result.kind, ManeuverKind::SteepTurn);
    assert!(result.entry.is_some());
    assert!(!result.trace.is_empty());
    match &result.outcome {
        super::result::ManeuverOutcome::SteepTurn(outcome) => {
            assert!(!outcome.rollout_inferred);
            assert!(outcome.passed, "dev tolerances accept a clean turn");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    // The result is frozen: further samples and stops cannot change it.
    assert_eq!(
        session.ingest(&steep_sample(17_500, 336.0, 0.0)),
        Err(SessionError::AlreadyFinished)
    );
    let again = session.stop(ts(20_000)).unwrap();
    assert_eq!(again.kind, ManeuverKind::SteepTurn);
}

#[test]
fn test_session_cancel_rearms() {
    let mut session = ManeuverSession::steep_turn(SkillLevel::Dev);
    session.start(ts(0)).unwrap();
    for i in 0..=4 {
        session.ingest(&steep_sample(500 * i, 0.0, 45.0)).unwrap();
    }
    assert!(!session.trace().is_empty());

    session.cancel().unwrap();
    assert!(session.trace().is_empty());
    assert!(!session.is_finished());
    // A fresh attempt arms again from scratch.
    let mut armed = false;
    for i in 0..=4 {
        armed = armed || session.ingest(&steep_sample(5000 + 500 * i, 0.0, 45.0)).unwrap().armed;
    }
    assert!(armed);
}

#[test]
fn test_session_result_is_serializable() {
    let mut session = ManeuverSession::path_following(straight_path(), PathSkill::Acs);
    session.start(ts(0)).unwrap();
    let result = {
        let mut sample = steep_sample(0, 90.0, 0.0);
        sample.lat = Some(30.0);
        sample.lon = Some(-87.0);
        sample.alt_ft = Some(1000.0);
        session.ingest(&sample).unwrap();
        session.stop(ts(500)).unwrap()
    };
    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["kind"], "path_following");
    assert!(json["outcome"]["path_following"]["grade"]["final_grade"].is_string());
}

#[test]
fn test_save_guard_ttl() {
    let mut guard = SaveGuard::new(TimeDelta::seconds(5));
    assert!(guard.try_claim("user:steep_turn:1", ts(0)));
    assert!(!guard.try_claim("user:steep_turn:1", ts(1000)));
    assert!(guard.try_claim("user:steep_turn:2", ts(1000)));
    // The first claim expires and can be taken again.
    assert!(guard.try_claim("user:steep_turn:1", ts(6000)));
    assert_eq!(guard.len(), 2);
}
