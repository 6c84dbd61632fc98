use super::phase::ApproachPhase;
use crate::common::{cross_track_nm, distance_nm, normalize_angle, KinematicView, Runway};
use std::collections::HashMap;

const FT_PER_NM: f64 = 6076.0;
/// Glidepath angle on final, degrees.
const GLIDEPATH_ANGLE_DEG: f64 = 3.0;
/// Half-width of the capture window around each gate.
const GATE_WINDOW_NM: f64 = 0.05;

/// A named checkpoint on the 3 degree final approach glidepath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlidepathGate {
    pub name: &'static str,
    pub distance_nm: f64,
    pub target_agl_ft: f64,
    pub tolerance_alt_ft: f64,
    pub tolerance_speed_kt: f64,
    /// Expected descent rate window, fpm magnitude.
    pub vs_min_fpm: f64,
    pub vs_max_fpm: f64,
}

pub static GLIDEPATH_GATES: [GlidepathGate; 7] = [
    GlidepathGate {
        name: "5.0NM",
        distance_nm: 5.0,
        target_agl_ft: 1500.0,
        tolerance_alt_ft: 150.0,
        tolerance_speed_kt: 10.0,
        vs_min_fpm: 500.0,
        vs_max_fpm: 1000.0,
    },
    GlidepathGate {
        name: "4.0NM",
        distance_nm: 4.0,
        target_agl_ft: 1200.0,
        tolerance_alt_ft: 125.0,
        tolerance_speed_kt: 10.0,
        vs_min_fpm: 500.0,
        vs_max_fpm: 1000.0,
    },
    GlidepathGate {
        name: "3.0NM",
        distance_nm: 3.0,
        target_agl_ft: 900.0,
        tolerance_alt_ft: 125.0,
        tolerance_speed_kt: 10.0,
        vs_min_fpm: 500.0,
        vs_max_fpm: 1000.0,
    },
    GlidepathGate {
        name: "2.0NM",
        distance_nm: 2.0,
        target_agl_ft: 600.0,
        tolerance_alt_ft: 100.0,
        tolerance_speed_kt: 10.0,
        vs_min_fpm: 400.0,
        vs_max_fpm: 900.0,
    },
    GlidepathGate {
        name: "1.5NM",
        distance_nm: 1.5,
        target_agl_ft: 450.0,
        tolerance_alt_ft: 100.0,
        tolerance_speed_kt: 5.0,
        vs_min_fpm: 400.0,
        vs_max_fpm: 800.0,
    },
    GlidepathGate {
        name: "1.0NM",
        distance_nm: 1.0,
        target_agl_ft: 300.0,
        tolerance_alt_ft: 75.0,
        tolerance_speed_kt: 5.0,
        vs_min_fpm: 400.0,
        vs_max_fpm: 700.0,
    },
    GlidepathGate {
        name: "0.5NM",
        distance_nm: 0.5,
        target_agl_ft: 150.0,
        tolerance_alt_ft: 50.0,
        tolerance_speed_kt: 5.0,
        vs_min_fpm: 300.0,
        vs_max_fpm: 600.0,
    },
];

/// Target glidepath altitude for an arbitrary distance from the threshold.
pub fn glidepath_target_agl_ft(dist_nm: f64) -> f64 {
    dist_nm * FT_PER_NM * GLIDEPATH_ANGLE_DEG.to_radians().tan()
}

/// Record of the aircraft passing through a glidepath gate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GatePassage {
    pub gate: &'static str,
    pub distance_nm: f64,
    pub target_altitude_msl_ft: f64,
    pub actual_altitude_ft: f64,
    pub altitude_deviation_ft: f64,
    pub compliant: bool,
}

/// Checks whether the sample lies inside any gate's capture window.
///
/// Gates are scanned farthest first; the caller deduplicates repeated hits
/// on the same gate.
pub fn check_gate_passage(view: &KinematicView, runway: &Runway) -> Option<GatePassage> {
    let dist = distance_nm(view.lat, view.lon, runway.threshold.lat, runway.threshold.lon);
    for gate in &GLIDEPATH_GATES {
        if (dist - gate.distance_nm).abs() < GATE_WINDOW_NM {
            let target_msl = gate.target_agl_ft + runway.elevation_ft;
            let alt_dev = view.alt_ft - target_msl;
            let compliant = alt_dev.abs() <= gate.tolerance_alt_ft;
            return Some(GatePassage {
                gate: gate.name,
                distance_nm: gate.distance_nm,
                target_altitude_msl_ft: target_msl,
                actual_altitude_ft: view.alt_ft,
                altitude_deviation_ft: alt_dev,
                compliant,
            });
        }
    }
    None
}

/// Result of a stateless per-phase standards check.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceReport {
    pub compliant: bool,
    pub violations: Vec<String>,
    pub metrics: HashMap<&'static str, f64>,
}

mod standards {
    pub const PATTERN_ALT_TOLERANCE_FT: f64 = 100.0;
    pub const DOWNWIND_SPEED_TOLERANCE_KT: f64 = 5.0;
    pub const DOWNWIND_MAX_BANK_DEG: f64 = 30.0;

    pub const BASE_SPEED_TOLERANCE_KT: f64 = 5.0;
    pub const BASE_DESCENT_MIN_FPM: f64 = 400.0;
    pub const BASE_DESCENT_MAX_FPM: f64 = 800.0;
    pub const BASE_MAX_BANK_DEG: f64 = 30.0;

    pub const FINAL_STABILIZED_BY_AGL_FT: f64 = 500.0;
    pub const FINAL_GLIDEPATH_TOLERANCE_FT: f64 = 100.0;
    pub const FINAL_DESCENT_MIN_FPM: f64 = 400.0;
    pub const FINAL_DESCENT_MAX_FPM: f64 = 800.0;
    pub const FINAL_MAX_BANK_DEG: f64 = 15.0;
    pub const FINAL_MAX_LATERAL_NM: f64 = 0.1;

    pub const THRESHOLD_MIN_AGL_FT: f64 = 30.0;
    pub const THRESHOLD_MAX_AGL_FT: f64 = 60.0;
    pub const THRESHOLD_SPEED_TOLERANCE_KT: f64 = 5.0;
    pub const THRESHOLD_SINK_MIN_FPM: f64 = 100.0;
    pub const THRESHOLD_SINK_MAX_FPM: f64 = 300.0;

    pub const ROLLOUT_HEADING_TOLERANCE_DEG: f64 = 10.0;
}

/// Checks the sample against the target parameters of its current phase.
///
/// Target speeds derive from `vref_kt`: downwind Vref+20, base Vref+15,
/// final Vref to Vref+20, threshold Vref.
pub fn check_phase_compliance(
    view: &KinematicView,
    phase: ApproachPhase,
    runway: &Runway,
    vref_kt: f64,
) -> ComplianceReport {
    let mut violations = Vec::new();
    let mut metrics = HashMap::new();

    if phase == ApproachPhase::None {
        return ComplianceReport { compliant: false, violations, metrics };
    }

    let agl = runway.agl_ft(view.alt_ft);
    let dist = distance_nm(view.lat, view.lon, runway.threshold.lat, runway.threshold.lon);
    metrics.insert("distance_to_threshold_nm", dist);
    metrics.insert("altitude_agl_ft", agl);
    metrics.insert("altitude_msl_ft", view.alt_ft);

    match phase {
        ApproachPhase::Downwind => {
            let alt_dev = view.alt_ft - runway.pattern_altitude_ft();
            metrics.insert("altitude_deviation_ft", alt_dev);
            if alt_dev.abs() > standards::PATTERN_ALT_TOLERANCE_FT {
                violations
                    .push(format!("Altitude {:.0} ft from pattern altitude", alt_dev.abs()));
            }

            let target_speed = vref_kt + 20.0;
            let spd_dev = view.ias_kt - target_speed;
            metrics.insert("target_speed_kt", target_speed);
            metrics.insert("speed_deviation_kt", spd_dev);
            if spd_dev.abs() > standards::DOWNWIND_SPEED_TOLERANCE_KT {
                violations.push(format!("Airspeed {:.0} kt from target", spd_dev.abs()));
            }

            let bank_abs = view.bank_deg.abs();
            metrics.insert("bank_angle_deg", bank_abs);
            if bank_abs > standards::DOWNWIND_MAX_BANK_DEG {
                violations.push(format!(
                    "Bank angle {bank_abs:.0} deg exceeds {:.0} deg",
                    standards::DOWNWIND_MAX_BANK_DEG
                ));
            }
        }
        ApproachPhase::Base => {
            let target_speed = vref_kt + 15.0;
            let spd_dev = view.ias_kt - target_speed;
            metrics.insert("target_speed_kt", target_speed);
            metrics.insert("speed_deviation_kt", spd_dev);
            if spd_dev.abs() > standards::BASE_SPEED_TOLERANCE_KT {
                violations.push(format!("Airspeed {:.0} kt from target", spd_dev.abs()));
            }

            let vs_abs = view.vs_fpm.abs();
            metrics.insert("vertical_speed_fpm", view.vs_fpm);
            if vs_abs < standards::BASE_DESCENT_MIN_FPM || vs_abs > standards::BASE_DESCENT_MAX_FPM
            {
                violations.push(format!("Descent rate {vs_abs:.0} fpm out of range"));
            }

            let bank_abs = view.bank_deg.abs();
            metrics.insert("bank_angle_deg", bank_abs);
            if bank_abs > standards::BASE_MAX_BANK_DEG {
                violations.push(format!(
                    "Bank angle {bank_abs:.0} deg exceeds {:.0} deg",
                    standards::BASE_MAX_BANK_DEG
                ));
            }
        }
        ApproachPhase::Final => {
            let target_msl = glidepath_target_agl_ft(dist) + runway.elevation_ft;
            let glide_dev = view.alt_ft - target_msl;
            metrics.insert("glidepath_deviation_ft", glide_dev);
            metrics.insert("target_altitude_msl_ft", target_msl);
            if agl <= standards::FINAL_STABILIZED_BY_AGL_FT
                && glide_dev.abs() > standards::FINAL_GLIDEPATH_TOLERANCE_FT
            {
                violations.push(format!(
                    "Altitude {:.0} ft from glidepath (below 500 AGL)",
                    glide_dev.abs()
                ));
            }

            metrics.insert("airspeed_kt", view.ias_kt);
            if view.ias_kt < vref_kt || view.ias_kt > vref_kt + 20.0 {
                violations
                    .push(format!("Airspeed {:.0} kt outside Vref to Vref+20", view.ias_kt));
            }

            let vs_abs = view.vs_fpm.abs();
            metrics.insert("vertical_speed_fpm", view.vs_fpm);
            if vs_abs < standards::FINAL_DESCENT_MIN_FPM
                || vs_abs > standards::FINAL_DESCENT_MAX_FPM
            {
                violations.push(format!("Descent rate {vs_abs:.0} fpm out of range"));
            }

            let bank_abs = view.bank_deg.abs();
            metrics.insert("bank_angle_deg", bank_abs);
            if bank_abs > standards::FINAL_MAX_BANK_DEG {
                violations.push(format!(
                    "Bank angle {bank_abs:.0} deg exceeds {:.0} deg",
                    standards::FINAL_MAX_BANK_DEG
                ));
            }

            let lateral_abs = cross_track_nm(
                view.lat,
                view.lon,
                runway.threshold.lat,
                runway.threshold.lon,
                runway.opposite_end.lat,
                runway.opposite_end.lon,
            )
            .abs();
            metrics.insert("lateral_deviation_nm", lateral_abs);
            if lateral_abs > standards::FINAL_MAX_LATERAL_NM {
                violations.push(format!("{:.0} ft off centerline", lateral_abs * FT_PER_NM));
            }
        }
        ApproachPhase::Threshold => {
            let alt_min = standards::THRESHOLD_MIN_AGL_FT + runway.elevation_ft;
            let alt_max = standards::THRESHOLD_MAX_AGL_FT + runway.elevation_ft;
            metrics.insert("target_altitude_min_ft", alt_min);
            metrics.insert("target_altitude_max_ft", alt_max);
            if view.alt_ft < alt_min || view.alt_ft > alt_max {
                violations
                    .push(format!("Threshold crossing height {agl:.0} ft AGL out of range"));
            }

            let spd_dev = view.ias_kt - vref_kt;
            metrics.insert("target_speed_kt", vref_kt);
            metrics.insert("speed_deviation_kt", spd_dev);
            if spd_dev.abs() > standards::THRESHOLD_SPEED_TOLERANCE_KT {
                violations.push(format!("Airspeed {:.0} kt from Vref", spd_dev.abs()));
            }

            let vs_abs = view.vs_fpm.abs();
            metrics.insert("vertical_speed_fpm", view.vs_fpm);
            if vs_abs < standards::THRESHOLD_SINK_MIN_FPM
                || vs_abs > standards::THRESHOLD_SINK_MAX_FPM
            {
                violations.push(format!("Descent rate {vs_abs:.0} fpm out of range"));
            }
        }
        ApproachPhase::Rollout => {
            let hdg_dev = normalize_angle(view.hdg_true - runway.heading_deg).abs();
            metrics.insert("heading_deviation_deg", hdg_dev);
            if hdg_dev > standards::ROLLOUT_HEADING_TOLERANCE_DEG {
                violations.push(format!("Heading {hdg_dev:.0} deg off runway heading"));
            }
        }
        ApproachPhase::None => unreachable!(),
    }

    ComplianceReport { compliant: violations.is_empty(), violations, metrics }
}
