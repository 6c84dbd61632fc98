use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One aircraft state sample as delivered by the telemetry bridge.
///
/// Kinematic fields are optional because the bridge may deliver partial
/// frames during simulator pauses or reconnects. Consumers call
/// [`TelemetrySample::kinematics`] and skip the tick if it returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Indicated altitude in feet MSL.
    pub alt_ft: Option<f64>,
    /// True heading in degrees, [0, 360).
    pub hdg_true: Option<f64>,
    /// Bank angle in degrees, positive right wing down.
    pub bank_deg: Option<f64>,
    /// Pitch angle in degrees, positive nose up.
    pub pitch_deg: Option<f64>,
    /// Indicated airspeed in knots.
    pub ias_kt: Option<f64>,
    /// Vertical speed in feet per minute.
    pub vs_fpm: Option<f64>,
    pub on_ground: bool,
    #[serde(default)]
    pub yaw_rate: Option<f64>,
    #[serde(default)]
    pub g_force: Option<f64>,
}

/// Fully populated view onto a sample, valid for one tick.
#[derive(Debug, Clone, Copy)]
pub struct KinematicView {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: f64,
    pub hdg_true: f64,
    pub bank_deg: f64,
    pub pitch_deg: f64,
    pub ias_kt: f64,
    pub vs_fpm: f64,
    pub on_ground: bool,
}

impl TelemetrySample {
    /// Collapses the optional fields into a [`KinematicView`].
    ///
    /// # Returns
    /// `None` if any kinematic field is missing. The caller skips the tick
    /// atomically in that case.
    pub fn kinematics(&self) -> Option<KinematicView> {
        Some(KinematicView {
            timestamp: self.timestamp,
            lat: self.lat?,
            lon: self.lon?,
            alt_ft: self.alt_ft?,
            hdg_true: self.hdg_true?,
            bank_deg: self.bank_deg?,
            pitch_deg: self.pitch_deg?,
            ias_kt: self.ias_kt?,
            vs_fpm: self.vs_fpm?,
            on_ground: self.on_ground,
        })
    }
}

/// One end of a runway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayEnd {
    pub lat: f64,
    pub lon: f64,
}

/// Runway geometry, immutable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runway {
    pub threshold: RunwayEnd,
    pub opposite_end: RunwayEnd,
    /// Landing direction in degrees true.
    pub heading_deg: f64,
    pub elevation_ft: f64,
    pub length_ft: f64,
    pub width_ft: f64,
}

impl Runway {
    /// Standard pattern altitude: field elevation plus 1000 ft.
    pub fn pattern_altitude_ft(&self) -> f64 { self.elevation_ft + 1000.0 }

    /// Height above the runway surface for a given MSL altitude.
    pub fn agl_ft(&self, alt_ft: f64) -> f64 { alt_ft - self.elevation_ft }
}

/// A reference path vertex for path following maneuvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: f64,
    pub ias_kt: f64,
    pub bank_deg: f64,
    pub pitch_deg: f64,
}

/// Aircraft state captured once when a maneuver starts.
///
/// All later deviations are measured against this snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub timestamp: DateTime<Utc>,
    pub hdg_true: f64,
    pub alt_ft: f64,
    pub ias_kt: f64,
    pub lat: f64,
    pub lon: f64,
}

impl EntrySnapshot {
    pub fn from_view(view: &KinematicView) -> Self {
        Self {
            timestamp: view.timestamp,
            hdg_true: view.hdg_true,
            alt_ft: view.alt_ft,
            ias_kt: view.ias_kt,
            lat: view.lat,
            lon: view.lon,
        }
    }
}
