mod geodesy;
mod telemetry;

pub use geodesy::{
    bearing_deg, cross_track_nm, destination_point, distance_nm, normalize_angle,
};
pub use telemetry::{
    EntrySnapshot, KinematicView, PathPoint, Runway, RunwayEnd, TelemetrySample,
};
