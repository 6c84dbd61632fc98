use super::approach::ApproachOutcome;
use super::path_following::PathOutcome;
use super::steep_turn::SteepTurnOutcome;
use crate::common::{EntrySnapshot, KinematicView};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    SteepTurn,
    PathFollowing,
    Approach,
}

/// One throttled flight path trace point, recorded while airborne and
/// moving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracePoint {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: f64,
    pub hdg_true: f64,
    pub bank_deg: f64,
    pub pitch_deg: f64,
    pub ias_kt: f64,
    pub vs_fpm: f64,
}

impl TracePoint {
    pub fn from_view(view: &KinematicView) -> Self {
        Self {
            timestamp: view.timestamp,
            lat: view.lat,
            lon: view.lon,
            alt_ft: view.alt_ft,
            hdg_true: view.hdg_true,
            bank_deg: view.bank_deg,
            pitch_deg: view.pitch_deg,
            ias_kt: view.ias_kt,
            vs_fpm: view.vs_fpm,
        }
    }
}

/// Maneuver specific terminal data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverOutcome {
    SteepTurn(SteepTurnOutcome),
    PathFollowing(PathOutcome),
    Approach(ApproachOutcome),
}

/// The session's terminal, immutable output record. Built exactly once per
/// session lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManeuverResult {
    pub kind: ManeuverKind,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub entry: Option<EntrySnapshot>,
    pub outcome: ManeuverOutcome,
    pub trace: Vec<TracePoint>,
}

impl ManeuverResult {
    /// Key the persistence collaborator deduplicates on.
    pub fn save_key(&self, user: &str) -> String {
        format!("{user}:{}:{}", self.kind, self.started_at.timestamp_millis())
    }
}

/// Idempotency cache for result persistence: a key can be claimed once per
/// TTL window. Replaces ad hoc global dedup state; the caller owns it.
#[derive(Debug)]
pub struct SaveGuard {
    ttl: TimeDelta,
    claimed: HashMap<String, DateTime<Utc>>,
}

impl SaveGuard {
    pub fn new(ttl: TimeDelta) -> Self {
        Self { ttl, claimed: HashMap::new() }
    }

    /// Claims the key. Returns false if it is already held within the TTL,
    /// in which case the caller must not save again.
    pub fn try_claim(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        self.claimed.retain(|_, expiry| *expiry > now);
        if self.claimed.contains_key(key) {
            return false;
        }
        self.claimed.insert(key.to_string(), now + self.ttl);
        true
    }

    pub fn len(&self) -> usize { self.claimed.len() }
    pub fn is_empty(&self) -> bool { self.claimed.is_empty() }
}
