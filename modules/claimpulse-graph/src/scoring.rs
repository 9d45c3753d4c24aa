//! Pure velocity math: per-window growth rates from snapshots, the
//! composite score, and the viral-status classification. No I/O here —
//! `velocity.rs` is the persistence shell around these functions.

use chrono::{DateTime, Duration, Utc};

use claimpulse_common::{SnapshotRecord, VelocityStatus};

/// Velocity weights and status thresholds. The defaults are the product
/// policy; they are parameters, not invariants.
#[derive(Debug, Clone)]
pub struct VelocityConfig {
    pub weight_1h: f64,
    pub weight_6h: f64,
    pub weight_24h: f64,
    pub viral_threshold: f64,
    pub emerging_threshold: f64,
    pub active_threshold: f64,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            weight_1h: 0.5,
            weight_6h: 0.3,
            weight_24h: 0.2,
            viral_threshold: 50.0,
            emerging_threshold: 20.0,
            active_threshold: 5.0,
        }
    }
}

impl VelocityConfig {
    /// Status is a pure function of the current velocity score — no
    /// transition history.
    pub fn classify(&self, velocity_score: f64) -> VelocityStatus {
        if velocity_score >= self.viral_threshold {
            VelocityStatus::Viral
        } else if velocity_score >= self.emerging_threshold {
            VelocityStatus::Emerging
        } else if velocity_score >= self.active_threshold {
            VelocityStatus::Active
        } else if velocity_score > 0.0 {
            VelocityStatus::Slow
        } else {
            VelocityStatus::Dormant
        }
    }
}

/// One full velocity computation for a trend.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityReading {
    pub velocity_1h: f64,
    pub velocity_6h: f64,
    pub velocity_24h: f64,
    pub velocity_score: f64,
    pub shares_per_hour: f64,
    pub status: VelocityStatus,
}

impl VelocityReading {
    /// The zero reading: the valid steady state for a trend with no
    /// snapshot history yet. Not an error.
    pub fn zero() -> Self {
        Self {
            velocity_1h: 0.0,
            velocity_6h: 0.0,
            velocity_24h: 0.0,
            velocity_score: 0.0,
            shares_per_hour: 0.0,
            status: VelocityStatus::Dormant,
        }
    }
}

/// Compute the velocity reading for a trend from its current check count
/// and its snapshots within the 24h lookback.
///
/// For each window, the baseline is the snapshot closest to `now - window`;
/// a window with no usable baseline degrades to zero growth.
pub fn compute_velocity(
    current_count: u32,
    snapshots: &[SnapshotRecord],
    now: DateTime<Utc>,
    cfg: &VelocityConfig,
) -> VelocityReading {
    let velocity_1h = window_velocity(current_count, snapshots, now, 1);
    let velocity_6h = window_velocity(current_count, snapshots, now, 6);
    let velocity_24h = window_velocity(current_count, snapshots, now, 24);

    let velocity_score = velocity_1h * cfg.weight_1h
        + velocity_6h * cfg.weight_6h
        + velocity_24h * cfg.weight_24h;

    let shares_per_hour = if velocity_6h != 0.0 {
        velocity_6h
    } else {
        velocity_24h
    };

    VelocityReading {
        velocity_1h,
        velocity_6h,
        velocity_24h,
        velocity_score,
        shares_per_hour,
        status: cfg.classify(velocity_score),
    }
}

/// Growth rate over one window: (current - baseline) / window_hours,
/// with the baseline snapshot picked closest to `now - window_hours`.
fn window_velocity(
    current_count: u32,
    snapshots: &[SnapshotRecord],
    now: DateTime<Utc>,
    window_hours: i64,
) -> f64 {
    let target = now - Duration::hours(window_hours);
    match closest_snapshot(snapshots, target) {
        Some(snap) => (current_count as f64 - snap.check_count as f64) / window_hours as f64,
        None => 0.0,
    }
}

/// The snapshot whose timestamp is nearest the target instant.
fn closest_snapshot(
    snapshots: &[SnapshotRecord],
    target: DateTime<Utc>,
) -> Option<&SnapshotRecord> {
    snapshots.iter().min_by_key(|s| {
        (s.recorded_at - target)
            .num_seconds()
            .abs()
    })
}
