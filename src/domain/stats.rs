use serde::{Deserialize, Serialize};

/// Points awarded or revoked per completion transition
pub const POINTS_PER_COMPLETION: i64 = 10;

/// Aggregate per-user stats, mutated alongside completion toggles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_points: u64,
}

impl UserStats {
    /// Apply a point delta, clamped at a floor of zero
    pub fn apply_delta(&mut self, delta: i64) {
        if delta >= 0 {
            self.total_points = self.total_points.saturating_add(delta as u64);
        } else {
            self.total_points = self.total_points.saturating_sub(delta.unsigned_abs());
        }
    }
}
