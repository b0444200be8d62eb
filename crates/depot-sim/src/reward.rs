//! Reward shaping.

/// Per-agent reward weights.
///
/// Each agent is rewarded individually: `delivery` when it completes a
/// delivery, `progress` when it moves strictly closer to the nearest goal
/// while carrying a requested shelf, and `blocked` (usually zero or
/// negative) for every refused move.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardConfig {
    /// Reward for delivering a requested shelf.
    pub delivery: f32,
    /// Shaping reward for approaching a goal with a requested shelf.
    pub progress: f32,
    /// Reward applied on every blocked move.
    pub blocked: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            delivery: 1.0,
            progress: 0.01,
            blocked: 0.0,
        }
    }
}

impl RewardConfig {
    /// Delivery reward only, no shaping.
    pub fn sparse() -> Self {
        Self {
            delivery: 1.0,
            progress: 0.0,
            blocked: 0.0,
        }
    }

    /// Name of the first non-finite weight, if any.
    pub(crate) fn non_finite(&self) -> Option<&'static str> {
        [
            ("delivery", self.delivery),
            ("progress", self.progress),
            ("blocked", self.blocked),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Shaping term for one agent's move.
    ///
    /// `before`/`after` are distances to the nearest goal, only present
    /// while the agent carries a requested shelf.
    pub(crate) fn progress_for(&self, before: Option<u32>, after: Option<u32>) -> f32 {
        match (before, after) {
            (Some(b), Some(a)) if a < b => self.progress,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_requires_strict_improvement() {
        let r = RewardConfig::default();
        assert_eq!(r.progress_for(Some(4), Some(3)), 0.01);
        assert_eq!(r.progress_for(Some(3), Some(3)), 0.0);
        assert_eq!(r.progress_for(Some(3), Some(4)), 0.0);
        assert_eq!(r.progress_for(None, Some(1)), 0.0);
    }

    #[test]
    fn detects_non_finite_weights() {
        assert_eq!(RewardConfig::default().non_finite(), None);
        let bad = RewardConfig {
            blocked: f32::NAN,
            ..RewardConfig::sparse()
        };
        assert_eq!(bad.non_finite(), Some("blocked"));
    }
}
