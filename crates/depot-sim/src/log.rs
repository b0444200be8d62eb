//! Episode statistics.
//!
//! Each finished episode produces a [`LogRecord`]. Records accumulate in
//! an [`EpisodeLog`] (running sums plus a count) until the host drains
//! them, at which point the sums become a [`LogSummary`] of means.

/// Statistics of one finished episode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogRecord {
    /// Sum of all agents' rewards over the episode.
    pub episode_return: f32,
    /// Ticks played.
    pub episode_length: u64,
    /// Shelves delivered.
    pub score: f32,
}

/// Running sums over finished episodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EpisodeLog {
    episode_return: f64,
    episode_length: f64,
    score: f64,
    n: u32,
}

impl EpisodeLog {
    /// Add one episode.
    pub fn push(&mut self, record: LogRecord) {
        self.episode_return += f64::from(record.episode_return);
        self.episode_length += record.episode_length as f64;
        self.score += f64::from(record.score);
        self.n += 1;
    }

    /// Fold another log into this one.
    pub fn merge(&mut self, other: &EpisodeLog) {
        self.episode_return += other.episode_return;
        self.episode_length += other.episode_length;
        self.score += other.score;
        self.n += other.n;
    }

    /// Episodes recorded.
    pub fn len(&self) -> u32 {
        self.n
    }

    /// Whether no episode has been recorded.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the accumulated log and start a fresh one.
    pub fn take(&mut self) -> EpisodeLog {
        std::mem::take(self)
    }

    /// Per-episode means. All zeros when empty.
    pub fn summary(&self) -> LogSummary {
        if self.n == 0 {
            return LogSummary::default();
        }
        let n = f64::from(self.n);
        LogSummary {
            episode_return: (self.episode_return / n) as f32,
            episode_length: (self.episode_length / n) as f32,
            score: (self.score / n) as f32,
            n: self.n,
        }
    }
}

/// Mean episode statistics over a drained [`EpisodeLog`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogSummary {
    /// Mean episode return.
    pub episode_return: f32,
    /// Mean episode length in ticks.
    pub episode_length: f32,
    /// Mean shelves delivered per episode.
    pub score: f32,
    /// Episodes averaged.
    pub n: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ret: f32, len: u64, score: f32) -> LogRecord {
        LogRecord {
            episode_return: ret,
            episode_length: len,
            score,
        }
    }

    #[test]
    fn empty_log_summarises_to_zeros() {
        assert_eq!(EpisodeLog::default().summary(), LogSummary::default());
    }

    #[test]
    fn summary_is_exact_mean() {
        let mut log = EpisodeLog::default();
        log.push(record(1.0, 10, 1.0));
        log.push(record(2.0, 20, 0.0));
        log.push(record(4.5, 30, 5.0));
        let s = log.summary();
        assert_eq!(s.n, 3);
        assert_eq!(s.episode_return, 2.5);
        assert_eq!(s.episode_length, 20.0);
        assert_eq!(s.score, 2.0);
    }

    #[test]
    fn take_drains() {
        let mut log = EpisodeLog::default();
        log.push(record(1.0, 1, 1.0));
        let drained = log.take();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = EpisodeLog::default();
        a.push(record(1.0, 2, 0.0));
        let mut b = EpisodeLog::default();
        b.push(record(3.0, 4, 2.0));
        a.merge(&b);
        let s = a.summary();
        assert_eq!(s.n, 2);
        assert_eq!(s.episode_return, 2.0);
        assert_eq!(s.episode_length, 3.0);
        assert_eq!(s.score, 1.0);
    }
}
