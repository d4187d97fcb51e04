//! Run statistics

use std::time::{Duration, Instant};

use crate::domain::size::diff_string;

/// Totals accumulated over one run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub failures: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    started: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            failures: 0,
            input_bytes: 0,
            output_bytes: 0,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// One line summary, or `None` when nothing was measured
    pub fn summary(&self) -> Option<String> {
        self.summary_with_elapsed(self.elapsed())
    }

    fn summary_with_elapsed(&self, elapsed: Duration) -> Option<String> {
        if self.input_bytes == 0 {
            return None;
        }

        let mut parts = Vec::new();
        match self.failures {
            0 => {}
            1 => parts.push("😬 encountered a single failed conversion".to_string()),
            n => parts.push(format!("😬 encountered {n} failed conversions")),
        }
        parts.push(diff_string(self.output_bytes, self.input_bytes));
        parts.push(format!("took {}s", elapsed.as_secs_f64().round() as u64));

        Some(format!("Finished: {}", parts.join(" | ")))
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_summary_without_bytes() {
        let stats = RunStats::new();
        assert!(stats.summary().is_none());
    }

    #[test]
    fn summary_lists_failures_and_sizes() {
        let stats = RunStats {
            failures: 2,
            input_bytes: 11_000,
            output_bytes: 9_000,
            ..RunStats::new()
        };
        let summary = stats
            .summary_with_elapsed(Duration::from_millis(2_600))
            .unwrap();
        assert_eq!(
            summary,
            "Finished: 😬 encountered 2 failed conversions | 10KB ➡️  8KB (-18.2%) | took 3s"
        );
    }

    #[test]
    fn summary_single_failure_wording() {
        let stats = RunStats {
            failures: 1,
            input_bytes: 100,
            output_bytes: 100,
            ..RunStats::new()
        };
        let summary = stats.summary_with_elapsed(Duration::ZERO).unwrap();
        assert!(summary.contains("a single failed conversion"));
    }
}
