//! Timestamp watermark admission for incoming fixes

use crate::types::Fix;

/// Outcome of offering a fix to the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Fix timestamp is not newer than the watermark
    StaleOrDuplicate { watermark: i64 },
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Holds the timestamp of the most recently accepted fix.
///
/// A fix is admitted iff its timestamp is strictly greater than the watermark.
/// Accuracy, displacement and provider are not considered.
///
/// There is no watermark until the first fix is admitted, so that first fix
/// passes whatever its timestamp, including zero or negative values.
#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    watermark: Option<i64>,
    admitted: u64,
    rejected: u64,
}

impl AdmissionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp (epoch ms) of the last admitted fix
    pub fn watermark(&self) -> Option<i64> {
        self.watermark
    }

    pub fn admitted_count(&self) -> u64 {
        self.admitted
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected
    }

    /// Decide on `fix` and advance the watermark when it is admitted
    pub fn admit(&mut self, fix: &Fix) -> Admission {
        match self.watermark {
            Some(watermark) if fix.timestamp_ms <= watermark => {
                self.rejected += 1;
                Admission::StaleOrDuplicate { watermark }
            }
            _ => {
                self.watermark = Some(fix.timestamp_ms);
                self.admitted += 1;
                Admission::Admitted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(timestamp_ms: i64) -> Fix {
        Fix {
            timestamp_ms,
            latitude: 52.0,
            longitude: 0.5,
            accuracy: 10.0,
            bearing: None,
        }
    }

    #[test]
    fn test_scenario_sequence() {
        let mut filter = AdmissionFilter::new();
        let admitted: Vec<i64> = [100, 100, 250, 90, 300]
            .into_iter()
            .filter(|&ts| filter.admit(&fix(ts)).is_admitted())
            .collect();

        assert_eq!(admitted, vec![100, 250, 300]);
        assert_eq!(filter.watermark(), Some(300));
        assert_eq!(filter.admitted_count(), 3);
        assert_eq!(filter.rejected_count(), 2);
    }

    #[test]
    fn test_replay_is_rejected() {
        let mut filter = AdmissionFilter::new();
        assert_eq!(filter.admit(&fix(500)), Admission::Admitted);
        assert_eq!(
            filter.admit(&fix(500)),
            Admission::StaleOrDuplicate { watermark: 500 }
        );
        assert_eq!(filter.watermark(), Some(500));
    }

    #[test]
    fn test_rejection_leaves_watermark() {
        let mut filter = AdmissionFilter::new();
        filter.admit(&fix(1_000));
        filter.admit(&fix(10));
        filter.admit(&fix(999));
        assert_eq!(filter.watermark(), Some(1_000));
    }

    #[test]
    fn test_watermark_is_max_of_admitted() {
        let sequence = [5, 3, 8, 8, 1, 20, 19, 21, 0];
        let mut filter = AdmissionFilter::new();
        let mut max_admitted = None;
        for ts in sequence {
            let before = filter.watermark();
            let outcome = filter.admit(&fix(ts));
            if let Some(w) = before {
                assert_eq!(outcome.is_admitted(), ts > w);
            }
            if outcome.is_admitted() {
                max_admitted = max_admitted.max(Some(ts));
            }
        }
        assert_eq!(filter.watermark(), max_admitted);
        assert_eq!(filter.watermark(), Some(21));
    }

    #[test]
    fn test_first_fix_always_admitted() {
        let mut filter = AdmissionFilter::new();
        assert_eq!(filter.watermark(), None);
        assert!(filter.admit(&fix(-5)).is_admitted());
        assert!(filter.admit(&fix(0)).is_admitted());
        assert!(!filter.admit(&fix(-1)).is_admitted());
        assert_eq!(filter.watermark(), Some(0));
    }

    #[test]
    fn test_accuracy_is_irrelevant() {
        let mut filter = AdmissionFilter::new();
        let mut bad = fix(10);
        bad.accuracy = 10_000.0;
        assert!(filter.admit(&bad).is_admitted());
    }
}
