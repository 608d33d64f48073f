use crate::store::TestResult;
use crate::util::rounded_mean;
use chrono::Local;
use time_humanize::{Accuracy, HumanTime, Tense};

/// Aggregates derived from the full result history. Recomputed from the
/// store on every read; no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub average_wpm: u32,
    pub average_accuracy: u32,
    pub total_tests: usize,
}

pub fn summarize(results: &[TestResult]) -> HistorySummary {
    let wpms: Vec<f64> = results.iter().map(|r| r.wpm as f64).collect();
    let accuracies: Vec<f64> = results.iter().map(|r| r.accuracy as f64).collect();

    HistorySummary {
        average_wpm: rounded_mean(&wpms),
        average_accuracy: rounded_mean(&accuracies),
        total_tests: results.len(),
    }
}

/// Chart series over test number: (wpm points, accuracy points).
pub fn chart_series(results: &[TestResult]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let wpm = results
        .iter()
        .enumerate()
        .map(|(i, r)| ((i + 1) as f64, r.wpm as f64))
        .collect();
    let accuracy = results
        .iter()
        .enumerate()
        .map(|(i, r)| ((i + 1) as f64, r.accuracy as f64))
        .collect();
    (wpm, accuracy)
}

/// Axis label for one result, e.g. "Mar 04 18:22".
pub fn date_label(result: &TestResult) -> String {
    result.timestamp.format("%b %d %H:%M").to_string()
}

/// Humanized age of the most recent result, e.g. "2 hours ago".
pub fn last_test_ago(results: &[TestResult]) -> Option<String> {
    results.last().map(|r| {
        let elapsed = Local::now()
            .signed_duration_since(r.timestamp)
            .to_std()
            .unwrap_or_default();
        HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn result(wpm: u32, accuracy: u32) -> TestResult {
        TestResult {
            wpm,
            accuracy,
            mistakes: 0,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn summarize_empty_history() {
        let summary = summarize(&[]);

        assert_eq!(summary.average_wpm, 0);
        assert_eq!(summary.average_accuracy, 0);
        assert_eq!(summary.total_tests, 0);
    }

    #[test]
    fn summarize_rounds_means() {
        let results = vec![result(40, 90), result(45, 100), result(52, 95)];

        let summary = summarize(&results);

        // 137/3 = 45.67 -> 46, 285/3 = 95
        assert_eq!(summary.average_wpm, 46);
        assert_eq!(summary.average_accuracy, 95);
        assert_eq!(summary.total_tests, 3);
    }

    #[test]
    fn chart_series_is_time_ordered() {
        let results = vec![result(30, 80), result(40, 90), result(50, 100)];

        let (wpm, accuracy) = chart_series(&results);

        assert_eq!(wpm, vec![(1.0, 30.0), (2.0, 40.0), (3.0, 50.0)]);
        assert_eq!(accuracy, vec![(1.0, 80.0), (2.0, 90.0), (3.0, 100.0)]);
    }

    #[test]
    fn chart_series_empty() {
        let (wpm, accuracy) = chart_series(&[]);
        assert!(wpm.is_empty());
        assert!(accuracy.is_empty());
    }

    #[test]
    fn date_label_format() {
        let label = date_label(&result(40, 90));
        // "%b %d %H:%M" -> e.g. "Aug 30 14:05"
        assert_eq!(label.len(), 12);
        assert!(label.contains(' '));
    }

    #[test]
    fn last_test_ago_empty_history() {
        assert_eq!(last_test_ago(&[]), None);
    }

    #[test]
    fn last_test_ago_reports_most_recent() {
        let mut old = result(30, 80);
        old.timestamp = Local::now() - Duration::hours(5);
        let mut recent = result(50, 95);
        recent.timestamp = Local::now() - Duration::minutes(2);

        let ago = last_test_ago(&[old, recent]).unwrap();
        assert!(ago.contains("minute"), "unexpected label: {ago}");
    }
}
