//! Per-item results of a sequential request loop.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome<T> {
    pub item: T,
    pub outcome: Outcome,
}

/// Ordered outcomes, one per request issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport<T> {
    outcomes: Vec<ItemOutcome<T>>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self { outcomes: Vec::new() }
    }
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeded(&mut self, item: T) {
        self.outcomes.push(ItemOutcome {
            item,
            outcome: Outcome::Succeeded,
        });
    }

    pub fn failed(&mut self, item: T, message: impl Into<String>) {
        self.outcomes.push(ItemOutcome {
            item,
            outcome: Outcome::Failed(message.into()),
        });
    }

    pub fn outcomes(&self) -> &[ItemOutcome<T>] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&T, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            Outcome::Failed(msg) => Some((&o.item, msg.as_str())),
            Outcome::Succeeded => None,
        })
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome.is_success())
    }
}

impl<T> fmt::Display for BatchReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} succeeded", self.success_count(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_failures() {
        let mut report = BatchReport::new();
        report.succeeded(1);
        report.failed(2, "HTTP 500");
        report.succeeded(3);

        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert!(!report.all_succeeded());
        assert_eq!(report.failures().collect::<Vec<_>>(), vec![(&2, "HTTP 500")]);
        assert_eq!(report.to_string(), "2/3 succeeded");
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report: BatchReport<i64> = BatchReport::new();
        assert!(report.is_empty());
        assert!(report.all_succeeded());
    }
}
