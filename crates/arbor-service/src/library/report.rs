//! Aggregated results for batch operations.

use arbor_core::error::AppError;
use arbor_core::result::AppResult;
use arbor_core::types::NodeId;

/// Outcome of a batch operation over many node ids.
///
/// Ids are processed independently; one failure never aborts the rest.
/// Each failure keeps the id it belongs to and the error it produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of ids the batch attempted.
    pub attempted: usize,
    /// Ids that failed, with the error for each.
    pub failures: Vec<(NodeId, AppError)>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one per-id outcome.
    pub fn record<T>(&mut self, id: NodeId, result: AppResult<T>) {
        self.attempted += 1;
        if let Err(error) = result {
            self.failures.push((id, error));
        }
    }

    /// Whether every attempted id succeeded.
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether some ids succeeded and some failed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && self.failures.len() < self.attempted
    }

    /// Number of ids that succeeded.
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accounting() {
        let mut report = BatchReport::new();
        assert!(report.ok());
        assert!(!report.is_partial());

        report.record(NodeId::new(), Ok(()));
        assert!(report.ok());

        report.record(NodeId::new(), Err::<(), _>(AppError::not_found("gone")));
        assert!(!report.ok());
        assert!(report.is_partial());
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded(), 1);
    }
}
