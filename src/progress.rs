//! Progress reporting for content downloads.

/// Progress of a single node transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes written so far
    pub done: u64,
    /// Expected size from the node's content properties (0 if unknown)
    pub total: u64,
    /// Name of the node being transferred
    pub name: String,
}

impl TransferProgress {
    pub fn new(done: u64, total: u64, name: impl Into<String>) -> Self {
        Self {
            done,
            total,
            name: name.into(),
        }
    }

    /// Progress as a percentage (0.0 to 100.0). Unknown totals report 0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.done as f64 / self.total as f64 * 100.0).min(100.0)
    }

    /// Whether the expected size has been reached.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done >= self.total
    }
}

/// Callback invoked after every chunk. Returning `false` cancels the transfer.
pub type ProgressCallback = Box<dyn FnMut(&TransferProgress) -> bool + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(TransferProgress::new(21, 42, "a").percent(), 50.0);
        assert_eq!(TransferProgress::new(10, 0, "a").percent(), 0.0);
        assert_eq!(TransferProgress::new(50, 42, "a").percent(), 100.0);
    }

    #[test]
    fn test_is_complete() {
        assert!(TransferProgress::new(42, 42, "a").is_complete());
        assert!(!TransferProgress::new(41, 42, "a").is_complete());
        assert!(!TransferProgress::new(0, 0, "a").is_complete());
    }
}
