use crate::error::SyncdbError;

/// Runtime configuration for a syncdb engine.
#[derive(Debug, Clone)]
pub struct SyncdbConfig {
    /// Upper bound on the number of change records returned by a single
    /// range scan over a document's change log.
    pub max_scan_changes: usize,
}

impl Default for SyncdbConfig {
    fn default() -> Self {
        Self {
            max_scan_changes: 10_000,
        }
    }
}

impl SyncdbConfig {
    pub fn with_max_scan_changes(mut self, max_scan_changes: usize) -> Self {
        self.max_scan_changes = max_scan_changes;
        self
    }

    pub fn validate(&self) -> Result<(), SyncdbError> {
        if self.max_scan_changes == 0 {
            return Err(SyncdbError::Validation(
                "max_scan_changes must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SyncdbConfig;

    #[test]
    fn default_config_is_valid() {
        SyncdbConfig::default().validate().expect("valid");
    }

    #[test]
    fn zero_scan_bound_is_rejected() {
        let config = SyncdbConfig::default().with_max_scan_changes(0);
        assert!(config.validate().is_err());
    }
}
