//! Configuration validation with range checks.

use chrono::NaiveDate;

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if NaiveDate::from_ymd_opt(self.resolver.floor_year, 1, 1).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "resolver.floor_year {} is not a valid year",
                self.resolver.floor_year
            )));
        }
        if self.writer.subject.is_empty() {
            return Err(ConfigError::ValidationError(
                "writer.subject must contain at least one keyword".into(),
            ));
        }
        if self.writer.subject.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "writer.subject must not contain blank keywords".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_empty_allow_list() {
        let mut config = Config::default();
        config.processing.supported_formats.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("supported_formats"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_floor() {
        let mut config = Config::default();
        config.resolver.floor_year = i32::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("floor_year"));
    }

    #[test]
    fn test_validate_rejects_blank_subject() {
        let mut config = Config::default();
        config.writer.subject = vec!["Screenshot".into(), "  ".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("writer.subject"));
    }
}
