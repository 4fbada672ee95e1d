use serde::{Deserialize, Serialize};

/// Default number of consecutive comm errors tolerated per operation.
pub const DEFAULT_RETRY_THRESHOLD: u32 = 3;

/// System-wide policy knobs consulted by operations.
///
/// Passed into each operation when it is built; operations never read
/// process-global settings.
pub trait SystemConfig: Send + Sync {
    /// Consecutive comm errors allowed before an operation gives up.
    fn retry_threshold(&self) -> u32;
}

/// Plain engine configuration, loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive comm errors allowed before an operation gives up.
    pub retry_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_threshold: DEFAULT_RETRY_THRESHOLD,
        }
    }
}

impl SystemConfig for EngineConfig {
    fn retry_threshold(&self) -> u32 {
        self.retry_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.retry_threshold(), DEFAULT_RETRY_THRESHOLD);
    }

    #[test]
    fn retry_threshold_from_json() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"retry_threshold": 5}"#).unwrap();
        assert_eq!(cfg.retry_threshold(), 5);
    }
}
