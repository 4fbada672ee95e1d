use std::path::Path;

use fieldpoll_op::EngineConfig;
use tracing::debug;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// Engine configuration from `path` (JSON), with `retry_threshold`
/// overriding whatever the file says.
pub fn load(path: Option<&Path>, retry_threshold: Option<u32>) -> CliResult<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
            serde_json::from_str(&text).map_err(|err| {
                CliError::new(DATA_INVALID, format!("parse {}: {err}", path.display()))
            })?
        }
        None => EngineConfig::default(),
    };
    if let Some(n) = retry_threshold {
        config.retry_threshold = n;
    }
    debug!(retry_threshold = config.retry_threshold, "engine config");
    Ok(config)
}
