use crate::error::{MinerError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds, the default starting timestamp of a
/// search.
pub fn current_unix_time() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| MinerError::Time(format!("System time error: {e}")))?
        .as_secs();

    if duration > i64::MAX as u64 {
        return Err(MinerError::Time("Timestamp overflow".to_string()));
    }

    Ok(duration as i64)
}
