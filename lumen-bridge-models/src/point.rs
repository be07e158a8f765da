use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One incoming observation for a channel.
///
/// `value` is kept as a raw JSON number so that range and finiteness checks
/// happen in the engine, where they can be reported per point instead of
/// failing the whole request at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub channel_number: i32,
    pub value: Number,
    pub color: String,
}

impl DataPoint {
    /// Resolve the raw JSON number to a finite `f64`.
    pub fn finite_value(&self) -> Result<f64, String> {
        match self.value.as_f64() {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(format!("not a finite number: {}", self.value)),
        }
    }
}
