//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use stallmap_core::StallMap;

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats stalls as the array the server returned, unknown fields included.
    pub fn format_stalls(&self, stalls: &StallMap) -> Result<String> {
        self.format(stalls.raw())
    }
}
