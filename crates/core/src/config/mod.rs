use serde::{Deserialize, Serialize};

use crate::{EdgeSlope, Result};

/// Options accepted when constructing an oscilloscope widget. Immutable once
/// the widget is built.
///
/// A partial JSON document with camelCase keys parses via
/// [`ScopeConfig::from_json_str`]; omitted keys keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeConfig {
    /// Snapshot size forwarded verbatim to the analyser. Values outside the
    /// supported power-of-two set are rejected by the analyser itself when
    /// the widget is constructed.
    pub fft_size: usize,
    /// Amplitude level, in raw sample units, the trigger compares against.
    pub edge_threshold: u8,
    /// Which direction of crossing arms the trigger.
    pub edge_slope: EdgeSlope,
    /// Opaque color string used to clear the surface each frame.
    pub background_color: String,
    /// Opaque color string used to stroke the trace.
    pub line_color: String,
    /// Stroke width of the trace.
    pub line_width: f32,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            edge_threshold: 0,
            edge_slope: EdgeSlope::Rising,
            background_color: "rgb(0, 0, 0)".to_string(),
            line_color: "gray".to_string(),
            line_width: 5.0,
        }
    }
}

impl ScopeConfig {
    /// Parses a JSON options document, filling omitted keys with defaults.
    pub fn from_json_str(options: &str) -> Result<Self> {
        Ok(serde_json::from_str(options)?)
    }
}
