use serde::{Deserialize, Serialize};

/// Which direction of threshold crossing arms the trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSlope {
    #[default]
    Rising,
    Falling,
}

/// Returns the index of the first adjacent sample pair that crosses
/// `threshold` in the direction of `slope`.
///
/// The scan is a single left-to-right pass over adjacent pairs; the first
/// match wins. A buffer without a qualifying crossing (including buffers
/// shorter than two samples) yields 0, so the trace renders unstabilised
/// from the start.
pub fn find_trigger(samples: &[u8], threshold: u8, slope: EdgeSlope) -> usize {
    for (i, pair) in samples.windows(2).enumerate() {
        let (left, right) = (pair[0], pair[1]);
        let crossed = match slope {
            EdgeSlope::Rising => left <= threshold && right >= threshold,
            EdgeSlope::Falling => left >= threshold && right <= threshold,
        };
        if crossed {
            return i;
        }
    }
    0
}
