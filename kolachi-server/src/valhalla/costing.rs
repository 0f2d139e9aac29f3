//! Default costing options per travel mode.
//!
//! When a caller supplies no costing options, the mode's entry here (if
//! any) is sent instead. Modes without an entry get the engine's own
//! defaults.

use serde_json::{Value, json};

pub const AUTO: &str = "auto";
pub const BICYCLE: &str = "bicycle";
pub const PEDESTRIAN: &str = "pedestrian";
pub const MULTIMODAL: &str = "multimodal";
pub const TRANSIT: &str = "transit";
pub const BUS: &str = "bus";

/// Builds a mode's default costing options.
type DefaultOptions = fn() -> Value;

/// Mode tag → default costing options.
const DEFAULTS: &[(&str, DefaultOptions)] = &[(MULTIMODAL, multimodal)];

/// Transit on buses and rail with transfers; the walking legs avoid
/// ferries and tracks and give living streets half weight.
fn multimodal() -> Value {
    json!({
        "transit": {
            "use_bus": 1,
            "use_rail": 1,
            "use_transfers": 1
        },
        "pedestrian": {
            "use_ferry": 0,
            "use_living_streets": 0.5,
            "use_tracks": 0
        }
    })
}

/// Default costing options for `costing`, if the mode has any.
pub fn default_options(costing: &str) -> Option<Value> {
    DEFAULTS
        .iter()
        .find(|(mode, _)| *mode == costing)
        .map(|(_, build)| build())
}
