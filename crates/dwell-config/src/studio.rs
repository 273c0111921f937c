//! Design studio behaviour.

use serde::{Deserialize, Serialize};

fn default_style() -> String {
    String::from("Modern")
}

const fn default_max_final_designs() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudioConfig {
    /// Style used when none is given for a render.
    #[serde(default = "default_style")]
    pub default_style: String,

    /// How many versions may be selected as final designs for supplier handoff.
    #[serde(default = "default_max_final_designs")]
    pub max_final_designs: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_style: default_style(),
            max_final_designs: default_max_final_designs(),
        }
    }
}
