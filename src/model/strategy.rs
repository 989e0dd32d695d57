use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Risk profile assigned to a deposit. Determines tick-range width and
/// rebalance sensitivity on the backend side.
///
/// The contract stores it as a `uint8` index (0, 1, 2 in declaration order).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    #[default]
    Conservative,
    Balanced,
    Degen,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Conservative, Strategy::Balanced, Strategy::Degen];

    /// Contract-side index.
    pub fn index(self) -> u8 {
        match self {
            Strategy::Conservative => 0,
            Strategy::Balanced => 1,
            Strategy::Degen => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Wire name used by the backend (`"BALANCED"` etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Conservative => "CONSERVATIVE",
            Strategy::Balanced => "BALANCED",
            Strategy::Degen => "DEGEN",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONSERVATIVE" | "0" => Ok(Strategy::Conservative),
            "BALANCED" | "1" => Ok(Strategy::Balanced),
            "DEGEN" | "2" => Ok(Strategy::Degen),
            other => Err(format!(
                "unknown strategy '{other}' (expected conservative, balanced or degen)"
            )),
        }
    }
}
