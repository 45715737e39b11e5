use core::str::FromStr;

use serde::{Deserialize, Serialize};

use chaintrack_core::DomainError;

/// What happens when a batch lists a product that already belongs to another batch.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebatchPolicy {
    /// The product moves to the new batch; the old batch keeps listing it.
    #[default]
    Reassign,
    /// The whole batch creation fails with `InvalidInput`.
    Reject,
}

impl RebatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebatchPolicy::Reassign => "reassign",
            RebatchPolicy::Reject => "reject",
        }
    }
}

impl core::fmt::Display for RebatchPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebatchPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reassign" => Ok(RebatchPolicy::Reassign),
            "reject" => Ok(RebatchPolicy::Reject),
            other => Err(DomainError::invalid_input(format!("unknown rebatch policy '{other}'"))),
        }
    }
}
