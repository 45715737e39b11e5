use core::str::FromStr;

use serde::{Deserialize, Serialize};

use chaintrack_core::DomainError;

/// Capability held by an identity.
///
/// `Admin` is singular and fixed at initialization. `Manufacturer` and `Handler` are sets
/// managed by the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manufacturer,
    Handler,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manufacturer => "MANUFACTURER",
            Role::Handler => "HANDLER",
        }
    }

    /// Whether the admin may grant/revoke this role.
    pub fn is_grantable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANUFACTURER" => Ok(Role::Manufacturer),
            "HANDLER" => Ok(Role::Handler),
            other => Err(DomainError::invalid_input(format!("unknown role '{other}'"))),
        }
    }
}
