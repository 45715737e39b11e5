use serde::{Deserialize, Serialize};

/// Temperature in hundredths of a degree (1850 == 18.50°).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(i64);

impl Temperature {
    pub const ZERO: Self = Self(0);

    pub const fn from_centi(value: i64) -> Self {
        Self(value)
    }

    pub const fn centi(self) -> i64 {
        self.0
    }
}

impl From<i64> for Temperature {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Temperature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_in_degrees() {
        assert_eq!(Temperature::from_centi(1850).to_string(), "18.50");
        assert_eq!(Temperature::from_centi(-105).to_string(), "-1.05");
        assert_eq!(Temperature::ZERO.to_string(), "0.00");
    }

    #[test]
    fn serializes_as_plain_integer() {
        let t = Temperature::from_centi(1400);
        assert_eq!(serde_json::to_string(&t).unwrap(), "1400");
    }
}
