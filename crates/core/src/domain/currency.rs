use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settlement currencies the platform quotes in. The enumeration is closed:
/// a quote priced in anything else is rejected during validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Cny,
    Rub,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported currency `{0}` (expected USD|EUR|CNY|RUB)")]
pub struct UnknownCurrency(pub String);

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Cny, Currency::Rub];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Cny => "CNY",
            Self::Rub => "RUB",
        }
    }

    pub fn codes() -> &'static [&'static str] {
        &["USD", "EUR", "CNY", "RUB"]
    }
}

impl std::str::FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "CNY" => Ok(Self::Cny),
            "RUB" => Ok(Self::Rub),
            other => Err(UnknownCurrency(other.to_string())),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
