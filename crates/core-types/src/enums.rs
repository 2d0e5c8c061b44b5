use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The price field requested from a price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

/// The price-adjustment convention for corporate actions.
///
/// `Post` (back-adjusted) keeps the earliest prices fixed and scales later ones,
/// which is what an event study wants: returns across the window are unaffected
/// by splits or dividends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustType {
    None,
    Pre,
    #[default]
    Post,
}

impl AdjustType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustType::None => "none",
            AdjustType::Pre => "pre",
            AdjustType::Post => "post",
        }
    }
}

/// The bar frequency of a price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1w")]
    Weekly,
}

impl Frequency {
    /// The interval string used by price stores (e.g., "1d").
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "1d",
            Frequency::Weekly => "1w",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AdjustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(CoreError::InvalidInput("price field".to_string(), other.to_string())),
        }
    }
}

impl FromStr for AdjustType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AdjustType::None),
            "pre" => Ok(AdjustType::Pre),
            "post" => Ok(AdjustType::Post),
            other => Err(CoreError::InvalidInput("adjust type".to_string(), other.to_string())),
        }
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1d" => Ok(Frequency::Daily),
            "1w" => Ok(Frequency::Weekly),
            other => Err(CoreError::InvalidInput("frequency".to_string(), other.to_string())),
        }
    }
}
