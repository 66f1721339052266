use crate::error::CoreError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The direction of a trade as labelled in the input file.
///
/// Labels other than the usual long/short spellings are kept verbatim so that
/// strategy-specific tags survive into the exported tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TradeType {
    Long,
    Short,
    Other(String),
}

impl TradeType {
    /// Returns the label written to the exported tables.
    pub fn as_str(&self) -> &str {
        match self {
            TradeType::Long => "long",
            TradeType::Short => "short",
            TradeType::Other(label) => label,
        }
    }
}

impl FromStr for TradeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.is_empty() {
            return Err(CoreError::InvalidTradeType {
                label: s.to_string(),
                reason: "the label is empty",
            });
        }

        match label.to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(TradeType::Long),
            "short" | "sell" => Ok(TradeType::Short),
            _ => Ok(TradeType::Other(label.to_string())),
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TradeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
