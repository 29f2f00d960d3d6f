//! # Invalidation Events
//!
//! What told us an account's cached projections are stale.
//!
//! Every event clears every cached result of the account. The kind is kept
//! for logging and for callers that want to react differently upstream.

use lucra_core::ValidationError;
use serde::{Deserialize, Serialize};

/// Reason for dropping an account's cached results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationEvent {
    /// A new confirmed transaction arrived.
    #[serde(rename = "sale")]
    NewSale,
    /// A platform data sync finished.
    #[serde(rename = "sync")]
    DataSync,
    /// Operator or support request.
    #[serde(rename = "manual")]
    Manual,
}

impl InvalidationEvent {
    pub const ALL: [InvalidationEvent; 3] = [
        InvalidationEvent::NewSale,
        InvalidationEvent::DataSync,
        InvalidationEvent::Manual,
    ];

    /// Wire name (`sale`, `sync`, `manual`).
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationEvent::NewSale => "sale",
            InvalidationEvent::DataSync => "sync",
            InvalidationEvent::Manual => "manual",
        }
    }
}

impl std::fmt::Display for InvalidationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvalidationEvent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sale" | "new_sale" => Ok(InvalidationEvent::NewSale),
            "sync" | "data_sync" => Ok(InvalidationEvent::DataSync),
            "manual" => Ok(InvalidationEvent::Manual),
            _ => Err(ValidationError::NotAllowed {
                field: "event".to_string(),
                allowed: Self::ALL.iter().map(|e| e.as_str().to_string()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for event in InvalidationEvent::ALL {
            assert_eq!(event.as_str().parse::<InvalidationEvent>().unwrap(), event);
        }
        assert_eq!(" SALE ".parse::<InvalidationEvent>().unwrap(), InvalidationEvent::NewSale);
    }

    #[test]
    fn test_unknown_event_lists_allowed() {
        let err = "refund".parse::<InvalidationEvent>().unwrap_err();
        assert_eq!(err.to_string(), "event must be one of: [\"sale\", \"sync\", \"manual\"]");
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&InvalidationEvent::DataSync).unwrap(), "\"sync\"");
        let parsed: InvalidationEvent = serde_json::from_str("\"sale\"").unwrap();
        assert_eq!(parsed, InvalidationEvent::NewSale);
    }
}
