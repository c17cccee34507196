//! Semantic market events
//!
//! The typed form of a record before encoding (and after decoding).

use crate::errors::FlagError;
use crate::flags::{Category, EventFlags, Origin, Side};
use crate::record::EventRecord;
use serde::{Deserialize, Serialize};

/// A depth level or trade print with its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub category: Category,
    pub side: Side,
    pub origin: Origin,
    pub price: f64,
    pub quantity: f64,
    /// Unix nanoseconds, venue clock
    pub exch_ts: i64,
    /// Unix nanoseconds, local clock
    pub local_ts: i64,
}

impl MarketEvent {
    pub fn flags(&self) -> EventFlags {
        EventFlags::compose(self.origin, self.category, self.side)
    }
}

impl TryFrom<&EventRecord> for MarketEvent {
    type Error = FlagError;

    fn try_from(record: &EventRecord) -> Result<Self, Self::Error> {
        let flags = record.event_flags()?;
        Ok(Self {
            category: flags.category(),
            side: flags.side(),
            origin: flags.origin(),
            price: record.price,
            quantity: record.quantity,
            exch_ts: record.exch_ts,
            local_ts: record.local_ts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record() {
        let record = EventRecord {
            flags: EventFlags::compose(Origin::Exchange, Category::DepthSnapshot, Side::Sell).bits(),
            exch_ts: 10,
            local_ts: 11,
            price: 100.5,
            quantity: 2.0,
            ..Default::default()
        };
        let event = MarketEvent::try_from(&record).unwrap();
        assert_eq!(event.category, Category::DepthSnapshot);
        assert_eq!(event.side, Side::Sell);
        assert_eq!(event.origin, Origin::Exchange);
        assert_eq!(event.flags().bits(), record.flags);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let event = MarketEvent {
            category: Category::Trade,
            side: Side::Buy,
            origin: Origin::Both,
            price: 60000.1,
            quantity: 0.004,
            exch_ts: 1,
            local_ts: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"trade\""));
        assert!(json.contains("\"BUY\""));
        let parsed: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_from_record_rejects_bad_flags() {
        let record = EventRecord { flags: 0, ..Default::default() };
        assert!(MarketEvent::try_from(&record).is_err());
    }
}
