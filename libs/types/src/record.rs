//! Fixed-layout event record
//!
//! The wire contract with the backtesting engine. Field order and widths
//! must not change: eight 8-byte fields, 64 bytes per row, little-endian.

use crate::errors::FlagError;
use crate::flags::EventFlags;
use serde::{Deserialize, Serialize};

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 64;

/// Column names and little-endian NumPy type codes, in wire order.
pub const RECORD_FIELDS: [(&str, &str); 8] = [
    ("ev", "<u8"),
    ("exch_ts", "<i8"),
    ("local_ts", "<i8"),
    ("px", "<f8"),
    ("qty", "<f8"),
    ("order_id", "<u8"),
    ("ival", "<i8"),
    ("fval", "<f8"),
];

/// One row of the tape.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// Category, origin and side bits (`ev`)
    pub flags: u64,
    /// Venue timestamp in ns
    pub exch_ts: i64,
    /// Local receipt timestamp in ns
    pub local_ts: i64,
    /// Price (`px`)
    pub price: f64,
    /// Quantity (`qty`)
    pub quantity: f64,
    /// Reserved for order-level feeds
    pub order_id: u64,
    /// Reserved auxiliary integer (`ival`)
    pub aux_int: i64,
    /// Reserved auxiliary float (`fval`)
    pub aux_float: f64,
}

const _: () = assert!(std::mem::size_of::<EventRecord>() == RECORD_SIZE);

impl EventRecord {
    /// Validated view of the flag word.
    pub fn event_flags(&self) -> Result<EventFlags, FlagError> {
        EventFlags::decode(self.flags)
    }

    /// Composite ordering key used by the merger.
    pub fn time_key(&self) -> (i64, i64) {
        (self.exch_ts, self.local_ts)
    }

    /// Encode to the little-endian wire layout.
    pub fn to_le_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..8].copy_from_slice(&self.flags.to_le_bytes());
        buf[8..16].copy_from_slice(&self.exch_ts.to_le_bytes());
        buf[16..24].copy_from_slice(&self.local_ts.to_le_bytes());
        buf[24..32].copy_from_slice(&self.price.to_le_bytes());
        buf[32..40].copy_from_slice(&self.quantity.to_le_bytes());
        buf[40..48].copy_from_slice(&self.order_id.to_le_bytes());
        buf[48..56].copy_from_slice(&self.aux_int.to_le_bytes());
        buf[56..64].copy_from_slice(&self.aux_float.to_le_bytes());
        buf
    }

    /// Decode from the little-endian wire layout.
    pub fn from_le_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let word = |i: usize| -> [u8; 8] {
            let mut w = [0u8; 8];
            w.copy_from_slice(&buf[i * 8..i * 8 + 8]);
            w
        };
        Self {
            flags: u64::from_le_bytes(word(0)),
            exch_ts: i64::from_le_bytes(word(1)),
            local_ts: i64::from_le_bytes(word(2)),
            price: f64::from_le_bytes(word(3)),
            quantity: f64::from_le_bytes(word(4)),
            order_id: u64::from_le_bytes(word(5)),
            aux_int: i64::from_le_bytes(word(6)),
            aux_float: f64::from_le_bytes(word(7)),
        }
    }
}

/// Encode a slice of records into one contiguous buffer.
pub fn records_to_bytes(records: &[EventRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        out.extend_from_slice(&record.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{Category, Origin, Side};

    fn sample() -> EventRecord {
        EventRecord {
            flags: EventFlags::compose(Origin::Both, Category::Trade, Side::Buy).bits(),
            exch_ts: 1_723_161_256_000_000_000,
            local_ts: 1_723_161_256_001_000_000,
            price: 60000.1,
            quantity: 0.003,
            order_id: 0,
            aux_int: 0,
            aux_float: 0.0,
        }
    }

    #[test]
    fn test_field_offsets_follow_wire_order() {
        let bytes = sample().to_le_bytes();
        assert_eq!(&bytes[0..8], &sample().flags.to_le_bytes());
        assert_eq!(&bytes[8..16], &1_723_161_256_000_000_000i64.to_le_bytes());
        assert_eq!(&bytes[24..32], &60000.1f64.to_le_bytes());
        assert!(bytes[40..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let record = sample();
        assert_eq!(EventRecord::from_le_bytes(&record.to_le_bytes()), record);
    }

    #[test]
    fn test_records_to_bytes_length() {
        let bytes = records_to_bytes(&[sample(), sample(), sample()]);
        assert_eq!(bytes.len(), 3 * RECORD_SIZE);
    }

    #[test]
    fn test_event_flags_view() {
        let flags = sample().event_flags().unwrap();
        assert_eq!(flags.category(), Category::Trade);
        assert_eq!(flags.side(), Side::Buy);
    }

    #[test]
    fn test_default_record_has_invalid_flags() {
        assert!(EventRecord::default().event_flags().is_err());
    }
}
