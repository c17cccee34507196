//! Event flag codec
//!
//! Bit-flag vocabulary carried in the `ev` column of every record. Bit
//! positions follow hftbacktest v2 so the downstream engine reads the tape
//! without translation:
//!
//! ```text
//! DEPTH_UPDATE    = 1 << 0
//! TRADE           = 1 << 1
//! DEPTH_SNAPSHOT  = 1 << 2
//! SELL            = 1 << 28
//! BUY             = 1 << 29
//! LOCAL           = 1 << 30
//! EXCHANGE        = 1 << 31
//! ```
//!
//! Flags are only ever composed from the typed [`Category`], [`Side`] and
//! [`Origin`] enums, so a record with two categories or two sides cannot be
//! built. Raw values read back from disk go through [`EventFlags::decode`].

use crate::errors::FlagError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Incremental depth change.
pub const DEPTH_UPDATE: u64 = 1 << 0;
/// Trade print.
pub const TRADE: u64 = 1 << 1;
/// Full depth replacement.
pub const DEPTH_SNAPSHOT: u64 = 1 << 2;
/// Ask side / sell aggressor.
pub const SELL: u64 = 1 << 28;
/// Bid side / buy aggressor.
pub const BUY: u64 = 1 << 29;
/// Event is visible to the local (strategy) side.
pub const LOCAL: u64 = 1 << 30;
/// Event is processed by the exchange side.
pub const EXCHANGE: u64 = 1 << 31;

const CATEGORY_MASK: u64 = DEPTH_UPDATE | TRADE | DEPTH_SNAPSHOT;
const SIDE_MASK: u64 = BUY | SELL;
const ORIGIN_MASK: u64 = EXCHANGE | LOCAL;

/// Event category. Exactly one per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DepthUpdate,
    DepthSnapshot,
    Trade,
}

impl Category {
    pub const fn bit(self) -> u64 {
        match self {
            Category::DepthUpdate => DEPTH_UPDATE,
            Category::DepthSnapshot => DEPTH_SNAPSHOT,
            Category::Trade => TRADE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::DepthUpdate => "depth",
            Category::DepthSnapshot => "snapshot",
            Category::Trade => "trade",
        }
    }
}

/// Book side for depth records, aggressor side for trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Bid / buy aggressor
    Buy,
    /// Ask / sell aggressor
    Sell,
}

impl Side {
    pub const fn bit(self) -> u64 {
        match self {
            Side::Buy => BUY,
            Side::Sell => SELL,
        }
    }
}

/// Which side(s) of the simulated link observe the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Exchange,
    Local,
    Both,
}

impl Origin {
    pub const fn bits(self) -> u64 {
        match self {
            Origin::Exchange => EXCHANGE,
            Origin::Local => LOCAL,
            Origin::Both => EXCHANGE | LOCAL,
        }
    }
}

/// Validated flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventFlags(u64);

impl EventFlags {
    /// Compose a flag word. Every input is a single enum variant, so the
    /// result always carries exactly one category and one side bit.
    pub const fn compose(origin: Origin, category: Category, side: Side) -> Self {
        Self(origin.bits() | category.bit() | side.bit())
    }

    /// Validate a raw flag word read from a container.
    pub fn decode(raw: u64) -> Result<Self, FlagError> {
        let category_bits = raw & CATEGORY_MASK;
        if category_bits.count_ones() != 1 {
            return Err(FlagError::Category {
                raw,
                found: category_bits.count_ones(),
            });
        }
        let side_bits = raw & SIDE_MASK;
        if side_bits.count_ones() != 1 {
            return Err(FlagError::Side {
                raw,
                found: side_bits.count_ones(),
            });
        }
        if raw & ORIGIN_MASK == 0 {
            return Err(FlagError::NoOrigin { raw });
        }
        let unknown = raw & !(CATEGORY_MASK | SIDE_MASK | ORIGIN_MASK);
        if unknown != 0 {
            return Err(FlagError::UnknownBits { raw, unknown });
        }
        Ok(Self(raw))
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn category(self) -> Category {
        if self.0 & TRADE != 0 {
            Category::Trade
        } else if self.0 & DEPTH_SNAPSHOT != 0 {
            Category::DepthSnapshot
        } else {
            Category::DepthUpdate
        }
    }

    pub fn side(self) -> Side {
        if self.0 & BUY != 0 {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    pub fn origin(self) -> Origin {
        match (self.0 & EXCHANGE != 0, self.0 & LOCAL != 0) {
            (true, true) => Origin::Both,
            (false, true) => Origin::Local,
            _ => Origin::Exchange,
        }
    }

    /// True when every bit of `mask` is set.
    pub fn contains(self, mask: u64) -> bool {
        self.0 & mask == mask
    }
}

impl From<EventFlags> for u64 {
    fn from(flags: EventFlags) -> Self {
        flags.0
    }
}

impl fmt::Display for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self.origin() {
            Origin::Exchange => "EXCH",
            Origin::Local => "LOCAL",
            Origin::Both => "EXCH|LOCAL",
        };
        let side = match self.side() {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };
        write!(f, "{}|{}|{}", origin, self.category().label().to_uppercase(), side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_distinct() {
        let all = [DEPTH_UPDATE, TRADE, DEPTH_SNAPSHOT, SELL, BUY, LOCAL, EXCHANGE];
        for (i, a) in all.iter().enumerate() {
            assert_eq!(a.count_ones(), 1);
            for b in &all[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
    }

    #[test]
    fn test_matches_hftbacktest_values() {
        assert_eq!(EXCHANGE, 0x8000_0000);
        assert_eq!(LOCAL, 0x4000_0000);
        assert_eq!(BUY, 0x2000_0000);
        assert_eq!(SELL, 0x1000_0000);
        assert_eq!(DEPTH_UPDATE, 1);
        assert_eq!(TRADE, 2);
        assert_eq!(DEPTH_SNAPSHOT, 4);
    }

    #[test]
    fn test_compose_and_decode_agree() {
        for origin in [Origin::Exchange, Origin::Local, Origin::Both] {
            for category in [Category::DepthUpdate, Category::DepthSnapshot, Category::Trade] {
                for side in [Side::Buy, Side::Sell] {
                    let flags = EventFlags::compose(origin, category, side);
                    let decoded = EventFlags::decode(flags.bits()).unwrap();
                    assert_eq!(decoded.category(), category);
                    assert_eq!(decoded.side(), side);
                    assert_eq!(decoded.origin(), origin);
                }
            }
        }
    }

    #[test]
    fn test_decode_rejects_two_categories() {
        let raw = EXCHANGE | DEPTH_UPDATE | TRADE | BUY;
        assert_eq!(
            EventFlags::decode(raw),
            Err(FlagError::Category { raw, found: 2 })
        );
    }

    #[test]
    fn test_decode_rejects_missing_side() {
        let raw = EXCHANGE | TRADE;
        assert_eq!(EventFlags::decode(raw), Err(FlagError::Side { raw, found: 0 }));
    }

    #[test]
    fn test_decode_rejects_both_sides() {
        let raw = EXCHANGE | TRADE | BUY | SELL;
        assert!(matches!(EventFlags::decode(raw), Err(FlagError::Side { found: 2, .. })));
    }

    #[test]
    fn test_decode_rejects_missing_origin() {
        let raw = TRADE | BUY;
        assert_eq!(EventFlags::decode(raw), Err(FlagError::NoOrigin { raw }));
    }

    #[test]
    fn test_decode_rejects_unknown_bits() {
        let raw = EXCHANGE | TRADE | BUY | (1 << 10);
        assert!(matches!(EventFlags::decode(raw), Err(FlagError::UnknownBits { .. })));
    }

    #[test]
    fn test_display() {
        let flags = EventFlags::compose(Origin::Both, Category::Trade, Side::Sell);
        assert_eq!(flags.to_string(), "EXCH|LOCAL|TRADE|SELL");
    }
}

// ── Property-Based Tests ────────────────────────────────────────────
