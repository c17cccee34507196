//! Depth book builder
//!
//! Turns a mid price into a tick-aligned bid/ask ladder with per-level
//! quantities shaped by a [`DepthProfile`]. Levels are ordered best to worst.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Shape of resting quantity across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepthProfile {
    /// Same size at every level
    #[default]
    Flat,
    /// Size grows with distance from the touch: `lot * (i + 1)`
    Linear,
    /// Size decays away from the touch: `lot * e^(-i/4)`
    Exponential,
}

impl DepthProfile {
    /// Resolve a selector string. Unrecognized selectors fall back to
    /// [`DepthProfile::Flat`] rather than failing.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "linear" => DepthProfile::Linear,
            "exp" | "exponential" => DepthProfile::Exponential,
            _ => DepthProfile::Flat,
        }
    }

    /// Quantity at level `index` (0 = best) for base size `lot`.
    pub fn quantity(self, lot: f64, index: usize) -> f64 {
        match self {
            DepthProfile::Flat => lot,
            DepthProfile::Linear => lot * (index + 1) as f64,
            DepthProfile::Exponential => lot * (-(index as f64) / 4.0).exp(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DepthProfile::Flat => "flat",
            DepthProfile::Linear => "linear",
            DepthProfile::Exponential => "exp",
        }
    }
}

impl FromStr for DepthProfile {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_selector(s))
    }
}

impl From<String> for DepthProfile {
    fn from(s: String) -> Self {
        Self::from_selector(&s)
    }
}

impl From<DepthProfile> for String {
    fn from(profile: DepthProfile) -> Self {
        profile.as_str().to_string()
    }
}

impl fmt::Display for DepthProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single price level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub price: f64,
    pub quantity: f64,
}

/// Both sides of the book, best level first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DepthLadder {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
}

impl DepthLadder {
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }
}

/// Builds a [`DepthLadder`] around a mid price.
#[derive(Debug, Clone)]
pub struct DepthBookBuilder {
    tick_size: f64,
    levels: usize,
    profile: DepthProfile,
    lot_size: f64,
    spread_ticks: u32,
}

impl DepthBookBuilder {
    /// Builder for the periodic update stream (one-tick spread).
    pub fn new(tick_size: f64, levels: usize, profile: DepthProfile, lot_size: f64) -> Self {
        Self {
            tick_size,
            levels,
            profile,
            lot_size,
            spread_ticks: 1,
        }
    }

    /// Distance between best bid and best ask, in ticks.
    pub fn with_spread_ticks(mut self, spread_ticks: u32) -> Self {
        self.spread_ticks = spread_ticks.max(1);
        self
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Lowest tick index the snapped mid may take: the deepest bid then
    /// sits exactly one tick above zero.
    pub fn min_mid_ticks(&self) -> f64 {
        (self.levels + 1) as f64
    }

    /// Build the ladder for `mid`.
    ///
    /// The mid is snapped to the nearest tick (ties to even) and floored at
    /// [`min_mid_ticks`](Self::min_mid_ticks); the best bid sits one tick
    /// below it and the best ask `spread_ticks` above the bid.
    pub fn build(&self, mid: f64) -> DepthLadder {
        let tick = self.tick_size;
        let rounded = (mid / tick).round_ties_even().max(self.min_mid_ticks()) * tick;
        let best_bid = rounded - tick;
        let best_ask = best_bid + self.spread_ticks as f64 * tick;

        let mut ladder = DepthLadder {
            bids: Vec::with_capacity(self.levels),
            asks: Vec::with_capacity(self.levels),
        };
        for i in 0..self.levels {
            let quantity = self.profile.quantity(self.lot_size, i);
            ladder.bids.push(Level {
                price: best_bid - i as f64 * tick,
                quantity,
            });
            ladder.asks.push(Level {
                price: best_ask + i as f64 * tick,
                quantity,
            });
        }
        ladder
    }
}
