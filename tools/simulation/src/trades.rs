//! Trade generator
//!
//! Aggressor trades printed at the touch: a buy lifts the best ask, a sell
//! hits the best bid.

use rand::Rng;
use types::flags::Side;

/// Smallest and largest trade size, in lots.
const MIN_LOTS: u32 = 1;
const MAX_LOTS: u32 = 10;

/// One synthesized trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePrint {
    /// Aggressor side
    pub side: Side,
    pub price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone)]
pub struct TradeGenerator {
    trade_prob: f64,
    max_trades: u32,
    lot_size: f64,
}

impl TradeGenerator {
    pub fn new(trade_prob: f64, max_trades: u32, lot_size: f64) -> Self {
        Self {
            trade_prob,
            max_trades,
            lot_size,
        }
    }

    /// Draw up to `max_trades` prints for one step.
    ///
    /// Keeps drawing while the cap is not reached and a uniform draw falls
    /// below `trade_prob`; each accepted draw is followed by a side draw and
    /// a size draw.
    pub fn generate<R: Rng + ?Sized>(&self, best_bid: f64, best_ask: f64, rng: &mut R) -> Vec<TradePrint> {
        let mut prints = Vec::new();
        while (prints.len() as u32) < self.max_trades && rng.gen::<f64>() < self.trade_prob {
            let side = if rng.gen::<f64>() < 0.5 { Side::Buy } else { Side::Sell };
            let price = match side {
                Side::Buy => best_ask,
                Side::Sell => best_bid,
            };
            let lots = rng.gen_range(MIN_LOTS..=MAX_LOTS);
            prints.push(TradePrint {
                side,
                price,
                quantity: lots as f64 * self.lot_size,
            });
        }
        prints
    }
}
