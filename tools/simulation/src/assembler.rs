//! Stream assembler
//!
//! Drives the price process, depth builder and trade generator across the
//! simulated steps and encodes everything into one preallocated buffer.
//!
//! Per step the records are laid out as
//! `bid0, ask0, bid1, ask1, ..., bidN, askN, trade*`, all sharing the step's
//! `(exch_ts, local_ts)`.

use crate::config::GeneratorConfig;
use crate::depth::{DepthBookBuilder, DepthLadder};
use crate::encoder::encode;
use crate::price::PriceProcess;
use crate::trades::TradeGenerator;
use rand::Rng;
use tracing::{debug, info};
use types::errors::GenerateError;
use types::event::MarketEvent;
use types::flags::{Category, Origin, Side};
use types::record::EventRecord;

/// Spread used by the initial snapshot: levels straddle the mid at
/// `mid +/- (i + 1) * tick`.
pub const SNAPSHOT_SPREAD_TICKS: u32 = 2;

/// Generates the periodic depth-update and trade stream.
pub struct StreamAssembler<'a> {
    config: &'a GeneratorConfig,
    book: DepthBookBuilder,
    trades: TradeGenerator,
}

impl<'a> StreamAssembler<'a> {
    /// Validates `config` before anything is allocated.
    pub fn new(config: &'a GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        Ok(Self {
            config,
            book: DepthBookBuilder::new(
                config.tick_size,
                config.levels,
                config.depth_profile,
                config.lot_size,
            ),
            trades: TradeGenerator::new(
                config.trade_prob,
                config.max_trades_per_step,
                config.lot_size,
            ),
        })
    }

    /// Run every step, drawing from `rng`.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<EventRecord>, GenerateError> {
        let config = self.config;
        let capacity = config.buffer_capacity()?;
        let mut buffer: Vec<EventRecord> = Vec::with_capacity(capacity);
        let mut price = PriceProcess::new(config);
        let mut trade_count = 0usize;

        info!(
            n_steps = config.n_steps,
            levels = config.levels,
            capacity,
            seed = config.seed,
            "Starting periodic stream"
        );

        for step in 0..config.n_steps {
            // bounded by validate()
            let exch_ts = config.base_exch_ts_ns + step as i64 * config.interval_ns;
            let local_ts = exch_ts + config.feed_latency_ns;

            let mid = price.step(rng);
            let ladder = self.book.build(mid);
            push_interleaved(&mut buffer, &ladder, exch_ts, local_ts)?;

            let (best_bid, best_ask) = touch(&ladder);
            for print in self.trades.generate(best_bid, best_ask, rng) {
                buffer.push(encode(&MarketEvent {
                    category: Category::Trade,
                    side: print.side,
                    origin: Origin::Both,
                    price: print.price,
                    quantity: print.quantity,
                    exch_ts,
                    local_ts,
                })?);
                trade_count += 1;
            }
        }

        debug_assert!(buffer.len() <= capacity);
        info!(
            records = buffer.len(),
            trades = trade_count,
            final_mid = price.mid(),
            "Periodic stream complete"
        );
        Ok(buffer)
    }
}

fn touch(ladder: &DepthLadder) -> (f64, f64) {
    // levels >= 1 after validation
    (
        ladder.best_bid().unwrap_or_default(),
        ladder.best_ask().unwrap_or_default(),
    )
}

fn push_interleaved(
    buffer: &mut Vec<EventRecord>,
    ladder: &DepthLadder,
    exch_ts: i64,
    local_ts: i64,
) -> Result<(), GenerateError> {
    for (bid, ask) in ladder.bids.iter().zip(&ladder.asks) {
        for (side, level) in [(Side::Buy, bid), (Side::Sell, ask)] {
            buffer.push(encode(&MarketEvent {
                category: Category::DepthUpdate,
                side,
                origin: Origin::Both,
                price: level.price,
                quantity: level.quantity,
                exch_ts,
                local_ts,
            })?);
        }
    }
    Ok(())
}

/// Build the initial book snapshot around `base_price`.
///
/// Emits `2 * levels` exchange-side records at `base_exch_ts_ns`, all bids
/// (best first) followed by all asks. Uses no randomness.
pub fn generate_snapshot(config: &GeneratorConfig) -> Result<Vec<EventRecord>, GenerateError> {
    config.validate()?;
    let exch_ts = config.base_exch_ts_ns;
    let local_ts = exch_ts + config.feed_latency_ns;
    let ladder = DepthBookBuilder::new(
        config.tick_size,
        config.levels,
        config.depth_profile,
        config.lot_size,
    )
    .with_spread_ticks(SNAPSHOT_SPREAD_TICKS)
    .build(config.base_price);

    let mut records = Vec::with_capacity(2 * config.levels);
    let sides = [(Side::Buy, &ladder.bids), (Side::Sell, &ladder.asks)];
    for (side, levels) in sides {
        for level in levels {
            records.push(encode(&MarketEvent {
                category: Category::DepthSnapshot,
                side,
                origin: Origin::Exchange,
                price: level.price,
                quantity: level.quantity,
                exch_ts,
                local_ts,
            })?);
        }
    }
    debug!(records = records.len(), exch_ts, "Snapshot generated");
    Ok(records)
}
