//! Event encoder
//!
//! Maps semantic events onto the fixed record layout and back.

use types::errors::EncodeError;
use types::event::MarketEvent;
use types::record::EventRecord;

/// Encode one event. Reserved fields are zeroed.
pub fn encode(event: &MarketEvent) -> Result<EventRecord, EncodeError> {
    if !(event.price.is_finite() && event.price > 0.0) {
        return Err(EncodeError::InvalidPrice(event.price));
    }
    if !(event.quantity.is_finite() && event.quantity > 0.0) {
        return Err(EncodeError::InvalidQuantity(event.quantity));
    }
    if event.local_ts < event.exch_ts {
        return Err(EncodeError::LocalBeforeExchange {
            exch_ts: event.exch_ts,
            local_ts: event.local_ts,
        });
    }
    Ok(EventRecord {
        flags: event.flags().bits(),
        exch_ts: event.exch_ts,
        local_ts: event.local_ts,
        price: event.price,
        quantity: event.quantity,
        order_id: 0,
        aux_int: 0,
        aux_float: 0.0,
    })
}

/// Decode a record, validating its flag word.
pub fn decode(record: &EventRecord) -> Result<MarketEvent, EncodeError> {
    Ok(MarketEvent::try_from(record)?)
}
