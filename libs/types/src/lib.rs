//! Types library for the synthetic market tape
//!
//! Shared definitions for every crate that writes or reads the tape: the
//! flag vocabulary, the fixed 64-byte event record, the typed semantic
//! event, and the error taxonomy.
//!
//! # Modules
//! - `flags`: Flag codec (category, side, origin bits)
//! - `record`: Fixed-layout event record (wire contract)
//! - `event`: Typed semantic event
//! - `errors`: Error taxonomy

pub mod flags;
pub mod record;
pub mod event;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::flags::{Category, EventFlags, Origin, Side};
    pub use crate::record::{EventRecord, RECORD_SIZE};
    pub use crate::event::MarketEvent;
    pub use crate::errors::*;
}
