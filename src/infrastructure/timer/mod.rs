//! Tick timer adapters

mod tokio_ticker;

pub use tokio_ticker::TokioTicker;
