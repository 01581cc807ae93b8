//! Background computation of panel data.
//!
//! [`RollupWorker`] runs the same pure [`get_panel_data`](crate::aggregation::get_panel_data)
//! on dedicated threads; [`RollupBridge`] posts requests to it, falls back to
//! computing on the calling thread when the worker fails, and drops results
//! of superseded requests.

mod bridge;
mod rollup;

pub use bridge::{RollupBridge, RollupHandle};
pub use rollup::{ComputeFn, RollupReply, RollupRequest, RollupWorker};
