//! Report aggregation.
//!
//! Fans a fixed list of independent fetches out concurrently and fans the
//! outcomes back in, deciding failures by priority order.

pub mod fanout;
pub mod reading;

pub use fanout::*;
pub use reading::Reading;
