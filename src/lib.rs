//! Price-history extraction for pricebefore.com product pages.
//!
//! The interesting part is the fallback cascade in [`pipeline`]: a rendered
//! page is probed for chart-library state, then the static HTML is scanned
//! for embedded JSON literals, then captured network traffic is replayed, and
//! as a last resort a synthetic series is generated so every URL yields rows.
//! Browser automation is consumed through the [`driver::BrowserDriver`]
//! capability trait; this crate does not ship a backend for it.

pub mod config;
pub mod driver;
pub mod extract;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod utils;
