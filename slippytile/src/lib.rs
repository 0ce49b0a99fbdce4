//! SlippyTile - Map tile fetching and caching for interactive viewers
//!
//! This library resolves slippy-map tiles (`{z}/{x}/{y}`) through a chain of
//! caches: decoded resources held in memory under a byte budget, raw tile
//! bytes persisted on disk with their HTTP validators, and finally the tile
//! server itself with retries and conditional revalidation.
//!
//! The usual entry point is [`app::App`], which wires the tiers together
//! from an [`app::AppConfig`].

pub mod app;
pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod net;
pub mod tile;
