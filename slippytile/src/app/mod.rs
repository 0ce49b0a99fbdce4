//! Application bootstrap.
//!
//! [`App`] builds the tile stack in the right order from an [`AppConfig`]
//! and owns it for the lifetime of the program.
//!
//! # Example
//!
//! ```ignore
//! use slippytile::app::{App, AppConfig};
//! use slippytile::coord::TileId;
//!
//! let app = App::bootstrap(AppConfig::new("/tmp/tiles"))?;
//! let result = app.resolver().ensure_raster(&TileId::new(12, 3492, 1586));
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::App;
pub use config::AppConfig;
pub use error::AppError;
