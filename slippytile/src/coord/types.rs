//! Tile identifier and coordinate error types.

use std::fmt;
use std::path::PathBuf;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;
/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;
/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;
/// Minimum supported zoom level.
pub const MIN_ZOOM: u8 = 0;
/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 22;

/// Identifier of a slippy-map tile.
///
/// Ordering is lexicographic over `(zoom, x, y)`, which the field order gives
/// us through the derive. The `Display` form `"z/x/y"` doubles as a log label
/// and as the relative on-disk path of the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// Creates a new tile identifier.
    pub const fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Largest valid x/y index at this zoom level.
    ///
    /// Saturates for zoom levels beyond [`MAX_ZOOM`].
    pub fn max_index(&self) -> u32 {
        if self.zoom >= 32 {
            return u32::MAX;
        }
        ((1u64 << self.zoom) - 1) as u32
    }

    /// Returns true if the zoom is supported and both indices lie on the grid.
    pub fn is_valid(&self) -> bool {
        if self.zoom > MAX_ZOOM {
            return false;
        }
        let max = self.max_index();
        self.x <= max && self.y <= max
    }

    /// Relative path `zoom/x/y` (without extension).
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.zoom.to_string())
            .join(self.x.to_string())
            .join(self.y.to_string())
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Errors from coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range.
    InvalidLatitude(f64),
    /// Longitude outside [-180, 180].
    InvalidLongitude(f64),
    /// Zoom level above [`MAX_ZOOM`].
    InvalidZoom(u8),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => write!(
                f,
                "Invalid latitude {} (must be between {} and {})",
                lat, MIN_LAT, MAX_LAT
            ),
            CoordError::InvalidLongitude(lon) => write!(
                f,
                "Invalid longitude {} (must be between {} and {})",
                lon, MIN_LON, MAX_LON
            ),
            CoordError::InvalidZoom(zoom) => {
                write!(f, "Invalid zoom {} (maximum is {})", zoom, MAX_ZOOM)
            }
        }
    }
}

impl std::error::Error for CoordError {}
