//! Tile identifiers and coordinate conversion
//!
//! Provides the [`TileId`] key used by every cache tier, plus conversions
//! between geographic coordinates (latitude/longitude) and Web Mercator tile
//! indices.

mod types;

pub use types::{CoordError, TileId, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
#[inline]
pub fn to_tile_id(lat: f64, lon: f64, zoom: u8) -> Result<TileId, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    // lon = 180 lands exactly on n, which is one past the last column
    let x = ((lon + 180.0) / 360.0 * n).floor().min(max_index) as u32;

    let lat_rad = lat * PI / 180.0;
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max_index) as u32;

    Ok(TileId { zoom, x, y })
}

/// Converts a tile back to geographic coordinates.
///
/// Returns `(lat, lon)` of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileId) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = to_tile_id(40.7128, -74.0060, 16).unwrap();
        assert_eq!(tile, TileId::new(16, 19295, 24640));
    }

    #[test]
    fn test_seoul_city_hall_at_zoom_12() {
        let tile = to_tile_id(37.5665, 126.9780, 12).unwrap();
        assert_eq!(tile.zoom, 12);
        assert_eq!(tile.x, 3492);
        assert_eq!(tile.y, 1586);
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        assert_eq!(to_tile_id(45.0, 90.0, 0).unwrap(), TileId::new(0, 0, 0));
        assert_eq!(to_tile_id(-45.0, -90.0, 0).unwrap(), TileId::new(0, 0, 0));
    }

    #[test]
    fn test_antimeridian_stays_on_grid() {
        let tile = to_tile_id(0.0, 180.0, 4).unwrap();
        assert_eq!(tile.x, 15);
        assert!(tile.is_valid());
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_id(90.0, 0.0, 10);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = to_tile_id(0.0, 181.0, 10);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_id(0.0, 0.0, 23);
        assert_eq!(result, Err(CoordError::InvalidZoom(23)));
    }

    #[test]
    fn test_tile_to_lat_lon_at_equator() {
        let (lat, lon) = tile_to_lat_lon(&TileId::new(10, 512, 512));
        assert!(lat.abs() < 1e-9, "Should be on the equator");
        assert!(lon.abs() < 1e-9, "Should be on the prime meridian");
    }

    #[test]
    fn test_roundtrip_at_different_zooms() {
        let lat = 51.5074; // London
        let lon = -0.1278;

        for zoom in [0, 5, 10, 15, 18] {
            let tile = to_tile_id(lat, lon, zoom).unwrap();
            let (converted_lat, converted_lon) = tile_to_lat_lon(&tile);

            // Northwest corner is within one tile span of the input point
            let tile_size_degrees = 360.0 / (2.0_f64.powi(zoom as i32));

            assert!(
                (converted_lat - lat).abs() < tile_size_degrees,
                "Zoom {}: lat diff {} exceeds tile size {}",
                zoom,
                (converted_lat - lat).abs(),
                tile_size_degrees
            );
            assert!(
                (converted_lon - lon).abs() < tile_size_degrees,
                "Zoom {}: lon diff {} exceeds tile size {}",
                zoom,
                (converted_lon - lon).abs(),
                tile_size_degrees
            );
        }
    }
}
