//! Tile server URL construction.

use crate::coord::TileId;

/// Default OpenStreetMap raster tile server.
pub const DEFAULT_BASE_URL: &str = "https://tile.openstreetmap.org";

/// A slippy-map tile server following the `{z}/{x}/{y}` convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileEndpoint {
    base_url: String,
}

impl TileEndpoint {
    /// Creates an endpoint. A trailing `/` on `base_url` is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the PNG raster tile, e.g. `https://tile.openstreetmap.org/12/3492/1586.png`.
    pub fn raster_url(&self, id: &TileId) -> String {
        format!("{}/{}.png", self.base_url, id)
    }

    /// URL of the vector (MVT) tile.
    pub fn vector_url(&self, id: &TileId) -> String {
        format!("{}/{}.pbf", self.base_url, id)
    }
}

impl Default for TileEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_raster_url() {
        let endpoint = TileEndpoint::default();
        assert_eq!(
            endpoint.raster_url(&TileId::new(12, 3492, 1586)),
            "https://tile.openstreetmap.org/12/3492/1586.png"
        );
    }

    #[test]
    fn test_vector_url() {
        let endpoint = TileEndpoint::new("https://vector.example.com/tiles");
        assert_eq!(
            endpoint.vector_url(&TileId::new(3, 2, 1)),
            "https://vector.example.com/tiles/3/2/1.pbf"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let endpoint = TileEndpoint::new("http://localhost:8080/");
        assert_eq!(endpoint.base_url(), "http://localhost:8080");
        assert_eq!(
            endpoint.raster_url(&TileId::new(0, 0, 0)),
            "http://localhost:8080/0/0/0.png"
        );
    }
}
