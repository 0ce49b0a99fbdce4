//! `view` command: simulates a map viewer's frame.
//!
//! Resolves a square block of tiles around a coordinate, decodes each one
//! into an RGBA buffer and keeps the buffers in a budgeted resource cache,
//! exactly as an interactive viewer would before uploading textures.

use clap::Args;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use slippytile::app::App;
use slippytile::cache::ResourceCache;
use slippytile::coord::{to_tile_id, TileId};
use slippytile::tile::acquire_resource;
use tracing::debug;

use super::common::CliContext;
use crate::error::CliError;

/// Arguments for `view`.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Latitude of the view centre in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the view centre in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Zoom level (0-22)
    #[arg(long)]
    pub zoom: u8,

    /// Tiles to load on each side of the centre tile
    #[arg(long, default_value_t = 1)]
    pub radius: u32,

    /// Resource cache budget in MiB (defaults to cache.memory_budget)
    #[arg(long)]
    pub budget_mib: Option<usize>,
}

/// Run the `view` command.
pub fn run(context: &CliContext, args: ViewArgs) -> Result<(), CliError> {
    let center = to_tile_id(args.lat, args.lon, args.zoom)?;

    let mut app_config = context.app_config();
    if let Some(mib) = args.budget_mib {
        app_config = app_config.with_memory_budget(mib.saturating_mul(1024 * 1024));
    }
    let app = App::bootstrap(app_config)?;
    let mut cache: ResourceCache<RgbaImage, _> =
        app.resource_cache_with(|id: &TileId, image: RgbaImage| {
            debug!(tile = %id, bytes = image.as_raw().len(), "Released decoded tile");
        });

    let tiles = view_block(&center, args.radius);
    let progress = ProgressBar::new(tiles.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut placeholders = Vec::new();
    for id in &tiles {
        progress.set_message(id.to_string());
        if acquire_resource(&mut cache, app.resolver(), id, decode_rgba).is_none() {
            placeholders.push(*id);
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "View around {} ({} tiles, radius {})",
        center,
        tiles.len(),
        args.radius
    );
    println!("  Loaded:       {}", tiles.len() - placeholders.len());
    if !placeholders.is_empty() {
        let list: Vec<String> = placeholders.iter().map(TileId::to_string).collect();
        println!("  Placeholders: {} ({})", placeholders.len(), list.join(", "));
    }
    println!("  Resident:     {}", cache.len());
    println!("  Cache:        {}", cache.stats());
    Ok(())
}

/// Decodes PNG/JPEG bytes into an RGBA buffer sized by its pixel data.
fn decode_rgba(bytes: &[u8]) -> Option<(RgbaImage, usize)> {
    match image::load_from_memory(bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let size = rgba.as_raw().len();
            Some((rgba, size))
        }
        Err(e) => {
            debug!(error = %e, "Tile decode failed");
            None
        }
    }
}

/// Tiles within `radius` of `center`, row by row.
///
/// Columns wrap around the antimeridian; rows beyond the poles are dropped.
fn view_block(center: &TileId, radius: u32) -> Vec<TileId> {
    let span = i64::from(center.max_index()) + 1;
    let radius = i64::from(radius).min(span / 2);
    // At low zoom the block can be wider than the world; visit each column once
    let columns = (2 * radius + 1).min(span);
    let mut tiles = Vec::new();

    for dy in -radius..=radius {
        let y = i64::from(center.y) + dy;
        if y < 0 || y >= span {
            continue;
        }
        for dx in 0..columns {
            let x = (i64::from(center.x) - radius + dx).rem_euclid(span);
            tiles.push(TileId::new(center.zoom, x as u32, y as u32));
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    #[test]
    fn test_view_block_interior() {
        let tiles = view_block(&TileId::new(10, 500, 400), 1);
        assert_eq!(tiles.len(), 9);
        assert_eq!(tiles[0], TileId::new(10, 499, 399));
        assert_eq!(tiles[8], TileId::new(10, 501, 401));
    }

    #[test]
    fn test_view_block_wraps_columns_and_clips_rows() {
        let tiles = view_block(&TileId::new(3, 0, 0), 1);
        // Row -1 is dropped, column -1 wraps to 7
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&TileId::new(3, 7, 0)));
        assert!(tiles.contains(&TileId::new(3, 1, 1)));
        assert!(tiles.iter().all(|t| t.is_valid()));
    }

    #[test]
    fn test_view_block_wider_than_world_has_no_duplicates() {
        let tiles = view_block(&TileId::new(1, 1, 0), 5);
        assert_eq!(
            tiles,
            vec![
                TileId::new(1, 0, 0),
                TileId::new(1, 1, 0),
                TileId::new(1, 0, 1),
                TileId::new(1, 1, 1),
            ]
        );

        let tiles = view_block(&TileId::new(2, 3, 1), 2);
        let unique: std::collections::BTreeSet<_> = tiles.iter().copied().collect();
        assert_eq!(tiles.len(), 16);
        assert_eq!(unique.len(), tiles.len());
    }

    #[test]
    fn test_view_block_at_zoom_zero() {
        assert_eq!(view_block(&TileId::new(0, 0, 0), 3), vec![TileId::new(0, 0, 0)]);
    }

    #[test]
    fn test_decode_rgba_png() {
        let img = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let (decoded, size) = decode_rgba(&png).unwrap();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(size, 4 * 2 * 4);
    }

    #[test]
    fn test_decode_rgba_rejects_garbage() {
        assert!(decode_rgba(b"definitely not an image").is_none());
    }
}
