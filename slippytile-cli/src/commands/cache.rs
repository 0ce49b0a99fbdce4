//! Cache management CLI commands.

use clap::Subcommand;
use console::style;
use slippytile::cache::{DiskStore, DiskUsage};

use super::common::{format_size_display, or_unset, CliContext, TileArgs};
use super::fetch::format_unix;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the disk cache, removing all cached tiles
    Clear,
    /// Remove one tile and its metadata from the disk cache
    Remove(TileArgs),
    /// Show where a tile is stored and its cached metadata
    Show(TileArgs),
    /// Show disk cache statistics
    Stats,
    /// Print the disk cache directory
    Path,
}

/// Run a cache subcommand.
pub fn run(context: &CliContext, action: CacheAction) -> Result<(), CliError> {
    let store = DiskStore::new(context.config.disk_config())?;
    let cache_dir = &store.config().root;

    match action {
        CacheAction::Clear => {
            let before = store.usage();
            println!("Clearing disk cache at: {}", cache_dir.display());
            store.clear_all();
            let report = ClearReport::new(before, store.usage());
            println!(
                "Removed {} tiles, freed {}",
                report.removed_tiles(),
                format_size_display(report.freed_bytes())
            );
            if report.remaining.tiles > 0 || report.remaining.meta_files > 0 {
                println!(
                    "{} {} tiles and {} metadata files could not be removed",
                    style("warning:").yellow().bold(),
                    report.remaining.tiles,
                    report.remaining.meta_files
                );
            }
        }
        CacheAction::Remove(tile) => {
            let id = tile.tile_id()?;
            let existed = store.exists(&id);
            store.remove(&id)?;
            if existed {
                println!("Removed {}", id);
            } else {
                println!("{} was not cached", id);
            }
        }
        CacheAction::Show(tile) => {
            let id = tile.tile_id()?;
            println!("Tile {}", id);
            println!("  Raster:   {}", store.raster_path(&id).display());
            println!("  Metadata: {}", store.meta_path(&id).display());

            match store.load_raster(&id) {
                Some(bytes) => {
                    println!("  Cached:   yes ({})", format_size_display(bytes.len() as u64))
                }
                None => println!("  Cached:   no"),
            }
            if let Some(meta) = store.load_meta(&id) {
                println!("  ETag:           {}", or_unset(meta.etag.as_deref()));
                println!("  Last-Modified:  {}", or_unset(meta.last_modified.as_deref()));
                println!("  Content-Type:   {}", or_unset(meta.content_type.as_deref()));
                println!("  Content-Length: {}", meta.content_length);
                println!(
                    "  Revalidate:     {}",
                    if meta.has_validators() {
                        "conditional (ETag / Last-Modified)"
                    } else {
                        "full download (no validators)"
                    }
                );
                println!("  Last access:    {}", format_unix(meta.last_access_unix_sec));
            }
        }
        CacheAction::Stats => {
            let usage = store.usage();
            println!("Disk cache: {}", cache_dir.display());
            println!("  Tiles:    {}", usage.tiles);
            println!("  Size:     {}", format_size_display(usage.raster_bytes));
            println!(
                "  Metadata: {} files, {}",
                usage.meta_files,
                format_size_display(usage.meta_bytes)
            );
        }
        CacheAction::Path => println!("{}", cache_dir.display()),
    }
    Ok(())
}

/// What `cache clear` actually removed, measured before and after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClearReport {
    before: DiskUsage,
    remaining: DiskUsage,
}

impl ClearReport {
    fn new(before: DiskUsage, remaining: DiskUsage) -> Self {
        Self { before, remaining }
    }

    fn removed_tiles(&self) -> u64 {
        self.before.tiles.saturating_sub(self.remaining.tiles)
    }

    fn freed_bytes(&self) -> u64 {
        let before = self.before.raster_bytes + self.before.meta_bytes;
        let after = self.remaining.raster_bytes + self.remaining.meta_bytes;
        before.saturating_sub(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slippytile::coord::TileId;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> CliContext {
        CliContext::load(temp.path().join("none.ini"), Some(temp.path().join("tiles"))).unwrap()
    }

    #[test]
    fn test_remove_and_clear() {
        let temp = TempDir::new().unwrap();
        let context = context(&temp);
        let store = DiskStore::new(context.config.disk_config()).unwrap();
        let a = TileId::new(2, 1, 1);
        let b = TileId::new(2, 2, 2);
        store.save_raster(&a, &[1, 2], None).unwrap();
        store.save_raster(&b, &[3], None).unwrap();

        run(&context, CacheAction::Remove(TileArgs { z: 2, x: 1, y: 1 })).unwrap();
        assert!(!store.exists(&a));
        assert!(store.exists(&b));

        run(&context, CacheAction::Clear).unwrap();
        assert!(!store.exists(&b));
        assert_eq!(store.usage().tiles, 0);
    }

    #[test]
    fn test_clear_report_counts_only_what_was_removed() {
        let before = DiskUsage {
            tiles: 10,
            raster_bytes: 10_000,
            meta_files: 10,
            meta_bytes: 1_000,
        };
        let remaining = DiskUsage {
            tiles: 3,
            raster_bytes: 2_500,
            meta_files: 3,
            meta_bytes: 300,
        };

        let report = ClearReport::new(before, remaining);
        assert_eq!(report.removed_tiles(), 7);
        assert_eq!(report.freed_bytes(), 8_200);

        let full = ClearReport::new(before, DiskUsage::default());
        assert_eq!(full.removed_tiles(), 10);
        assert_eq!(full.freed_bytes(), 11_000);
    }

    #[test]
    fn test_clear_measures_store_after_clearing() {
        let temp = TempDir::new().unwrap();
        let context = context(&temp);
        let store = DiskStore::new(context.config.disk_config()).unwrap();
        store.save_raster(&TileId::new(3, 1, 2), &[0; 100], None).unwrap();
        let before = store.usage();

        store.clear_all();
        let report = ClearReport::new(before, store.usage());

        assert_eq!(report.removed_tiles(), 1);
        assert_eq!(report.freed_bytes(), 100);
        assert_eq!(report.remaining, DiskUsage::default());
    }

    #[test]
    fn test_show_and_stats_on_empty_cache() {
        let temp = TempDir::new().unwrap();
        let context = context(&temp);
        run(&context, CacheAction::Show(TileArgs { z: 0, x: 0, y: 0 })).unwrap();
        run(&context, CacheAction::Stats).unwrap();
    }

    #[test]
    fn test_invalid_tile_rejected() {
        let temp = TempDir::new().unwrap();
        let result = run(&context(&temp), CacheAction::Remove(TileArgs { z: 1, x: 5, y: 0 }));
        assert!(matches!(result, Err(CliError::InvalidTile(_))));
    }
}
