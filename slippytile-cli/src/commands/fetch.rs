//! `fetch` and `locate` commands.
//!
//! Both resolve a single tile through the disk store and the tile server and
//! report how it was satisfied.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use slippytile::coord::{to_tile_id, tile_to_lat_lon, TileId};
use slippytile::tile::{FetchCode, FetchResult};

use super::common::{or_unset, CliContext, TileArgs};
use crate::error::CliError;

/// Arguments for `fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub tile: TileArgs,

    /// Revalidate a cached copy with the server (If-None-Match / If-Modified-Since)
    #[arg(long)]
    pub conditional: bool,

    /// Write the tile bytes to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for `locate`.
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Zoom level (0-22)
    #[arg(long)]
    pub zoom: u8,

    /// Revalidate a cached copy with the server
    #[arg(long)]
    pub conditional: bool,

    /// Write the tile bytes to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Run the `fetch` command.
pub fn run_fetch(context: &CliContext, args: FetchArgs) -> Result<(), CliError> {
    let id = args.tile.tile_id()?;
    resolve_and_report(context, &id, args.conditional, args.output)
}

/// Run the `locate` command.
pub fn run_locate(context: &CliContext, args: LocateArgs) -> Result<(), CliError> {
    let id = to_tile_id(args.lat, args.lon, args.zoom)?;
    let (nw_lat, nw_lon) = tile_to_lat_lon(&id);
    println!(
        "{:.6}, {:.6} at zoom {} is tile {} (north-west corner {:.6}, {:.6})",
        args.lat, args.lon, args.zoom, id, nw_lat, nw_lon
    );
    resolve_and_report(context, &id, args.conditional, args.output)
}

fn resolve_and_report(
    context: &CliContext,
    id: &TileId,
    conditional: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let app = context.app()?;
    let result = if conditional {
        app.resolver().ensure_raster_conditional(id)
    } else {
        app.resolver().ensure_raster(id)
    };

    print_result(id, &result);

    if !result.is_ok() {
        return Err(CliError::Fetch(format!(
            "{}: {} (HTTP {})",
            id, result.code, result.http_status
        )));
    }

    if let Some(path) = output {
        fs::write(&path, &result.body).map_err(|source| CliError::Output {
            path: path.clone(),
            source,
        })?;
        println!("Wrote {} bytes to {}", result.body.len(), path.display());
    }
    Ok(())
}

fn print_result(id: &TileId, result: &FetchResult) {
    let code = match result.code {
        FetchCode::HitDisk | FetchCode::NotModified => style(result.code).cyan(),
        FetchCode::Downloaded => style(result.code).green(),
        FetchCode::NotFound | FetchCode::Error => style(result.code).red(),
    };

    println!("Tile {}", style(id).bold());
    println!("  Result:      {}", code);
    if result.http_status != 0 {
        println!("  HTTP status: {}", result.http_status);
    }
    if !result.effective_url.is_empty() {
        println!("  URL:         {}", result.effective_url);
    }
    println!("  Bytes:       {}", result.body.len());

    if let Some(meta) = &result.meta {
        println!("  ETag:          {}", or_unset(meta.etag.as_deref()));
        println!("  Last-Modified: {}", or_unset(meta.last_modified.as_deref()));
        println!("  Content-Type:  {}", or_unset(meta.content_type.as_deref()));
        println!("  Last access:   {}", format_unix(meta.last_access_unix_sec));
    }
}

/// Formats a Unix timestamp as local time, or `never` for 0.
pub fn format_unix(secs: u64) -> String {
    if secs == 0 {
        return "never".to_string();
    }
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|| secs.to_string())
}
