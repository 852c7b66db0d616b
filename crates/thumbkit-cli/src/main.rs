//! thumbkit lists a directory with the icon or thumbnail each entry gets.
//!
//! Drives the core cache the way a file browser would: one surface per row,
//! a fallback icon painted immediately, then completions pumped until the
//! loader is idle.

mod args;
mod report;

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use thumbkit_core::{
    classify, read_directory, CompletionOutcome, Config, MemorySurface, SurfaceId,
    ThumbnailCache,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, USAGE};
use crate::report::{format_row, save_thumbnail, thumbnail_file, Shown};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("THUMBKIT_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut config = load_config(args.config.as_deref())?;
    if args.no_thumbs {
        config.cache.thumbnails = false;
    }

    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    if let Some(out) = &args.out {
        std::fs::create_dir_all(out)
            .with_context(|| format!("failed to create {}", out.display()))?;
    }

    run(&config, &dir, args.out.as_deref())
}

/// `--config` if given, else `~/.config/thumbkit/config.toml` if present,
/// else defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path).with_context(|| format!("failed to load {}", path.display()));
    }
    let default = default_config_path();
    if default.is_file() {
        match Config::load(&default) {
            Ok(config) => return Ok(config),
            Err(e) => tracing::warn!("ignoring {}: {e}", default.display()),
        }
    }
    Ok(Config::default())
}

fn default_config_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join(".config")
        .join("thumbkit")
        .join("config.toml")
}

fn run(config: &Config, dir: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let entries = read_directory(dir)?;
    let mut cache = ThumbnailCache::from_config(config)?;

    let rows: Vec<Rc<MemorySurface>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let row = Rc::new(MemorySurface::new(SurfaceId(i as u64)));
            cache.request_thumbnail(&row, entry, classify(entry).icon_id());
            row
        })
        .collect();

    let mut applied = 0;
    while !cache.is_idle() {
        if cache.wait_for_completion(PUMP_INTERVAL) == Some(CompletionOutcome::Applied) {
            applied += 1;
        }
    }
    applied += cache.process_completions();
    tracing::info!(entries = entries.len(), thumbnails = applied, "listing done");

    for (entry, row) in entries.iter().zip(&rows) {
        let category = classify(entry);
        let icon = cache.static_icon(category.icon_id());
        let shown = match row.asset() {
            Some(asset) if !asset.ptr_eq(&icon) => {
                if let Some(out) = out {
                    save_thumbnail(&asset, &thumbnail_file(out, entry))?;
                }
                Shown::Thumbnail {
                    width: asset.width(),
                    height: asset.height(),
                }
            }
            _ => Shown::Icon(category.icon_id().name()),
        };
        println!("{}", format_row(entry, category, &shown));
    }

    cache.cleanup();
    Ok(())
}
