use anyhow::{Context, Result};
use tracing::{info, warn};

use marksift::fuzzy::{FuzzyFilter, SkimFilter};
use marksift::{cli, config, logging, output};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let cfg = &loaded.config;

    let mut builder = cfg.engine_builder().folder_filter(cli_opts.folder.as_str());
    if cli_opts.no_cache {
        info!("cache bypassed by CLI");
    } else {
        builder = builder
            .cache(cfg.cache_dir(), cfg.cache_age_hours)
            .cache_key(loaded.cache_key(&cli_opts.folder));
    }
    let engine = builder
        .build()
        .context("failed to prepare bookmark sources")?;

    if cli_opts.clear {
        if let Err(err) = engine.clear_cache() {
            warn!("failed to clear cache: {err}");
        }
    }

    let bookmarks = engine.bookmarks()?;
    let query = cli_opts.query();
    let matched = SkimFilter::default().filter(&query, &bookmarks);
    info!(
        "query={:?} folder={:?} matched {} of {} bookmarks",
        query,
        cli_opts.folder,
        matched.len(),
        bookmarks.len()
    );

    let items = output::render(&matched, cli_opts.max_results);
    output::write_items(std::io::stdout().lock(), &items)?;
    Ok(())
}
