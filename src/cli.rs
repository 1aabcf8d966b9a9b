use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Search words, matched against bookmark titles
    pub query: Vec<String>,

    /// Only list bookmarks under this folder (case and spaces ignored)
    #[arg(short, long, default_value = "")]
    pub folder: String,

    /// Clear cached bookmarks before searching
    #[arg(long)]
    pub clear: bool,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Maximum number of results to print
    #[arg(long, default_value_t = 40)]
    pub max_results: usize,

    /// Bypass the cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

impl CliOptions {
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
