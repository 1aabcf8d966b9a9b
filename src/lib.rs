pub mod bookmark;
pub mod cache;
pub mod cli;
pub mod config;
pub mod container;
pub mod engine;
pub mod fuzzy;
pub mod logging;
pub mod output;
pub mod sources;
pub mod util;
