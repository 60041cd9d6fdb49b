//! Service configuration
//!
//! All knobs are read once at startup from command-line flags with
//! environment-variable fallbacks and handed to the components as an
//! immutable object. No component reads the environment afterwards.

use clap::Parser;
use std::path::PathBuf;

/// Default upstream endpoint serving one conference week as HTML
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://www.bundestag.de/apps/plenar/plenar/conferenceweekDetail.form";

/// Runtime configuration for bta-server
#[derive(Parser, Debug, Clone)]
#[command(name = "bta-server")]
#[command(about = "Bundestag session-agenda API service")]
#[command(version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8321", env = "BTA_BIND_ADDR")]
    pub bind_addr: String,

    /// SQLite database file backing the key-value store and response cache
    #[arg(long, default_value = "bta.db", env = "BTA_DATABASE")]
    pub database: PathBuf,

    /// Upstream conference-week endpoint
    #[arg(long, default_value = DEFAULT_UPSTREAM_URL, env = "BTA_UPSTREAM_URL")]
    pub upstream_url: String,

    /// Seconds a rendered agenda response stays cached
    #[arg(long, default_value = "300", env = "BTA_AGENDA_CACHE_TTL")]
    pub agenda_cache_ttl: u64,

    /// Seconds the data-list response stays cached
    #[arg(long, default_value = "3600", env = "BTA_LIST_CACHE_TTL")]
    pub list_cache_ttl: u64,

    /// Seconds between scheduled refreshes of the current week
    #[arg(long, default_value = "900", env = "BTA_REFRESH_INTERVAL")]
    pub refresh_interval: u64,

    /// Earliest year served by the data list
    #[arg(long, default_value = "2020", env = "BTA_MIN_YEAR")]
    pub min_year: i32,

    /// Allow /purge to drop cached responses
    #[arg(long, env = "BTA_PURGE_CACHE")]
    pub purge_cache: bool,

    /// Allow /purge to drop the whole agenda store
    #[arg(long, env = "BTA_PURGE_STORE")]
    pub purge_store: bool,
}

impl ServerConfig {
    /// Configuration with all defaults, used by tests
    pub fn for_tests() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            database: PathBuf::from(":memory:"),
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
            agenda_cache_ttl: 300,
            list_cache_ttl: 3600,
            refresh_interval: 900,
            min_year: 2020,
            purge_cache: false,
            purge_store: false,
        }
    }
}
