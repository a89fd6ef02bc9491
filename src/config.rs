//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::pager::PAGE_SIZES;
use crate::poll::PollSettings;
use crate::source::ClientSettings;

/// Walk a subreddit's newest threads page by page in the terminal.
#[derive(Parser, Debug)]
#[command(name = "livescroll-subreddit")]
#[command(version, about)]
pub struct Args {
    /// Subreddit name or link to start polling immediately
    pub channel: Option<String>,

    /// Base URL of the listing endpoint
    #[arg(long, default_value = "https://www.reddit.com")]
    pub base_url: String,

    /// Delay between page requests in milliseconds
    #[arg(short, long, default_value = "5000")]
    pub interval_ms: u64,

    /// Initial table page size (10, 20, 30, 40 or 50)
    #[arg(short, long, default_value = "10")]
    pub page_size: usize,

    /// Directory the export is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Log file (the terminal is taken by the UI)
    #[arg(long, default_value = "livescroll-subreddit.log")]
    pub log_file: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid base url `{0}`")]
    BaseUrl(String),
    #[error("page size must be one of 10, 20, 30, 40 or 50, got {0}")]
    PageSize(usize),
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub initial_channel: Option<String>,
    pub client: ClientSettings,
    pub poll: PollSettings,
    pub page_size: usize,
    pub output_dir: PathBuf,
    /// Host pasted links must point at, without `www.`/`m.`.
    pub feed_host: String,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let feed_host = feed_host(&args.base_url)?;
        if !PAGE_SIZES.contains(&args.page_size) {
            return Err(ConfigError::PageSize(args.page_size));
        }
        if args.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if args.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let defaults = ClientSettings::default();
        let client = ClientSettings {
            base_url: args.base_url,
            request_timeout: Duration::from_secs(args.timeout_secs),
            user_agent: args.user_agent.unwrap_or(defaults.user_agent),
            connect_timeout: defaults.connect_timeout,
        };

        Ok(Self {
            initial_channel: args.channel,
            client,
            poll: PollSettings {
                interval: Duration::from_millis(args.interval_ms),
            },
            page_size: args.page_size,
            output_dir: args.output_dir,
            feed_host,
            log_file: args.log_file,
            log_level: args.log_level,
        })
    }
}

fn feed_host(base_url: &str) -> Result<String, ConfigError> {
    let url = Url::parse(base_url).map_err(|_| ConfigError::BaseUrl(base_url.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::BaseUrl(base_url.to_string()))?;
    let bare = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);
    Ok(bare.to_string())
}
