use std::path::PathBuf;

use chrono::TimeDelta;
use clap::Parser;

use crate::{
    api::{Fetch, electrafi},
    cache::{Cached, ResponseCache},
    prelude::*,
};

#[derive(Parser)]
pub struct ConnectionArgs {
    #[clap(flatten)]
    api: ApiArgs,

    #[clap(flatten)]
    cache: CacheArgs,
}

#[derive(Parser)]
struct ApiArgs {
    /// ElectraFi API token.
    #[clap(long, env = "ELECTRAFI_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[clap(
        long = "api-base-url",
        env = "ELECTRAFI_API_BASE_URL",
        default_value = electrafi::DEFAULT_BASE_URL,
        global = true
    )]
    base_url: String,

    /// Global request timeout. A sleeping vehicle may take a while to answer.
    #[clap(
        long = "api-timeout",
        env = "ELECTRAFI_API_TIMEOUT",
        default_value = "30s",
        global = true
    )]
    timeout: humantime::Duration,
}

#[derive(Parser)]
struct CacheArgs {
    /// Directory for the cached API responses.
    #[clap(
        long = "cache-dir",
        env = "ELECTRAFI_CACHE_DIR",
        default_value = ".cache/electrafi",
        global = true
    )]
    directory: PathBuf,

    /// Maximum age of a cached response.
    #[clap(long = "cache-ttl", env = "ELECTRAFI_CACHE_TTL", default_value = "1h", global = true)]
    time_to_live: humantime::Duration,

    /// Always fetch fresh responses.
    #[clap(long = "no-cache", global = true)]
    no_cache: bool,
}

impl ConnectionArgs {
    /// Build the fetcher: the API client, wrapped in the response cache unless disabled.
    pub fn connect(&self) -> Result<Box<dyn Fetch>> {
        let token = self.api.token.clone().context(
            "no API token provided, set `ELECTRAFI_API_TOKEN` in the environment or pass `--token`",
        )?;
        let api = electrafi::Api::new(token, &self.api.base_url, *self.api.timeout);
        if self.cache.no_cache {
            debug!("cache is disabled");
            return Ok(Box::new(api));
        }
        let time_to_live = TimeDelta::from_std(*self.cache.time_to_live)
            .context("the cache time-to-live is too long")?;
        let cache = ResponseCache::new(&self.cache.directory, time_to_live);
        Ok(Box::new(Cached::new(api, cache)))
    }
}
