use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::{Fetch, Request},
    prelude::*,
};

/// On-disk response cache: one JSON file per request key.
pub struct ResponseCache {
    directory: PathBuf,
    time_to_live: TimeDelta,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    fetched_at: DateTime<Utc>,
    payload: Value,
}

impl ResponseCache {
    pub fn new(directory: impl Into<PathBuf>, time_to_live: TimeDelta) -> Self {
        Self { directory: directory.into(), time_to_live }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Utc::now())
    }

    /// Look the key up as if it were `now`.
    ///
    /// Missing, stale, and unreadable entries are all misses.
    #[instrument(skip_all, level = Level::DEBUG, fields(key = key))]
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        let path = self.path(key);
        let entry = match Self::read_entry(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("miss");
                return None;
            }
            Err(error) => {
                warn!(path = %path.display(), error = format!("{error:#}"), "corrupt cache entry");
                return None;
            }
        };
        if entry.key != key {
            warn!(path = %path.display(), cached_key = %entry.key, "cache key mismatch");
            return None;
        }
        let age = now - entry.fetched_at;
        if age >= self.time_to_live {
            debug!(age_secs = age.num_seconds(), "stale");
            return None;
        }
        debug!(age_secs = age.num_seconds(), "hit");
        Some(entry.payload)
    }

    pub fn put(&self, key: &str, payload: &Value) -> Result {
        self.put_at(key, payload, Utc::now())
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(key = key))]
    pub fn put_at(&self, key: &str, payload: &Value, now: DateTime<Utc>) -> Result {
        fs::create_dir_all(&self.directory).with_context(|| {
            format!("failed to create the cache directory `{}`", self.directory.display())
        })?;
        let entry = CacheEntry { key: key.to_owned(), fetched_at: now, payload: payload.clone() };
        let path = self.path(key);
        fs::write(&path, serde_json::to_vec(&entry)?)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        Ok(())
    }

    fn read_entry(path: &Path) -> Result<Option<CacheEntry>> {
        match fs::read(path) {
            Ok(contents) => Ok(Some(serde_json::from_slice(&contents)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{:x}.json", md5::compute(key.as_bytes())))
    }
}

/// Read-through cache in front of another fetcher.
pub struct Cached<F> {
    inner: F,
    cache: ResponseCache,
}

impl<F> Cached<F> {
    pub const fn new(inner: F, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }
}

impl<F: Fetch> Fetch for Cached<F> {
    fn fetch(&self, request: &Request) -> Result<Value> {
        if request.has_side_effects {
            return self.inner.fetch(request);
        }
        let key = request.key();
        if let Some(payload) = self.cache.get(&key) {
            return Ok(payload);
        }
        let payload = self.inner.fetch(request)?;
        if let Err(error) = self.cache.put(&key, &payload) {
            error!(error = format!("{error:#}"), "failed to save the response");
        }
        Ok(payload)
    }
}
