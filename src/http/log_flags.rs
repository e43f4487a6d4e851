//! Per-path body logging flags.
//!
//! Bit 0 enables body logging for a path; bit 1 logs the body in full
//! instead of truncating it.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::watcher::{ConfigWatcher, WatchHandle};
use crate::config::LoggingConfig;

/// Two-bit log flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogFlag(u8);

impl LogFlag {
    pub const NONE: LogFlag = LogFlag(0);
    pub const LOG: LogFlag = LogFlag(0b01);
    pub const FULL: LogFlag = LogFlag(0b10);
    pub const ALL: LogFlag = LogFlag(0b11);

    /// Keep only the known bits.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        LogFlag(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Bodies for this path are logged.
    pub const fn enabled(self) -> bool {
        self.0 & Self::LOG.0 != 0
    }

    /// Logged bodies are not truncated.
    pub const fn full(self) -> bool {
        self.0 & Self::FULL.0 != 0
    }

    /// Text to log for `body`: all of it, or its first `limit` bytes.
    pub fn clip(self, body: &[u8], limit: usize) -> Cow<'_, str> {
        if self.full() || body.len() <= limit {
            String::from_utf8_lossy(body)
        } else {
            String::from_utf8_lossy(&body[..limit])
        }
    }
}

/// Looks up the log flag for a request path.
pub trait LogFlagSource: Send + Sync + 'static {
    fn log_flag(&self, path: &str) -> LogFlag;
}

impl<F> LogFlagSource for F
where
    F: Fn(&str) -> LogFlag + Send + Sync + 'static,
{
    fn log_flag(&self, path: &str) -> LogFlag {
        self(path)
    }
}

/// Log flags read from configuration; replaced wholesale on reload.
#[derive(Debug, Default)]
pub struct ConfigLogFlags {
    table: ArcSwap<HashMap<String, LogFlag>>,
}

impl ConfigLogFlags {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            table: ArcSwap::from_pointee(Self::table(config)),
        }
    }

    /// Swap in the flags from a freshly loaded configuration.
    pub fn reload(&self, config: &LoggingConfig) {
        self.table.store(Arc::new(Self::table(config)));
        tracing::info!(paths = config.flags.len(), "Log flags reloaded");
    }

    /// Reload the table whenever the config file at `path` changes.
    /// Keep the returned handle alive for as long as reloads should apply.
    pub fn watch(self: Arc<Self>, path: &Path) -> Result<WatchHandle, notify::Error> {
        ConfigWatcher::new(path).spawn(move |config| self.reload(&config.logging))
    }

    fn table(config: &LoggingConfig) -> HashMap<String, LogFlag> {
        config
            .flags
            .iter()
            .map(|(path, bits)| (path.clone(), LogFlag::from_bits_truncate(*bits)))
            .collect()
    }
}

impl LogFlagSource for ConfigLogFlags {
    fn log_flag(&self, path: &str) -> LogFlag {
        self.table.load().get(path).copied().unwrap_or(LogFlag::NONE)
    }
}
