//! Hot reload of the configuration file.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by writing a temp file and renaming it over the original are
//! still seen. Events for other files in the directory are ignored.
//!
//! Only settings that are safe to swap at runtime are applied by callers;
//! today that is the per-path log flag table.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_config;
use crate::config::schema::TransportConfig;
use crate::observability::Elapsed;

/// Keeps a config watch alive. Dropping it stops the watch.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Watches one configuration file and hands each valid revision to a callback.
#[derive(Debug, Clone)]
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching. `on_change` runs on the tokio runtime for every
    /// revision that parses and validates; broken revisions are logged and
    /// skipped so the running config stays in place.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(self, on_change: F) -> Result<WatchHandle, notify::Error>
    where
        F: Fn(TransportConfig) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_file && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let path = self.path;
        tracing::info!(path = %path.display(), "Config watcher started");

        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // one write often fires several events
                while rx.try_recv().is_ok() {}

                let _timer = Elapsed::new("config reload");
                match load_config(&path) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Config change applied");
                        on_change(config);
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "Config reload rejected, keeping current settings");
                    }
                }
            }
        });

        Ok(WatchHandle {
            _watcher: watcher,
            task,
        })
    }
}
