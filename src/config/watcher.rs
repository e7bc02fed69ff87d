//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Notice every save of the config file, including atomic saves
//!   (write a temporary file, rename it over the original)
//! - Reload and validate, then hand the new `AppConfig` to the server
//!
//! # Design Decisions
//! - The parent directory is watched, not the file: a rename replaces the
//!   inode, and a watch on the old inode never fires again
//! - Events are filtered on the file name
//! - A save that leaves the content unchanged does not produce a reload

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::AppConfig;
use crate::observability::metrics;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

/// Per-watch state, owned by the notify callback.
struct Reloader {
    path: PathBuf,
    file_name: OsString,
    last_content: Option<String>,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl Reloader {
    fn concerns_file(&self, event: &Event) -> bool {
        if event.kind.is_access() || event.kind.is_remove() {
            return false;
        }
        event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
    }

    fn handle(&mut self, res: notify::Result<Event>) {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = ?e, "Watch error");
                return;
            }
        };
        if !self.concerns_file(&event) {
            return;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                // Mid-rename the file can be briefly missing; the next event retries.
                tracing::debug!(path = ?self.path, error = %e, "Config file not readable yet");
                return;
            }
        };
        if self.last_content.as_deref() == Some(content.as_str()) {
            return;
        }
        if content.trim().is_empty() {
            // In-place writers truncate first; wait for the write that follows.
            return;
        }

        tracing::info!(path = ?self.path, "Config file change detected, reloading");
        match parse_config(&content) {
            Ok(new_config) => {
                self.last_content = Some(content);
                if self.update_tx.send(new_config).is_err() {
                    tracing::warn!("Config reload dropped: no receiver is listening");
                }
            }
            Err(e) => {
                metrics::record_reload("rejected");
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Watching stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            notify::Error::generic("config path has no file name").add_path(self.path.clone())
        })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut reloader = Reloader {
            last_content: fs::read_to_string(&self.path).ok(),
            path: self.path.clone(),
            file_name,
            update_tx: self.update_tx,
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| reloader.handle(res),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, directory = ?dir, "Config watcher started");
        Ok(watcher)
    }
}
