use crate::config::ConfigError;
use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Watches the dataset and config files and reports changes as `AppEvent`s.
///
/// Parent directories are watched rather than the files themselves so that
/// editors replacing a file on save are still noticed.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<AppEvent>,
}

struct WatchedFiles {
    dataset: Option<PathBuf>,
    configs: Vec<PathBuf>,
}

impl WatchedFiles {
    fn classify(&self, event: &Event) -> Option<AppEvent> {
        let meaningful_event = matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
        );
        if !meaningful_event {
            return None;
        }

        if let Some(dataset) = &self.dataset
            && event.paths.iter().any(|p| same_file(p, dataset))
        {
            return Some(AppEvent::DatasetChanged(dataset.clone()));
        }
        event
            .paths
            .iter()
            .any(|p| self.configs.iter().any(|c| same_file(p, c)))
            .then_some(AppEvent::ConfigReload)
    }

    fn directories(&self) -> BTreeSet<PathBuf> {
        self.dataset
            .iter()
            .chain(&self.configs)
            .filter_map(|p| absolute(p).parent().map(Path::to_path_buf))
            .filter(|dir| dir.is_dir())
            .collect()
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn same_file(a: &Path, b: &Path) -> bool {
    a == b || absolute(a) == absolute(b)
}

fn forward(files: &WatchedFiles, res: notify::Result<Event>, tx: &Sender<AppEvent>) {
    match res {
        Ok(event) => {
            if let Some(app_event) = files.classify(&event) {
                let _ = tx.send_blocking(app_event);
            }
        }
        Err(e) => log::error!("Watch error: {}", e),
    }
}

impl FileWatcher {
    pub fn new(dataset: Option<PathBuf>, configs: Vec<PathBuf>) -> Result<Self, ConfigError> {
        let files = WatchedFiles { dataset, configs };
        let directories = files.directories();
        let (tx, rx) = async_channel::unbounded();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| forward(&files, res, &tx),
            notify::Config::default(),
        )?;
        for dir in &directories {
            log::debug!("Watching {}", dir.display());
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Blocks for the next change, then drains the burst of events one save
    /// usually produces. A dataset change wins over a config reload.
    pub fn next_change(&self) -> Option<AppEvent> {
        let first = self.rx.recv_blocking().ok()?;
        let mut event = first;
        while let Ok(next) = self.rx.try_recv() {
            if !matches!(event, AppEvent::DatasetChanged(_)) {
                event = next;
            }
        }
        Some(event)
    }
}
