use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Watches the settings file and sends a notification on every write, so the
/// host can hand fresh values to `on_settings_changed`.
///
/// Must be spawned from within a Tokio runtime. Dropping the watcher stops
/// watching and closes the receiver.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = rammon_config::ConfigWatcher::spawn("/home/user/.config/rammon/rammon.toml");
/// while rx.recv().await.is_some() {
///     let _ = rammon_config::load("/home/user/.config/rammon/rammon.toml");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let task = tokio::spawn(watch_loop(path.clone(), tx));

        (Self { path, task }, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;
    use tokio::sync::mpsc as async_mpsc;

    let (sync_tx, mut sync_rx) = async_mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    // Editors often save by renaming over the file, which drops a watch on
    // the file itself; watch the directory and filter by name instead.
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", dir.display());
        return;
    }

    info!("Watching settings file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) if is_settings_write(&e, &path) => {
                debug!("Settings file event: {:?}", e.kind);
                // A burst of writes only needs one reload.
                if let Err(mpsc::error::TrySendError::Closed(())) = tx.try_send(()) {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}

fn is_settings_write(event: &notify::Event, path: &Path) -> bool {
    use notify::EventKind::{Create, Modify};
    matches!(event.kind, Modify(_) | Create(_))
        && event.paths.iter().any(|p| p.file_name() == path.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};
    use notify::{Event, EventKind};

    const SETTINGS: &str = "/home/u/.config/rammon/rammon.toml";

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn writes_trigger_reload() {
        let path = Path::new(SETTINGS);
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert!(is_settings_write(&event(modify, SETTINGS), path));
        assert!(is_settings_write(&event(EventKind::Create(CreateKind::File), SETTINGS), path));
    }

    #[test]
    fn other_events_are_ignored() {
        let path = Path::new(SETTINGS);
        assert!(!is_settings_write(&event(EventKind::Access(AccessKind::Any), SETTINGS), path));
        assert!(!is_settings_write(&event(EventKind::Remove(RemoveKind::File), SETTINGS), path));
    }

    #[test]
    fn neighbouring_files_are_ignored() {
        let modify = EventKind::Modify(ModifyKind::Any);
        let other = event(modify, "/home/u/.config/rammon/other.toml");
        assert!(!is_settings_write(&other, Path::new(SETTINGS)));
    }

    #[tokio::test]
    async fn spawn_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rammon.toml");
        std::fs::write(&path, "show_percentage = true\n").unwrap();
        let (watcher, _rx) = ConfigWatcher::spawn(&path);
        assert_eq!(watcher.path(), path.as_path());
    }

    #[tokio::test]
    async fn dropping_watcher_closes_receiver() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, mut rx) = ConfigWatcher::spawn(dir.path().join("rammon.toml"));
        drop(watcher);
        assert!(rx.recv().await.is_none());
    }
}
