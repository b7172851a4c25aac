//! Picks up edits made to the config file while the app runs.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

pub struct ConfigWatcher {
	_watcher: RecommendedWatcher,
	rx: Receiver<notify::Result<Event>>,
	file: PathBuf,
}

impl ConfigWatcher {
	/// Watch the directory holding `file`; editors often replace the file
	/// instead of writing in place.
	pub fn new(file: &Path) -> notify::Result<Self> {
		let (tx, rx) = mpsc::channel();
		let mut watcher = RecommendedWatcher::new(
			move |res| {
				let _ = tx.send(res);
			},
			Config::default(),
		)?;

		let dir = file.parent().unwrap_or(file);
		std::fs::create_dir_all(dir).map_err(notify::Error::io)?;
		watcher.watch(dir, RecursiveMode::NonRecursive)?;

		Ok(Self {
			_watcher: watcher,
			rx,
			file: file.to_path_buf(),
		})
	}

	/// Drain pending events. `true` if the config file was touched.
	pub fn changed(&self) -> bool {
		let mut changed = false;
		while let Ok(res) = self.rx.try_recv() {
			match res {
				Ok(event) => changed |= self.is_relevant(&event),
				Err(err) => tracing::warn!(error = %err, "config watcher error"),
			}
		}
		changed
	}

	fn is_relevant(&self, event: &Event) -> bool {
		matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
			&& event.paths.iter().any(|p| p.file_name() == self.file.file_name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::{Duration, Instant};

	#[test]
	fn reports_writes_to_the_watched_file() {
		let dir = std::env::temp_dir().join(format!("windify-watch-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let file = dir.join("windify.json");
		let watcher = ConfigWatcher::new(&file).unwrap();

		std::fs::write(dir.join("other.txt"), "x").unwrap();
		std::fs::write(&file, "{}").unwrap();

		let deadline = Instant::now() + Duration::from_secs(5);
		let mut seen = false;
		while Instant::now() < deadline && !seen {
			seen = watcher.changed();
			std::thread::sleep(Duration::from_millis(20));
		}
		let _ = std::fs::remove_dir_all(&dir);
		assert!(seen);
	}
}
