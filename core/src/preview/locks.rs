use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
};

use tokio::sync::Mutex;

/// One async lock per cache key, so a preview is only rendered once no matter how
/// many requests ask for it at the same time.
///
/// The table only holds weak references: an entry lives as long as some request is
/// holding or waiting on its lock, and is swept on a later lookup.
#[derive(Debug, Default)]
pub(super) struct KeyLocks {
	locks: StdMutex<HashMap<PathBuf, Weak<Mutex<()>>>>,
}

impl KeyLocks {
	pub(super) fn get(&self, key: &Path) -> Arc<Mutex<()>> {
		let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

		if let Some(lock) = locks.get(key).and_then(Weak::upgrade) {
			return lock;
		}

		locks.retain(|_, lock| lock.strong_count() > 0);

		let lock = Arc::new(Mutex::new(()));
		locks.insert(key.to_path_buf(), Arc::downgrade(&lock));
		lock
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.locks
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}
}
