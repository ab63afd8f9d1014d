//! File-backed [`StateStore`].
//!
//! One file per key under the data directory. A missing file is an absent
//! key; writes go through a temp file and rename so a crashed write never
//! leaves a torn value behind (a torn value would otherwise be read back
//! as malformed and silently discarded).

use std::io::ErrorKind;
use std::path::PathBuf;

use chatlet_core::persist::state::StateStore;
use chatlet_types::error::StateError;

/// Durable keyed storage rooted at a directory.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// write, so construction itself never touches the filesystem.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl StateStore for FileStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StateError::Io(format!("reading '{key}': {err}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|err| {
            StateError::Unavailable(format!("cannot create {}: {err}", self.dir.display()))
        })?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.tmp"));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|err| StateError::Io(format!("writing '{key}': {err}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| StateError::Io(format!("committing '{key}': {err}")))
    }

    async fn remove(&self, key: &str) -> Result<(), StateError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StateError::Io(format!("removing '{key}': {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> FileStateStore {
        FileStateStore::new(tmp.path().join("state"))
    }

    #[tokio::test]
    async fn get_absent_key_returns_none() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);
        assert_eq!(state.get("chatlet.transcript").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);

        state.set("chatlet.session", "abc-123").await.unwrap();
        assert_eq!(
            state.get("chatlet.session").await.unwrap(),
            Some("abc-123".to_string())
        );
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);

        state.set("chatlet.transcript", "old").await.unwrap();
        state.set("chatlet.transcript", "new").await.unwrap();
        assert_eq!(
            state.get("chatlet.transcript").await.unwrap(),
            Some("new".to_string())
        );
    }

    #[tokio::test]
    async fn remove_deletes_the_key() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);

        state.set("chatlet.transcript", "value").await.unwrap();
        state.remove("chatlet.transcript").await.unwrap();
        assert_eq!(state.get("chatlet.transcript").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_absent_key_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);
        state.remove("chatlet.transcript").await.unwrap();
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);

        state.set("chatlet.session", "id").await.unwrap();
        state.set("chatlet.transcript", "[]").await.unwrap();
        state.remove("chatlet.transcript").await.unwrap();

        assert_eq!(
            state.get("chatlet.session").await.unwrap(),
            Some("id".to_string())
        );
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let state = store(&tmp);

        state.set("chatlet.session", "id").await.unwrap();
        assert!(
            !tmp.path().join("state").join("chatlet.session.tmp").exists()
        );
    }
}
