use log::{debug, warn};
use pool_api::{User, UserId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The logged-in user, persisted between runs.
///
/// The server's session cookie lives only in memory, so a stored user is
/// re-checked against `/api/auth/me` at startup.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<User>,
    path: PathBuf,
}

impl Session {
    pub fn load() -> Self {
        Self::load_from(session_path())
    }

    /// Read the stored user. An unreadable or corrupt file is removed.
    pub fn load_from(path: PathBuf) -> Self {
        let user = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<User>(&content) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("discarding invalid session file {}: {e}", path.display());
                    let _ = std::fs::remove_file(&path);
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("cannot read session file {}: {e}", path.display());
                None
            }
        };
        Self { user, path }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn store(&mut self, user: User) -> Result<(), String> {
        let written = write_user(&self.path, &user);
        self.user = Some(user);
        written
    }

    pub fn clear(&mut self) {
        self.user = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("session file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("cannot remove session file {}: {e}", self.path.display()),
        }
    }
}

fn write_user(path: &Path, user: &User) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
    }
    let payload =
        serde_json::to_string_pretty(user).map_err(|e| format!("serialize session failed: {e}"))?;
    std::fs::write(path, payload).map_err(|e| format!("write session failed: {e}"))
}

fn session_path() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("pooltui").join("session.json");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home)
            .join(".config")
            .join("pooltui")
            .join("session.json");
    }
    PathBuf::from("pooltui-session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pooltui-test-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("session.json")
    }

    fn anna() -> User {
        User {
            id: 4,
            username: "anna".into(),
            score: 2,
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_means_logged_out() {
        let session = Session::load_from(scratch("missing"));
        assert!(!session.is_logged_in());
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn stored_user_survives_reload() {
        let path = scratch("roundtrip");
        let mut session = Session::load_from(path.clone());
        session.store(anna()).unwrap();

        let reloaded = Session::load_from(path.clone());
        assert_eq!(reloaded.user(), Some(&anna()));

        let mut reloaded = reloaded;
        reloaded.clear();
        assert!(!reloaded.is_logged_in());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let path = scratch("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let session = Session::load_from(path.clone());
        assert!(!session.is_logged_in());
        assert!(!path.exists());
    }

    #[test]
    fn clearing_twice_is_harmless() {
        let mut session = Session::load_from(scratch("clear"));
        session.clear();
        session.clear();
        assert!(!session.is_logged_in());
    }
}
