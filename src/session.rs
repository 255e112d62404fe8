use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub token: String,
    #[serde(rename = "userData")]
    pub user: UserData,
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn from_env() -> Result<Self> {
        let path = match std::env::var_os("HEALTH_DIRECTORY_SESSION") {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .context("could not determine a home directory for the session file")?
                .join(".health-directory")
                .join("session.json"),
        };
        Ok(Self::at(path))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn login(&self, role: Role, name: &str) -> Result<SessionContext> {
        let session = SessionContext {
            token: Uuid::new_v4().to_string(),
            user: UserData {
                role,
                name: name.to_string(),
            },
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("could not write {}", self.path.display()))?;
        Ok(session)
    }

    pub fn logout(&self) -> Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("could not remove {}", self.path.display()))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn load(&self) -> Option<SessionContext> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn require_role(&self, role: Role) -> Result<SessionContext> {
        match self.load() {
            Some(session) if session.user.role == role => Ok(session),
            Some(session) => {
                // A session for the wrong dashboard is discarded, not reused.
                let _ = fs::remove_file(&self.path);
                bail!(
                    "the current {} session cannot open the {} view, run `health-directory login --role {}` first",
                    session.user.role.as_str(),
                    role.as_str(),
                    role.as_str()
                )
            }
            None => {
                let _ = fs::remove_file(&self.path);
                bail!(
                    "no valid session found, run `health-directory login --role {}` first",
                    role.as_str()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::at(dir.path().join("session.json"))
    }

    #[test]
    fn login_roundtrips_through_the_session_file() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let session = store.login(Role::Patient, "Amina Sali").unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.token, session.token);
        assert_eq!(loaded.user.role, Role::Patient);
        assert_eq!(loaded.user.name, "Amina Sali");
    }

    #[test]
    fn session_file_keeps_the_user_data_key() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.login(Role::Admin, "Claire Mbarga").unwrap();

        let raw = fs::read_to_string(dir.path().join("session.json")).unwrap();
        assert!(raw.contains("\"userData\""));
        assert!(raw.contains("\"admin\""));
    }

    #[test]
    fn require_role_accepts_a_matching_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.login(Role::Admin, "Claire Mbarga").unwrap();

        let session = store.require_role(Role::Admin).unwrap();
        assert_eq!(session.user.name, "Claire Mbarga");
    }

    #[test]
    fn require_role_clears_a_mismatched_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.login(Role::Patient, "Amina Sali").unwrap();

        assert!(store.require_role(Role::Admin).is_err());
        assert!(store.load().is_none());
    }

    #[test]
    fn require_role_rejects_a_missing_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let error = store.require_role(Role::Patient).unwrap_err();
        assert!(error.to_string().contains("login"));
    }

    #[test]
    fn require_role_clears_a_corrupt_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not a session").unwrap();
        let store = SessionStore::at(path.clone());

        assert!(store.require_role(Role::Patient).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn extra_user_data_fields_are_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{"token":"abc","userData":{"role":"doctor","name":"Sarah Wilson","avatarUrl":"x.png"}}"#,
        )
        .unwrap();

        let store = SessionStore::at(path);
        let session = store.load().unwrap();
        assert_eq!(session.user.role, Role::Doctor);
        assert_eq!(session.user.name, "Sarah Wilson");
    }

    #[test]
    fn logout_removes_the_session_file() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.login(Role::Doctor, "Sarah Wilson").unwrap();

        assert!(store.logout().unwrap());
        assert!(store.load().is_none());
        assert!(!store.logout().unwrap());
    }
}
