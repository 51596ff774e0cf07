use crate::api::auth::{AuthPayload, User};
use bevy::log::warn;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// The signed-in user's token and cached record. Pages hand the token to
/// background workers by value when they spawn a request; nothing reads
/// storage ambiently at call time.
#[derive(Resource, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: User,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Adopts a fresh login/register payload and persists it.
    pub fn establish(&mut self, payload: AuthPayload) {
        if let Some(path) = session_file() {
            let stored = StoredSession {
                token: payload.token.clone(),
                user: payload.user.clone(),
            };
            if let Err(e) = write_session(&path, &stored) {
                warn!("Failed to persist session: {}", e);
            }
        }
        self.token = Some(payload.token);
        self.user = Some(payload.user);
    }

    pub fn update_user(&mut self, user: User) {
        if let (Some(path), Some(token)) = (session_file(), &self.token) {
            let stored = StoredSession {
                token: token.clone(),
                user: user.clone(),
            };
            if let Err(e) = write_session(&path, &stored) {
                warn!("Failed to persist session: {}", e);
            }
        }
        self.user = Some(user);
    }

    /// Logout: forgets the token and removes the session file.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
        if let Some(path) = session_file() {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to remove session file: {}", e);
                }
            }
        }
    }

    /// Restores a previously persisted session, if any.
    pub fn load() -> Self {
        let Some(path) = session_file() else {
            return Session::default();
        };
        match read_session(&path) {
            Ok(Some(stored)) => Session {
                token: Some(stored.token),
                user: Some(stored.user),
            },
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Ignoring unreadable session file: {}", e);
                Session::default()
            }
        }
    }
}

fn session_file() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("dailytrackr");
    path.push("session.json");
    Some(path)
}

fn write_session(path: &PathBuf, stored: &StoredSession) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(stored).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

fn read_session(path: &PathBuf) -> Result<Option<StoredSession>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let stored = serde_json::from_str(&json).map_err(|e| e.to_string())?;
    Ok(Some(stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_user() -> User {
        User {
            id: 7,
            username: "anaphygon".to_string(),
            email: "user@example.com".to_string(),
            bio: String::new(),
            profile_photo: String::new(),
            created_at: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
        }
    }

    fn temp_session_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("dailytrackr_session_{}_{}.json", std::process::id(), nanos));
        path
    }

    #[test]
    fn session_round_trips_through_disk() {
        let path = temp_session_path();
        let stored = StoredSession {
            token: "jwt-token".to_string(),
            user: sample_user(),
        };
        write_session(&path, &stored).unwrap();
        let loaded = read_session(&path).unwrap().unwrap();
        assert_eq!(loaded.token, "jwt-token");
        assert_eq!(loaded.user.username, "anaphygon");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_session_file_reads_as_none() {
        let path = temp_session_path();
        assert!(read_session(&path).unwrap().is_none());
    }

    #[test]
    fn corrupt_session_file_is_an_error_not_a_panic() {
        let path = temp_session_path();
        std::fs::write(&path, "not json").unwrap();
        assert!(read_session(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
