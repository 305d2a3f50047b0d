use crate::errors::AppError;
use crate::models::{Session, User};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::error;

/// On-disk key-value record: the auth token, the serialized user profile, and
/// one transient key carrying a selected student across a single navigation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SessionData {
    token: Option<String>,
    user: Option<User>,
    selected_student_id: Option<i64>,
}

impl SessionData {
    fn session(&self) -> Option<Session> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        let user = self.user.as_ref()?;
        Some(Session {
            token: token.to_string(),
            user: user.clone(),
        })
    }
}

/// File-backed session store. The in-memory copy is read once at startup;
/// writers persist on every mutation, last write wins.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    data: Arc<Mutex<SessionData>>,
}

pub fn resolve_session_path() -> PathBuf {
    if let Ok(path) = env::var("SESSION_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/session.json")
}

impl SessionStore {
    pub async fn open(path: PathBuf) -> Self {
        let data = load_data(&path).await;
        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// `Some` iff token and user are both present, with a non-empty token.
    pub async fn get(&self) -> Option<Session> {
        self.data.lock().await.session()
    }

    pub async fn is_valid(&self) -> bool {
        self.get().await.is_some()
    }

    /// Token and user are stored together; partial sessions never hit disk.
    pub async fn set(&self, token: String, user: User) -> Result<(), AppError> {
        let mut data = self.data.lock().await;
        data.token = Some(token);
        data.user = Some(user);
        persist_data(&self.path, &data).await
    }

    /// Wipes every key, the transient one included. Callers pair this with a
    /// redirect to the login page.
    pub async fn clear(&self) -> Result<(), AppError> {
        let mut data = self.data.lock().await;
        *data = SessionData::default();
        persist_data(&self.path, &data).await
    }

    pub async fn stash_student(&self, student_id: i64) -> Result<(), AppError> {
        let mut data = self.data.lock().await;
        data.selected_student_id = Some(student_id);
        persist_data(&self.path, &data).await
    }

    /// Consumes the stashed id; it lives for exactly one navigation.
    pub async fn take_student(&self) -> Result<Option<i64>, AppError> {
        let mut data = self.data.lock().await;
        let taken = data.selected_student_id.take();
        if taken.is_some() {
            persist_data(&self.path, &data).await?;
        }
        Ok(taken)
    }
}

async fn load_data(path: &Path) -> SessionData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse session file: {err}");
                SessionData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
        Err(err) => {
            error!("failed to read session file: {err}");
            SessionData::default()
        }
    }
}

async fn persist_data(path: &Path, data: &SessionData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}
