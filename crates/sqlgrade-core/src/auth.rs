//! Request-scoped identities. A `Session` or `AdminSession` can only be built
//! by a successful login and is passed explicitly into every operation that
//! needs one.

use crate::config::CourseConfig;
use crate::errors::AuthError;
use crate::model::Student;
use crate::storage::Store;

#[derive(Debug, Clone)]
pub struct Session {
    student: Student,
}

impl Session {
    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn student_id(&self) -> &str {
        &self.student.student_id
    }

    pub fn track(&self) -> &str {
        &self.student.track
    }
}

pub fn login(store: &Store, student_id: &str, password: &str) -> anyhow::Result<Session> {
    let student_id = student_id.trim();
    let password = password.trim();
    if student_id.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials.into());
    }
    match store.authenticate(student_id, password)? {
        Some(student) => {
            tracing::info!(student_id = %student.student_id, "student logged in");
            Ok(Session { student })
        }
        None => {
            tracing::warn!(student_id = %student_id, "failed student login");
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

pub fn change_password(
    store: &Store,
    session: &Session,
    old: &str,
    new: &str,
    confirm: &str,
) -> anyhow::Result<()> {
    let (old, new, confirm) = (old.trim(), new.trim(), confirm.trim());
    if old.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(AuthError::MissingFields.into());
    }
    if new != confirm {
        return Err(AuthError::ConfirmationMismatch.into());
    }
    match store.stored_password(session.student_id())? {
        Some(current) if current == old => {}
        _ => return Err(AuthError::WrongOldPassword.into()),
    }
    store.set_password(session.student_id(), new)?;
    tracing::info!(student_id = %session.student_id(), "password changed");
    Ok(())
}

pub fn register_email(store: &Store, session: &Session, email: &str) -> anyhow::Result<()> {
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("e-mail address is required");
    }
    store.set_email(session.student_id(), email)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    /// `ADMIN_USERNAME`/`ADMIN_PASSWORD` win over the config file.
    pub fn resolve(cfg: &CourseConfig) -> Option<Self> {
        let from_cfg = cfg.admin.as_ref();
        let username = std::env::var("ADMIN_USERNAME")
            .ok()
            .or_else(|| from_cfg.map(|a| a.username.clone()))?;
        let password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .or_else(|| from_cfg.map(|a| a.password.clone()))?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { username, password })
    }
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    username: String,
}

impl AdminSession {
    pub fn username(&self) -> &str {
        &self.username
    }
}

pub fn admin_login(
    creds: Option<&AdminCredentials>,
    username: &str,
    password: &str,
) -> anyhow::Result<AdminSession> {
    let creds = creds.ok_or(AuthError::AdminNotConfigured)?;
    if username.trim() == creds.username && password.trim() == creds.password {
        tracing::info!(username = %creds.username, "admin logged in");
        Ok(AdminSession {
            username: creds.username.clone(),
        })
    } else {
        tracing::warn!(username = %username, "failed admin login");
        Err(AuthError::InvalidAdmin.into())
    }
}
