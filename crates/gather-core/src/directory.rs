//! User Directory: identity records, credential checks, profile reads with
//! optional relation expansion, and partial updates.

use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use uuid::Uuid;

use gather_db::{Database, is_constraint_violation};
use gather_types::api::UserProfile;
use gather_types::models::User;

use crate::error::Error;
use crate::map::{event_from_row, user_from_row};
use crate::run_blocking;

#[derive(Clone)]
pub struct UserDirectory {
    db: Arc<Database>,
}

impl UserDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a new identity. The password is stored as an Argon2id PHC
    /// string; an email collision maps to [`Error::Conflict`]. Token issuance
    /// is the facade's job — only the identity is returned.
    pub async fn create(&self, name: &str, email: &str, password: &str) -> Result<User, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Storage(anyhow::anyhow!("password hash: {}", e)))?
            .to_string();

        let id = Uuid::new_v4();
        let db = self.db.clone();
        let (name, email) = (name.to_string(), email.to_string());
        let row = run_blocking(move || {
            db.insert_user(&id.to_string(), &name, &email, &password_hash)?;
            db.get_user_by_id(&id.to_string())?
                .ok_or_else(|| anyhow::anyhow!("user vanished after insert"))
        })
        .await
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::Conflict
            } else {
                Error::Storage(e)
            }
        })?;

        Ok(user_from_row(&row))
    }

    /// Exact-match credential check. No-match is `Ok(None)`, never an error —
    /// callers decide whether that is a 401 or a silent skip.
    pub async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, Error> {
        let db = self.db.clone();
        let email = email.to_string();
        let row = run_blocking(move || db.get_user_by_email(&email)).await?;

        let Some(row) = row else { return Ok(None) };

        let parsed_hash = PasswordHash::new(&row.password)
            .map_err(|e| Error::Storage(anyhow::anyhow!("stored password hash: {}", e)))?;
        let verified = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();

        Ok(verified.then(|| user_from_row(&row)))
    }

    /// Profile lookup; `include_events` expands the user's owned events.
    pub async fn get(&self, id: Uuid, include_events: bool) -> Result<UserProfile, Error> {
        let db = self.db.clone();
        let (row, events) = run_blocking(move || {
            let id = id.to_string();
            let row = db.get_user_by_id(&id)?;
            let events = if row.is_some() && include_events {
                Some(db.list_events_by_owner(&id)?)
            } else {
                None
            };
            Ok((row, events))
        })
        .await?;

        let row = row.ok_or(Error::NotFound)?;
        Ok(UserProfile {
            user: user_from_row(&row),
            events: events.map(|rows| rows.iter().map(|r| event_from_row(r, None)).collect()),
        })
    }

    /// Partial update of name/email. Returns whether a row was modified —
    /// a missing user and an empty patch both report `false`.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<bool, Error> {
        let db = self.db.clone();
        let affected = run_blocking(move || {
            db.update_user(&id.to_string(), name.as_deref(), email.as_deref())
        })
        .await
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::Conflict
            } else {
                Error::Storage(e)
            }
        })?;

        Ok(affected > 0)
    }
}
