//! Admin accounts, login and sessions.
//!
//! # Invariants
//! - Emails are unique, compared lowercased.
//! - At least one active owner always remains: the last one cannot be
//!   deleted, deactivated or demoted.
//! - Nobody can delete their own account.
//! - Password changes and deactivation end the account's sessions.

use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{self, Session, SessionStore};
use crate::config::{AuthConfig, BootstrapOwner};
use crate::error::{Error, Result};
use crate::model::{self, AdminProfile, AdminRole, AdminUser, AdminUserPatch, NewAdminUser, Record};
use crate::storage::Storage;

const MAX_NAME_CHARS: usize = 120;
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Admin user service facade.
#[derive(Debug)]
pub struct UserService<'a> {
    storage: &'a Storage,
    sessions: &'a SessionStore,
    auth: &'a AuthConfig,
}

impl<'a> UserService<'a> {
    /// Create a service over the given storage and session store.
    #[must_use]
    pub fn new(storage: &'a Storage, sessions: &'a SessionStore, auth: &'a AuthConfig) -> Self {
        Self {
            storage,
            sessions,
            auth,
        }
    }

    /// Check credentials and open a session.
    ///
    /// Unknown emails, wrong passwords and disabled accounts all fail the same
    /// way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] on any credential failure.
    pub fn login(&self, email: &str, password: &str) -> Result<(Session, AdminProfile)> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.storage.users.find(|u| u.email == email)? else {
            auth::verify_placeholder(password);
            warn!("Login attempt for unknown account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !auth::verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if !user.active {
            warn!(user_id = %user.id, "Login attempt for disabled account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let now = Utc::now();
        let user = self.storage.users.update(&user.id, |u| {
            u.last_login_at = Some(now);
            Ok(())
        })?;
        let session = self.sessions.issue(&user.id);
        info!(user_id = %user.id, "Admin logged in");
        Ok((session, user.profile()))
    }

    /// End a session.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token)
    }

    /// The active account behind a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] for unknown or expired tokens and for
    /// accounts that were deleted or disabled since login.
    pub fn authenticate(&self, token: &str) -> Result<AdminUser> {
        let session = self
            .sessions
            .resolve(token)
            .ok_or_else(|| Error::unauthorized("invalid or expired session"))?;
        match self.storage.users.get(&session.user_id)? {
            Some(user) if user.active => Ok(user),
            _ => {
                self.sessions.revoke(token);
                Err(Error::unauthorized("invalid or expired session"))
            }
        }
    }

    /// Every account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the user file cannot be read.
    pub fn list(&self) -> Result<Vec<AdminProfile>> {
        let mut users = self.storage.users.all()?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users.iter().map(AdminUser::profile).collect())
    }

    /// One account by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn get(&self, id: &str) -> Result<AdminProfile> {
        Ok(self.storage.users.require(id)?.profile())
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or [`Error::Conflict`] for a
    /// taken email.
    pub fn create(&self, input: NewAdminUser) -> Result<AdminProfile> {
        let name = model::required("name", &input.name, MAX_NAME_CHARS)?;
        let email = model::normalize_email("email", &input.email)?;
        auth::check_password_strength(&input.password, self.auth.min_password_length)?;
        let password_hash = auth::hash_password(&input.password);
        let now = Utc::now();

        let user = self.storage.users.mutate(|users| {
            if users.iter().any(|u| u.email == email) {
                return Err(Error::conflict(format!("email {email} is already registered")));
            }
            let user = AdminUser {
                id: model::new_id(),
                name,
                email,
                password_hash,
                role: input.role,
                active: true,
                last_login_at: None,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        })?;

        info!(user_id = %user.id, role = %user.role, "Created admin user");
        Ok(user.profile())
    }

    /// Change an account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, a validation error for
    /// bad input, or [`Error::Conflict`] for a taken email or a change that
    /// would leave no active owner.
    pub fn update(&self, id: &str, patch: AdminUserPatch) -> Result<AdminProfile> {
        let name = patch
            .name
            .as_deref()
            .map(|n| model::required("name", n, MAX_NAME_CHARS))
            .transpose()?;
        let email = patch
            .email
            .as_deref()
            .map(|e| model::normalize_email("email", e))
            .transpose()?;
        let password_hash = match patch.password.as_deref() {
            Some(password) => {
                auth::check_password_strength(password, self.auth.min_password_length)?;
                Some(auth::hash_password(password))
            }
            None => None,
        };
        let now = Utc::now();

        let (user, end_sessions) = self.storage.users.mutate(|users| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| Error::not_found(AdminUser::COLLECTION, id))?;

            if let Some(email) = &email {
                if users.iter().any(|u| u.id != id && &u.email == email) {
                    return Err(Error::conflict(format!("email {email} is already registered")));
                }
            }

            let mut next = users[index].clone();
            if let Some(name) = name {
                next.name = name;
            }
            if let Some(email) = email {
                next.email = email;
            }
            if let Some(role) = patch.role {
                next.role = role;
            }
            if let Some(active) = patch.active {
                next.active = active;
            }
            let password_changed = password_hash.is_some();
            if let Some(hash) = password_hash {
                next.password_hash = hash;
            }
            next.updated_at = now;

            if users[index].is_active_owner() && !next.is_active_owner() {
                ensure_other_owner(users, id)?;
            }

            let end_sessions = password_changed || !next.active;
            users[index] = next.clone();
            Ok((next, end_sessions))
        })?;

        if end_sessions {
            self.sessions.revoke_user(&user.id);
        }
        info!(user_id = %user.id, role = %user.role, active = user.active, "Updated admin user");
        Ok(user.profile())
    }

    /// Delete an account on behalf of `actor_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id or [`Error::Conflict`] when
    /// deleting oneself or the last active owner.
    pub fn delete(&self, actor_id: &str, id: &str) -> Result<()> {
        if actor_id == id {
            return Err(Error::conflict("you cannot delete your own account"));
        }

        self.storage.users.mutate(|users| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| Error::not_found(AdminUser::COLLECTION, id))?;
            if users[index].is_active_owner() {
                ensure_other_owner(users, id)?;
            }
            users.remove(index);
            Ok(())
        })?;

        self.sessions.revoke_user(id);
        info!(user_id = id, actor_id, "Deleted admin user");
        Ok(())
    }

    /// Set a new password by email (CLI recovery path).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown email or a validation error
    /// for a weak password.
    pub fn reset_password(&self, email: &str, password: &str) -> Result<AdminProfile> {
        let email = model::normalize_email("email", email)?;
        let user = self
            .storage
            .users
            .find(|u| u.email == email)?
            .ok_or_else(|| Error::not_found(AdminUser::COLLECTION, email.clone()))?;
        self.update(
            &user.id,
            AdminUserPatch {
                password: Some(password.to_string()),
                ..AdminUserPatch::default()
            },
        )
    }

    /// Create the configured owner if there are no accounts yet.
    ///
    /// Returns the new owner, or `None` when accounts already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner cannot be created.
    pub fn bootstrap_owner(&self, owner: &BootstrapOwner) -> Result<Option<AdminProfile>> {
        if self.storage.users.count()? > 0 {
            return Ok(None);
        }
        let profile = self.create(NewAdminUser {
            name: owner.name.clone(),
            email: owner.email.clone(),
            password: owner.password.clone(),
            role: AdminRole::Owner,
        })?;
        info!(user_id = %profile.id, "Bootstrapped owner account");
        Ok(Some(profile))
    }
}

fn ensure_other_owner(users: &[AdminUser], id: &str) -> Result<()> {
    if users.iter().any(|u| u.id != id && u.is_active_owner()) {
        Ok(())
    } else {
        Err(Error::conflict("at least one active owner must remain"))
    }
}
