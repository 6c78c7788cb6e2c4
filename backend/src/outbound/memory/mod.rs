//! In-memory user repository.
//!
//! A single `RwLock` guards the primary map together with the `username` and
//! `email` indices, so uniqueness checks and writes happen in one critical
//! section. Reads share the lock; writes hold it exclusively. Contents live
//! for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{UniqueField, UserRepository, UserRepositoryError};
use crate::domain::{Email, User, UserId, Username};

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    by_username: HashMap<Username, UserId>,
    by_email: HashMap<Email, UserId>,
    insertion_order: Vec<UserId>,
}

impl Store {
    /// Return the field on which `user` would collide with a different entity.
    fn collision(&self, user: &User) -> Option<UniqueField> {
        let held_by_other = |owner: Option<&UserId>| owner.is_some_and(|id| id != user.id());
        if held_by_other(self.by_username.get(user.username())) {
            return Some(UniqueField::Username);
        }
        if held_by_other(self.by_email.get(user.email())) {
            return Some(UniqueField::Email);
        }
        None
    }

    fn index(&mut self, user: &User) {
        self.by_username
            .insert(user.username().clone(), user.id().clone());
        self.by_email.insert(user.email().clone(), user.id().clone());
    }

    fn unindex(&mut self, user: &User) {
        self.by_username.remove(user.username());
        self.by_email.remove(user.email());
    }

    fn lookup(&self, id: Option<&UserId>, key: &str) -> Result<User, UserRepositoryError> {
        id.and_then(|id| self.users.get(id))
            .cloned()
            .ok_or_else(|| UserRepositoryError::not_found(key))
    }
}

/// Process-local [`UserRepository`] backed by hash maps.
///
/// # Examples
/// ```
/// use user_service::outbound::memory::InMemoryUserRepository;
///
/// let repository = InMemoryUserRepository::new();
/// # let _ = repository;
/// ```
#[derive(Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Create an empty repository using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create an empty repository stamping entities with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, mut user: User) -> Result<User, UserRepositoryError> {
        let mut store = self.store.write().await;
        if store.users.contains_key(user.id()) {
            return Err(UserRepositoryError::already_exists(user.id().as_str()));
        }
        if let Some(field) = store.collision(&user) {
            return Err(UserRepositoryError::conflict(field));
        }

        let now = self.clock.utc();
        user.stamp(now, now);
        store.index(&user);
        store.insertion_order.push(user.id().clone());
        store.users.insert(user.id().clone(), user.clone());
        debug!(user_id = %user.id(), "user stored");
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, UserRepositoryError> {
        let store = self.store.read().await;
        store.lookup(Some(id), id.as_str())
    }

    async fn find_by_username(&self, username: &Username) -> Result<User, UserRepositoryError> {
        let store = self.store.read().await;
        store.lookup(store.by_username.get(username), username.as_str())
    }

    async fn find_by_email(&self, email: &Email) -> Result<User, UserRepositoryError> {
        let store = self.store.read().await;
        store.lookup(store.by_email.get(email), email.as_str())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .insertion_order
            .iter()
            .filter_map(|id| store.users.get(id))
            .cloned()
            .collect())
    }

    async fn update(&self, mut user: User) -> Result<User, UserRepositoryError> {
        let mut store = self.store.write().await;
        let Some(previous) = store.users.get(user.id()).cloned() else {
            return Err(UserRepositoryError::not_found(user.id().as_str()));
        };
        if let Some(field) = store.collision(&user) {
            return Err(UserRepositoryError::conflict(field));
        }

        user.stamp(previous.created_at(), self.clock.utc());
        store.unindex(&previous);
        store.index(&user);
        store.users.insert(user.id().clone(), user.clone());
        debug!(user_id = %user.id(), "user updated");
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let mut store = self.store.write().await;
        let Some(removed) = store.users.remove(id) else {
            return Err(UserRepositoryError::not_found(id.as_str()));
        };
        store.unindex(&removed);
        store.insertion_order.retain(|existing| existing != id);
        debug!(user_id = %id, "user deleted");
        Ok(())
    }
}
