use log::{debug, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::domain::{ExternalId, Repository, User, UserId};

/// An authenticated caller. Whether they are an admin is decided per request
/// by an [`AdminRegistry`] and never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(rename = "id")]
    pub internal_id: UserId,
    #[serde(rename = "externalId")]
    pub external_id: ExternalId,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            internal_id: user.id,
            external_id: user.external_id.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Error authenticating with the identity provider: {0}")]
    Unauthorized(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Local user records.
pub trait UserDirectory {
    /// Finds the user a locally issued session token belongs to.
    fn find_by_session(&self, token: &str) -> Option<User>;

    fn find_by_external_id(&self, external_id: &ExternalId) -> Option<User>;
}

/// Maps an opaque API credential to the caller's stable external id.
pub trait IdentityProvider {
    fn lookup(&self, credential: &str) -> Result<ExternalId, ProviderError>;
}

pub trait AdminRegistry {
    fn is_admin(&self, external_id: &ExternalId) -> bool;
}

/// Outcome of a single identity lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Identity),
    NotFound,
    /// The provider rejected or could not check the credential. Callers treat
    /// this the same as `NotFound`.
    UpstreamAuthFailure(ProviderError),
}

impl Resolution {
    pub fn identity(self) -> Option<Identity> {
        match self {
            Resolution::Resolved(identity) => Some(identity),
            Resolution::NotFound | Resolution::UpstreamAuthFailure(_) => None,
        }
    }
}

pub struct IdentityResolver<'a> {
    users: &'a dyn UserDirectory,
    provider: &'a dyn IdentityProvider,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(users: &'a dyn UserDirectory, provider: &'a dyn IdentityProvider) -> Self {
        IdentityResolver { users, provider }
    }

    pub fn resolve_by_session(&self, session_token: Option<&str>) -> Resolution {
        let Some(token) = session_token else {
            return Resolution::NotFound;
        };
        match self.users.find_by_session(token) {
            Some(user) => Resolution::Resolved(Identity::from(&user)),
            None => Resolution::NotFound,
        }
    }

    pub fn resolve_by_credential(&self, credential: Option<&str>) -> Resolution {
        let Some(credential) = credential else {
            return Resolution::NotFound;
        };
        let external_id = match self.provider.lookup(credential) {
            Ok(external_id) => external_id,
            Err(err) => {
                warn!("Treating credential as unauthenticated: {}", err);
                return Resolution::UpstreamAuthFailure(err);
            }
        };
        match self.users.find_by_external_id(&external_id) {
            Some(user) => Resolution::Resolved(Identity::from(&user)),
            None => {
                debug!("No local user for external id {}", external_id);
                Resolution::NotFound
            }
        }
    }
}

impl UserDirectory for Repository {
    /// Only tokens from [`Repository::issue_session`] resolve.
    fn find_by_session(&self, token: &str) -> Option<User> {
        self.session_user(token).cloned()
    }

    fn find_by_external_id(&self, external_id: &ExternalId) -> Option<User> {
        self.users
            .values()
            .find(|user| &user.external_id == external_id)
            .cloned()
    }
}

fn lock_users(users: &Mutex<Repository>) -> MutexGuard<'_, Repository> {
    // lookups are read-only, so a poisoned lock still holds usable records
    users.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared repository. Each lookup takes the lock only for the lookup itself.
impl UserDirectory for Mutex<Repository> {
    fn find_by_session(&self, token: &str) -> Option<User> {
        lock_users(self).find_by_session(token)
    }

    fn find_by_external_id(&self, external_id: &ExternalId) -> Option<User> {
        lock_users(self).find_by_external_id(external_id)
    }
}

/// A fixed table of API keys, for deployments without a live provider.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    keys: HashMap<String, ExternalId>,
}

impl StaticIdentityProvider {
    pub fn new(keys: HashMap<String, ExternalId>) -> Self {
        StaticIdentityProvider { keys }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn lookup(&self, credential: &str) -> Result<ExternalId, ProviderError> {
        self.keys
            .get(credential)
            .cloned()
            .ok_or_else(|| ProviderError::Unauthorized("Bad credentials".to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminList {
    external_ids: HashSet<ExternalId>,
}

impl AdminList {
    pub fn new<I: IntoIterator<Item = ExternalId>>(external_ids: I) -> Self {
        AdminList {
            external_ids: external_ids.into_iter().collect(),
        }
    }
}

impl AdminRegistry for AdminList {
    fn is_admin(&self, external_id: &ExternalId) -> bool {
        self.external_ids.contains(external_id)
    }
}
