use log::debug;

use crate::domain::AuthError;
use super::identity::{AdminRegistry, Identity, IdentityResolver};

/// How the caller expects to be answered, taken from the requested response
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// A person in a browser; failures become redirects.
    Browser,
    /// An API client presenting a credential; failures are hard errors.
    Programmatic,
}

impl RequestMode {
    /// Any JSON media type in the `Accept` header selects programmatic mode.
    /// Everything else, including no header at all, is a browser.
    pub fn from_accept(accept: Option<&str>) -> Self {
        let is_json = accept
            .map(|accept| {
                accept
                    .split(',')
                    .map(|media| media.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
                    .any(|media| media == "application/json" || media == "text/x-json" || media.ends_with("+json"))
            })
            .unwrap_or(false);
        if is_json {
            RequestMode::Programmatic
        } else {
            RequestMode::Browser
        }
    }
}

/// What a request presented. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub session_token: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Identified(Identity),
    /// Browser caller without a session. Send them to log in.
    MustRedirect,
}

/// An identity that passed the admin check for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin(pub Identity);

pub struct AuthorizationGate<'a> {
    resolver: IdentityResolver<'a>,
    admins: &'a dyn AdminRegistry,
}

impl<'a> AuthorizationGate<'a> {
    pub fn new(resolver: IdentityResolver<'a>, admins: &'a dyn AdminRegistry) -> Self {
        AuthorizationGate { resolver, admins }
    }

    /// Browser entry point. A missing session is not an error.
    pub fn require_session(&self, session_token: Option<&str>) -> Authentication {
        match self.resolver.resolve_by_session(session_token).identity() {
            Some(identity) => Authentication::Identified(identity),
            None => Authentication::MustRedirect,
        }
    }

    /// Programmatic entry point. API clients cannot be redirected, so a
    /// missing identity is `UserNotFound`.
    pub fn require_credential(&self, api_key: Option<&str>) -> Result<Identity, AuthError> {
        self.resolver
            .resolve_by_credential(api_key)
            .identity()
            .ok_or(AuthError::UserNotFound)
    }

    pub fn require_authenticated(&self, mode: RequestMode, credentials: &Credentials) -> Result<Authentication, AuthError> {
        match mode {
            RequestMode::Browser => Ok(self.require_session(credentials.session_token.as_deref())),
            RequestMode::Programmatic => self
                .require_credential(credentials.api_key.as_deref())
                .map(Authentication::Identified),
        }
    }

    /// Admin checks never tolerate anonymous callers, in either mode, and the
    /// admin registry is only consulted once the identity is known.
    pub fn require_admin(&self, mode: RequestMode, credentials: &Credentials) -> Result<Admin, AuthError> {
        let identity = match self.require_authenticated(mode, credentials)? {
            Authentication::Identified(identity) => identity,
            Authentication::MustRedirect => return Err(AuthError::UserNotFound),
        };

        if self.admins.is_admin(&identity.external_id) {
            Ok(Admin(identity))
        } else {
            debug!("User {} is not an admin", identity.internal_id);
            Err(AuthError::MustBeAdmin)
        }
    }

    /// Identity for routes that work anonymously but show more to a known
    /// caller. Never fails.
    pub fn current_identity(&self, mode: RequestMode, credentials: &Credentials) -> Option<Identity> {
        let resolution = match mode {
            RequestMode::Browser => self.resolver.resolve_by_session(credentials.session_token.as_deref()),
            RequestMode::Programmatic => self.resolver.resolve_by_credential(credentials.api_key.as_deref()),
        };
        resolution.identity()
    }
}
