//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers only deal with session tokens and
//! OAuth state values. The session holds the token issued by the session
//! identity manager (the user id) and, during a federated login, the pending
//! OAuth `state`.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::SessionToken;
use crate::domain::{Error, OAuthState};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const OAUTH_STATE_KEY: &str = "oauth_state";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the session to `token`.
    ///
    /// The session is renewed first so a cookie issued before login cannot
    /// be replayed as the authenticated one.
    pub fn establish(&self, token: &SessionToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, token.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Token stored by a previous login, if any.
    pub fn token(&self) -> Result<Option<SessionToken>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.map(SessionToken::from_raw))
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Remember the OAuth `state` sent to the identity provider.
    pub fn store_oauth_state(&self, state: &OAuthState) -> Result<(), Error> {
        self.0
            .insert(OAUTH_STATE_KEY, state.as_str())
            .map_err(|error| Error::internal(format!("failed to persist oauth state: {error}")))
    }

    /// Remove and return the pending OAuth `state`.
    ///
    /// The value is single use: a second callback with the same state finds
    /// nothing.
    pub fn take_oauth_state(&self) -> Option<OAuthState> {
        match self.0.remove_as::<String>(OAUTH_STATE_KEY)? {
            Ok(raw) => Some(OAuthState::from_raw(raw)),
            Err(raw) => {
                warn!(length = raw.len(), "undecodable oauth state in session cookie");
                None
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
