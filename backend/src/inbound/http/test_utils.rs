//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use mockable::DefaultClock;

use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::outbound::memory::InMemorySessionStore;

/// Build a session middleware configured for tests.
///
/// - Keeps session state in a fresh in-memory store.
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<InMemorySessionStore> {
    let store = InMemorySessionStore::new(Arc::new(DefaultClock));
    SessionMiddleware::builder(store, Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set on `response`.
///
/// # Panics
///
/// Panics when the response sets no session cookie.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
