//! Shared harness for HTTP integration tests.
//!
//! Assembles the same routes and middleware as the server binary over
//! in-memory credential and session stores, a cheap bcrypt cost and a
//! scripted identity provider.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use mockable::DefaultClock;
use url::Url;

use travel_auth::Trace;
use travel_auth::domain::ports::{IdentityProviderClient, IdentityProviderError};
use travel_auth::domain::{
    AccessGate, AccountService, AuthorizationCode, DisplayName, EmailAddress, FederatedId,
    FederatedIdentityVerifier, FederatedLoginFlow, FederatedProfile, LocalCredentialVerifier,
    OAuthState, SessionIdentityManager,
};
use travel_auth::inbound::http::access::RequireSession;
use travel_auth::inbound::http::accounts::{reset_password, signup};
use travel_auth::inbound::http::federated::{google_callback, google_login};
use travel_auth::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use travel_auth::inbound::http::state::{HttpState, HttpStatePorts};
use travel_auth::inbound::http::users::{current_user, login, logout};
use travel_auth::outbound::crypto::BcryptPasswordHasher;
use travel_auth::outbound::memory::{InMemoryCredentialStore, InMemorySessionStore};

pub const LOGIN_PATH: &str = "/login";
const TEST_BCRYPT_COST: u32 = 4;

/// Identity provider returning canned profiles keyed by authorisation code.
#[derive(Default)]
pub struct ScriptedProvider {
    profiles: HashMap<String, FederatedProfile>,
}

impl ScriptedProvider {
    pub fn with_profile(mut self, code: &str, profile: FederatedProfile) -> Self {
        self.profiles.insert(code.to_owned(), profile);
        self
    }
}

#[async_trait]
impl IdentityProviderClient for ScriptedProvider {
    fn authorization_url(&self, state: &OAuthState) -> Url {
        let mut url = Url::parse("https://idp.test/authorize").expect("static url");
        url.query_pairs_mut().append_pair("state", state.as_str());
        url
    }

    async fn exchange(
        &self,
        code: &AuthorizationCode,
    ) -> Result<FederatedProfile, IdentityProviderError> {
        self.profiles
            .get(code.expose())
            .cloned()
            .ok_or_else(|| IdentityProviderError::rejected("unknown code"))
    }
}

pub fn profile(subject: &str, name: &str, email: Option<&str>) -> FederatedProfile {
    FederatedProfile {
        federated_id: FederatedId::new(subject).expect("subject"),
        display_name: DisplayName::new(name).expect("name"),
        email: email.map(|e| EmailAddress::new(e).expect("email")),
        thumbnail: None,
    }
}

/// Store, provider and handler state for one test.
pub struct Harness {
    pub store: Arc<InMemoryCredentialStore>,
    pub session_store: InMemorySessionStore,
    pub state: HttpState,
    session: SessionSettings,
}

impl Harness {
    pub fn new(provider: Option<ScriptedProvider>) -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let hasher = Arc::new(BcryptPasswordHasher::new(TEST_BCRYPT_COST).expect("cost"));
        let accounts = Arc::new(AccountService::new(store.clone(), hasher.clone()));
        let state = HttpState::new(HttpStatePorts {
            login: Arc::new(LocalCredentialVerifier::new(store.clone(), hasher)),
            registration: accounts.clone(),
            password_reset: accounts,
            sessions: Arc::new(SessionIdentityManager::new(store.clone())),
        });
        let state = match provider {
            Some(provider) => state.with_federated(Arc::new(FederatedLoginFlow::new(
                Arc::new(provider),
                FederatedIdentityVerifier::new(store.clone()),
            ))),
            None => state,
        };
        let session = SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            ttl: Duration::hours(2),
        };
        Self {
            store,
            session_store: InMemorySessionStore::new(Arc::new(DefaultClock)),
            state,
            session,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let gate = AccessGate::new(Arc::clone(&self.state.sessions));
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(self.session.middleware(self.session_store.clone()))
            .wrap(Trace)
            .service(google_login)
            .service(google_callback)
            .service(
                web::scope("/api/v1")
                    .service(signup)
                    .service(reset_password)
                    .service(login)
                    .service(logout)
                    .service(
                        web::resource("/me")
                            .wrap(RequireSession::new(gate, LOGIN_PATH))
                            .route(web::get().to(current_user)),
                    ),
            )
    }
}

/// Session cookie set on `response`, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}
