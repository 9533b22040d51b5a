//! Google login against a scripted identity provider.

mod support;

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::{Value, json};
use travel_auth::domain::ports::{CredentialStore, FederatedLoginService};
use travel_auth::domain::{
    AuthorizationCode, FederatedId, FederatedIdentityVerifier, FederatedLoginFlow,
};
use travel_auth::outbound::memory::InMemoryCredentialStore;
use url::Url;

use support::{Harness, ScriptedProvider, profile, session_cookie};

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("location header")
}

fn state_param(location: &str) -> String {
    Url::parse(location)
        .expect("absolute url")
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter")
}

/// Drive the redirect and callback; returns the callback response.
macro_rules! google_round_trip {
    ($app:expr, $code:expr) => {{
        let res = test::call_service(
            &$app,
            test::TestRequest::get().uri("/auth/google").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        let oauth_state = state_param(&location(&res));
        let cookie = session_cookie(&res).expect("state cookie");
        test::call_service(
            &$app,
            test::TestRequest::get()
                .uri(&format!(
                    "/auth/google/redirect?code={}&state={oauth_state}",
                    $code
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await
    }};
}

#[actix_web::test]
async fn repeated_logins_reuse_one_account() {
    let provider = ScriptedProvider::default()
        .with_profile("code-1", profile("google-123", "Grace Hopper", Some("grace@example.com")))
        .with_profile("code-2", profile("google-123", "Grace H.", Some("grace@example.com")));
    let harness = Harness::new(Some(provider));
    let app = test::init_service(harness.app()).await;

    let mut ids = Vec::new();
    for code in ["code-1", "code-2"] {
        let res = google_round_trip!(app, code);
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/");
        let cookie = session_cookie(&res).expect("session cookie");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["federated"], true);
        assert_eq!(body["hasPassword"], false);
        assert_eq!(body["name"], "Grace Hopper", "existing record is returned unchanged");
        ids.push(body["id"].clone());
    }

    assert_eq!(ids[0], ids[1]);
    assert_eq!(harness.store.len(), 1);
}

#[actix_web::test]
async fn email_owned_by_a_local_account_is_a_conflict() {
    let provider = ScriptedProvider::default()
        .with_profile("code", profile("google-9", "Ada", Some("ada@example.com")));
    let harness = Harness::new(Some(provider));
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({"name": "Ada", "email": "ada@example.com", "password": "pw"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = google_round_trip!(app, "code");
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(harness.store.len(), 1);
    let orphan = harness
        .store
        .find_by_federated_id(&FederatedId::new("google-9").expect("fid"))
        .await
        .expect("store");
    assert!(orphan.is_none());
}

#[actix_web::test]
async fn rejected_code_creates_nothing() {
    let harness = Harness::new(Some(ScriptedProvider::default()));
    let app = test::init_service(harness.app()).await;

    let res = google_round_trip!(app, "forged-code");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(harness.store.is_empty());
}

#[actix_web::test]
async fn federated_routes_are_absent_without_a_provider() {
    let harness = Harness::new(None);
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/google").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_first_logins_converge_on_one_record() {
    let store = Arc::new(InMemoryCredentialStore::new());
    let provider =
        ScriptedProvider::default().with_profile("code", profile("google-race", "Racer", None));
    let flow = Arc::new(FederatedLoginFlow::new(
        Arc::new(provider),
        FederatedIdentityVerifier::new(store.clone()),
    ));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let flow = Arc::clone(&flow);
            tokio::spawn(async move {
                let code = AuthorizationCode::new("code").expect("code");
                flow.complete(&code).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        let user = task.await.expect("task").expect("login");
        ids.push(*user.id());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(store.len(), 1);
}
