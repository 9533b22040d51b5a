//! `DieselCredentialStore` against embedded PostgreSQL.
//!
//! Covers what the in-memory store cannot: the unique constraints behind
//! `ON CONFLICT DO NOTHING`, the conditional `UPDATE` used for password
//! replacement and the table's credential `CHECK` constraint.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::error::SqlState;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use travel_auth::domain::ports::{CredentialStore, CredentialStoreError, IdentityField};
use travel_auth::domain::{
    DisplayName, EmailAddress, FederatedId, PasswordHash, User, UserId,
};
use travel_auth::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig};
use uuid::Uuid;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{handle_cluster_setup_failure, provision_database, raw_client};

struct StoreContext {
    runtime: Runtime,
    store: DieselCredentialStore,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_store() -> Result<StoreContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_database()?;
    let database_url = database.url().to_string();
    let config = PoolConfig::new(&database_url).with_max_size(8);
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    Ok(StoreContext {
        runtime,
        store: DieselCredentialStore::new(pool),
        database_url,
        _database: database,
    })
}

#[fixture]
fn context() -> Option<StoreContext> {
    match setup_store() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn hash(tag: &str) -> PasswordHash {
    PasswordHash::from_encoded(format!("$2b$04${tag}")).expect("hash")
}

fn local_user(email: &str, tag: &str) -> User {
    User::local(
        UserId::random(),
        DisplayName::new("Ada").expect("name"),
        EmailAddress::new(email).expect("email"),
        hash(tag),
    )
}

fn federated_user(subject: &str, email: Option<&str>) -> User {
    User::federated(
        UserId::random(),
        DisplayName::new("Grace").expect("name"),
        FederatedId::new(subject).expect("federated id"),
        email.map(|value| EmailAddress::new(value).expect("email")),
        None,
    )
}

#[rstest]
fn inserted_records_are_found_by_every_key(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let local = local_user("ada@example.com", "ada");
    let federated = federated_user("google-1", Some("grace@example.com"));

    ctx.runtime.block_on(async {
        ctx.store.insert(&local).await.expect("insert local");
        ctx.store.insert(&federated).await.expect("insert federated");

        let by_id = ctx.store.find_by_id(local.id()).await.expect("by id");
        assert_eq!(by_id.as_ref(), Some(&local));
        let by_email = ctx
            .store
            .find_by_email(&EmailAddress::new("grace@example.com").expect("email"))
            .await
            .expect("by email");
        assert_eq!(by_email.as_ref(), Some(&federated));
        let by_subject = ctx
            .store
            .find_by_federated_id(&FederatedId::new("google-1").expect("federated id"))
            .await
            .expect("by federated id");
        assert_eq!(by_subject, Some(federated));
        let missing = ctx.store.find_by_id(&UserId::random()).await.expect("lookup");
        assert_eq!(missing, None);
    });
}

#[rstest]
fn duplicate_email_is_reported_and_leaves_the_record_alone(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let original = local_user("ada@example.com", "first");
    let impostor = local_user("ada@example.com", "second");

    ctx.runtime.block_on(async {
        ctx.store.insert(&original).await.expect("insert");
        let err = ctx.store.insert(&impostor).await.expect_err("duplicate");
        assert_eq!(err, CredentialStoreError::duplicate(IdentityField::Email));

        let stored = ctx
            .store
            .find_by_email(&EmailAddress::new("ada@example.com").expect("email"))
            .await
            .expect("lookup")
            .expect("record");
        assert_eq!(stored, original);
        assert_eq!(ctx.store.find_by_id(impostor.id()).await.expect("lookup"), None);
    });
}

#[rstest]
fn duplicate_federated_id_is_reported(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let first = federated_user("google-2", None);
    let second = federated_user("google-2", Some("other@example.com"));

    ctx.runtime.block_on(async {
        ctx.store.insert(&first).await.expect("insert");
        let err = ctx.store.insert(&second).await.expect_err("duplicate");
        assert_eq!(err, CredentialStoreError::duplicate(IdentityField::FederatedId));
    });
}

#[rstest]
fn reused_id_is_reported(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let first = local_user("ada@example.com", "ada");
    let clash = User::federated(
        *first.id(),
        DisplayName::new("Grace").expect("name"),
        FederatedId::new("google-3").expect("federated id"),
        None,
        None,
    );

    ctx.runtime.block_on(async {
        ctx.store.insert(&first).await.expect("insert");
        let err = ctx.store.insert(&clash).await.expect_err("duplicate");
        assert_eq!(err, CredentialStoreError::duplicate(IdentityField::Id));
    });
}

#[rstest]
fn concurrent_inserts_of_one_subject_store_exactly_one(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };

    let outcomes = ctx.runtime.block_on(async {
        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let store = ctx.store.clone();
                tokio::spawn(async move {
                    store
                        .insert(&federated_user("google-race", None))
                        .await
                })
            })
            .collect();
        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.expect("task"));
        }
        outcomes
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    for outcome in outcomes.into_iter().filter_map(Result::err) {
        assert_eq!(
            outcome,
            CredentialStoreError::duplicate(IdentityField::FederatedId)
        );
    }
}

#[rstest]
fn password_replacement_requires_the_expected_hash(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let user = local_user("ada@example.com", "v1");

    ctx.runtime.block_on(async {
        ctx.store.insert(&user).await.expect("insert");

        ctx.store
            .replace_password_hash(user.id(), Some(hash("v1")), hash("v2"))
            .await
            .expect("matching hash");
        let err = ctx
            .store
            .replace_password_hash(user.id(), Some(hash("v1")), hash("v3"))
            .await
            .expect_err("stale hash");
        assert_eq!(err, CredentialStoreError::stale(*user.id()));
        let err = ctx
            .store
            .replace_password_hash(user.id(), None, hash("v3"))
            .await
            .expect_err("record already has a password");
        assert_eq!(err, CredentialStoreError::stale(*user.id()));

        let stored = ctx
            .store
            .find_by_id(user.id())
            .await
            .expect("lookup")
            .expect("record");
        assert_eq!(stored.password_hash(), Some(&hash("v2")));
    });
}

#[rstest]
fn first_password_for_a_federated_record_matches_a_null_hash(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let user = federated_user("google-4", Some("grace@example.com"));

    ctx.runtime.block_on(async {
        ctx.store.insert(&user).await.expect("insert");
        ctx.store
            .replace_password_hash(user.id(), None, hash("first"))
            .await
            .expect("null hash matches");

        let stored = ctx
            .store
            .find_by_id(user.id())
            .await
            .expect("lookup")
            .expect("record");
        assert_eq!(stored.password_hash(), Some(&hash("first")));
        assert_eq!(stored.federated_id(), user.federated_id());
    });
}

#[rstest]
fn replacing_the_password_of_a_missing_record_is_stale(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let id = UserId::random();

    let err = ctx
        .runtime
        .block_on(ctx.store.replace_password_hash(&id, None, hash("x")))
        .expect_err("no record");
    assert_eq!(err, CredentialStoreError::stale(id));
}

#[rstest]
fn table_rejects_a_record_without_any_credential(context: Option<StoreContext>) {
    let Some(ctx) = context else { return };
    let mut client = raw_client(&ctx.database_url).expect("raw connection");

    let err = client
        .execute(
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3)",
            &[&Uuid::new_v4(), &"Nobody", &"nobody@example.com"],
        )
        .expect_err("check constraint");
    assert_eq!(err.code(), Some(&SqlState::CHECK_VIOLATION));
}
