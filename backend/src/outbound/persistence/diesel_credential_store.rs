//! PostgreSQL-backed `CredentialStore` implementation using Diesel ORM.
//!
//! Uniqueness is enforced by the table's unique constraints. Inserts use
//! `ON CONFLICT DO NOTHING`, so a losing racer sees zero affected rows and
//! gets [`CredentialStoreError::Duplicate`] rather than a driver error.
//! Password replacement is a single conditional `UPDATE`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{CredentialStore, CredentialStoreError, IdentityField};
use crate::domain::{EmailAddress, FederatedId, PasswordHash, User, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`CredentialStore`] port.
#[derive(Clone)]
pub struct DieselCredentialStore {
    pool: DbPool,
}

impl DieselCredentialStore {
    /// Create a store over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<User, CredentialStoreError> {
    let id = row.id;
    User::try_from(row).map_err(|err| {
        warn!(user_id = %id, error = %err, "stored user record failed validation");
        CredentialStoreError::query(format!("stored user record is invalid: {err}"))
    })
}

fn optional_user(row: Option<UserRow>) -> Result<Option<User>, CredentialStoreError> {
    row.map(row_to_user).transpose()
}

/// Work out which unique attribute made an insert a no-op.
async fn resolve_collision(
    conn: &mut AsyncPgConnection,
    user: &User,
) -> Result<IdentityField, CredentialStoreError> {
    if let Some(federated_id) = user.federated_id() {
        let taken = users::table
            .filter(users::federated_id.eq(federated_id.as_ref()))
            .select(users::id)
            .first::<Uuid>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if taken.is_some() {
            return Ok(IdentityField::FederatedId);
        }
    }
    if let Some(email) = user.email() {
        let taken = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(users::id)
            .first::<Uuid>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if taken.is_some() {
            return Ok(IdentityField::Email);
        }
    }
    let taken = users::table
        .filter(users::id.eq(*user.id().as_uuid()))
        .select(users::id)
        .first::<Uuid>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    match taken {
        Some(_) => Ok(IdentityField::Id),
        None => Err(CredentialStoreError::query(
            "insert conflicted with a row that no longer exists",
        )),
    }
}

#[async_trait]
impl CredentialStore for DieselCredentialStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(*id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        optional_user(row)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        optional_user(row)
    }

    async fn find_by_federated_id(
        &self,
        federated_id: &FederatedId,
    ) -> Result<Option<User>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::federated_id.eq(federated_id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        optional_user(row)
    }

    async fn insert(&self, user: &User) -> Result<(), CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if inserted == 0 {
            let field = resolve_collision(&mut conn, user).await?;
            return Err(CredentialStoreError::duplicate(field));
        }
        Ok(())
    }

    async fn replace_password_hash(
        &self,
        id: &UserId,
        expected: Option<PasswordHash>,
        replacement: PasswordHash,
    ) -> Result<(), CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = users::table.filter(users::id.eq(*id.as_uuid()));
        let new_hash = users::password_hash.eq(replacement.as_encoded());

        let updated = match &expected {
            Some(current) => {
                diesel::update(target.filter(users::password_hash.eq(current.as_encoded())))
                    .set(new_hash)
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(target.filter(users::password_hash.is_null()))
                    .set(new_hash)
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(CredentialStoreError::stale(*id));
        }
        Ok(())
    }
}
