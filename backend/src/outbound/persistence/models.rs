//! Internal Diesel row structs for the `users` table.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    DisplayName, EmailAddress, FederatedId, PasswordHash, Thumbnail, User, UserId, UserParts,
    UserValidationError,
};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub federated_id: Option<String>,
    pub thumbnail: Option<String>,
    #[expect(dead_code, reason = "selected for audit queries run by hand")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "selected for audit queries run by hand")]
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        User::from_parts(UserParts {
            id: UserId::from_uuid(row.id),
            name: DisplayName::new(row.name)?,
            email: row.email.map(EmailAddress::new).transpose()?,
            password_hash: row.password_hash.map(PasswordHash::from_encoded).transpose()?,
            federated_id: row.federated_id.map(FederatedId::new).transpose()?,
            thumbnail: row.thumbnail.map(Thumbnail::parse).transpose()?,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub federated_id: Option<&'a str>,
    pub thumbnail: Option<&'a str>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().map(|email| email.as_ref()),
            password_hash: user.password_hash().map(PasswordHash::as_encoded),
            federated_id: user.federated_id().map(|id| id.as_ref()),
            thumbnail: user.thumbnail().map(|thumb| thumb.as_url().as_str()),
        }
    }
}
