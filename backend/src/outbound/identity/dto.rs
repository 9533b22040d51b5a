//! Wire types for the Google OAuth token and OpenID userinfo endpoints.

use serde::Deserialize;

use crate::domain::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, FederatedId, FederatedProfile, Thumbnail,
};

/// Token endpoint response. Only the access token is used.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub access_token: String,
}

/// OpenID Connect userinfo response.
#[derive(Debug, Default, Deserialize)]
pub(super) struct UserInfoDto {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl UserInfoDto {
    /// Map to a domain profile.
    ///
    /// Unverified or malformed emails and unparsable pictures are dropped
    /// rather than failing the login; a missing subject fails it.
    pub(super) fn into_profile(self) -> Result<FederatedProfile, String> {
        let federated_id =
            FederatedId::new(&self.sub).map_err(|err| format!("subject: {err}"))?;

        let email = self
            .email
            .filter(|_| self.email_verified != Some(false))
            .and_then(|raw| EmailAddress::new(raw).ok());

        let display_name = [self.name.as_deref(), self.given_name.as_deref()]
            .into_iter()
            .flatten()
            .chain(email.as_ref().map(|address| address.as_ref()))
            .find_map(|candidate| {
                let clipped: String = candidate.trim().chars().take(DISPLAY_NAME_MAX).collect();
                DisplayName::new(clipped).ok()
            })
            .ok_or_else(|| String::from("profile has no usable display name"))?;

        let thumbnail = self.picture.and_then(|raw| Thumbnail::parse(raw).ok());

        Ok(FederatedProfile {
            federated_id,
            display_name,
            email,
            thumbnail,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for profile mapping.
    use super::*;

    fn decode(json: &str) -> UserInfoDto {
        serde_json::from_str(json).expect("userinfo json")
    }

    #[test]
    fn maps_a_complete_profile() {
        let profile = decode(
            r#"{
                "sub": "10987654321",
                "name": "Grace Hopper",
                "email": "grace@example.com",
                "email_verified": true,
                "picture": "https://lh3.googleusercontent.com/a/photo.jpg"
            }"#,
        )
        .into_profile()
        .expect("profile");

        assert_eq!(profile.federated_id.to_string(), "10987654321");
        assert_eq!(profile.display_name.to_string(), "Grace Hopper");
        assert_eq!(
            profile.email.as_ref().map(ToString::to_string),
            Some(String::from("grace@example.com"))
        );
        assert!(profile.thumbnail.is_some());
    }

    #[test]
    fn unverified_email_is_dropped() {
        let profile = decode(
            r#"{ "sub": "1", "name": "G", "email": "g@example.com", "email_verified": false }"#,
        )
        .into_profile()
        .expect("profile");
        assert!(profile.email.is_none());
    }

    #[test]
    fn falls_back_to_email_for_the_name() {
        let profile = decode(r#"{ "sub": "1", "email": "g@example.com" }"#)
            .into_profile()
            .expect("profile");
        assert_eq!(profile.display_name.to_string(), "g@example.com");
    }

    #[test]
    fn long_names_are_clipped() {
        let long = "n".repeat(DISPLAY_NAME_MAX + 10);
        let profile = UserInfoDto {
            sub: "1".into(),
            name: Some(long),
            ..UserInfoDto::default()
        }
        .into_profile()
        .expect("profile");
        assert_eq!(profile.display_name.to_string().chars().count(), DISPLAY_NAME_MAX);
    }

    #[test]
    fn blank_subject_is_rejected() {
        let err = decode(r#"{ "sub": " ", "name": "G" }"#)
            .into_profile()
            .expect_err("blank subject");
        assert!(err.contains("subject"));
    }

    #[test]
    fn nameless_profile_is_rejected() {
        assert!(decode(r#"{ "sub": "1" }"#).into_profile().is_err());
    }
}
