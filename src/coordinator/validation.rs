//! Credential checks before a successful sign in is reported.

use error_stack::{IntoReport, Result, ResultExt};

use crate::{
    platform::IdentityCredential,
    token::{self, DecodeError},
    utils::IntoReportExt,
};

use super::channel::SignInSuccess;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential did not contain an identity token")]
    MissingIdentityToken,

    #[error("Identity token was not UTF-8")]
    IdentityTokenNotUtf8,

    #[error("Identity token decoding failed: {0}")]
    Decode(DecodeError),

    #[error("The payload sub claim and the credential user do not match")]
    SubjectMismatch,

    #[error("Credential did not contain an authorization code")]
    MissingAuthorizationCode,

    #[error("Authorization code was not UTF-8")]
    AuthorizationCodeNotUtf8,
}

/// Decode the identity token and check that its subject is the user the
/// platform reported.
pub fn validate_credential(
    credential: &IdentityCredential,
) -> Result<SignInSuccess, CredentialError> {
    let token_data = credential
        .identity_token
        .as_deref()
        .ok_or(CredentialError::MissingIdentityToken)
        .into_report()?;
    let token =
        std::str::from_utf8(token_data).into_error(CredentialError::IdentityTokenNotUtf8)?;

    token::log_header(token);

    let claims = token::decode_payload_segment(token).map_err(|e| {
        let kind = *e.current_context();
        e.change_context(CredentialError::Decode(kind))
    })?;

    let user = match token::subject(&claims) {
        Some(user) if user == credential.user => user,
        Some(_) => {
            return Err(CredentialError::SubjectMismatch).into_report();
        }
        None => {
            return Err(CredentialError::SubjectMismatch)
                .into_report()
                .attach_printable("sub claim missing");
        }
    };

    let code_data = credential
        .authorization_code
        .as_deref()
        .ok_or(CredentialError::MissingAuthorizationCode)
        .into_report()?;
    let auth_code =
        std::str::from_utf8(code_data).into_error(CredentialError::AuthorizationCodeNotUtf8)?;

    Ok(SignInSuccess {
        token: token.to_string(),
        auth_code: auth_code.to_string(),
        user: user.to_string(),
    })
}
