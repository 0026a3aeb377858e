//! Interface to the platform identity federation API.
//!
//! The platform owns the authorization UI and the actual authentication.
//! This crate only requests it and consumes the result through
//! [CompletionHandle].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::CoordinatorHandle;

/// First platform version which has the federation API.
pub const MINIMUM_PLATFORM_VERSION: PlatformVersion = PlatformVersion::new(13, 0);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Platform version parsing failed: {0}")]
pub struct PlatformVersionParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
}

impl PlatformVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PlatformVersion {
    type Err = PlatformVersionParseError;

    /// Accepts `major`, `major.minor` and `major.minor.patch`. Patch is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || PlatformVersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(error)?;
        let minor = match parts.next() {
            Some(p) => p.parse::<u32>().map_err(|_| error())?,
            None => 0,
        };
        if let Some(patch) = parts.next() {
            patch.parse::<u32>().map_err(|_| error())?;
        }
        if parts.next().is_some() {
            return Err(error());
        }
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for PlatformVersion {
    type Error = PlatformVersionParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlatformVersion> for String {
    fn from(value: PlatformVersion) -> Self {
        value.to_string()
    }
}

/// Credential which the platform returns after successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCredential {
    /// Signed identity token (compact JWS) as raw bytes.
    pub identity_token: Option<Vec<u8>>,
    /// Short lived authorization code as raw bytes.
    pub authorization_code: Option<Vec<u8>>,
    /// Stable user identifier. The `sub` claim of the token must match this.
    pub user: String,
}

impl IdentityCredential {
    pub fn new(
        identity_token: impl Into<Vec<u8>>,
        authorization_code: impl Into<Vec<u8>>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            identity_token: Some(identity_token.into()),
            authorization_code: Some(authorization_code.into()),
            user: user.into(),
        }
    }
}

/// Authorization error codes of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformErrorCode {
    /// User canceled the authorization.
    Canceled,
    Failed,
    InvalidResponse,
    NotHandled,
    NotInteractive,
    Unknown,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Platform authorization error {code:?}: {message}")]
pub struct PlatformError {
    pub code: PlatformErrorCode,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: PlatformErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.code == PlatformErrorCode::Canceled
    }
}

/// Platform authorization request for the user's name and email scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub id: Uuid,
    pub scopes: Vec<AuthorizationScope>,
}

impl AuthorizationRequest {
    pub fn new(scopes: Vec<AuthorizationScope>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scopes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationScope {
    FullName,
    Email,
}

/// Window or view which hosts the platform consent UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationAnchor;

pub trait PresentationAnchorProvider: Send + Sync {
    fn presentation_anchor(&self, request: &AuthorizationRequest) -> PresentationAnchor;
}

/// Provides the default anchor for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAnchorProvider;

impl PresentationAnchorProvider for DefaultAnchorProvider {
    fn presentation_anchor(&self, _request: &AuthorizationRequest) -> PresentationAnchor {
        PresentationAnchor
    }
}

/// Platform identity federation API.
pub trait AuthorizationPlatform: Send + Sync {
    fn os_version(&self) -> PlatformVersion;

    fn create_authorization_request(&self) -> AuthorizationRequest {
        AuthorizationRequest::new(vec![AuthorizationScope::FullName, AuthorizationScope::Email])
    }

    /// Start the authorization flow. Returns immediately. The platform must
    /// later consume `completion` with either [CompletionHandle::succeed] or
    /// [CompletionHandle::fail], from any thread.
    fn perform_request(
        &self,
        request: AuthorizationRequest,
        anchor: &dyn PresentationAnchorProvider,
        completion: CompletionHandle,
    );
}

/// One-shot entry point back to the coordinator which started the request.
/// Consuming the handle makes a second result for the same request
/// impossible.
#[derive(Debug)]
pub struct CompletionHandle {
    request: AuthorizationRequest,
    coordinator: CoordinatorHandle,
}

impl CompletionHandle {
    pub(crate) fn new(request: AuthorizationRequest, coordinator: CoordinatorHandle) -> Self {
        Self {
            request,
            coordinator,
        }
    }

    pub fn request(&self) -> &AuthorizationRequest {
        &self.request
    }

    pub fn succeed(self, credential: IdentityCredential) {
        self.coordinator
            .on_platform_success(&self.request, credential)
    }

    pub fn fail(self, error: PlatformError) {
        self.coordinator.on_platform_error(&self.request, error)
    }
}
