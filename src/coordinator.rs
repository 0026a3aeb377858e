//! Sign in attempt coordination.
//!
//! [SignInCoordinator] starts platform authorization requests and routes
//! the single outcome of an attempt to the notification channel which is
//! registered when the platform reports back.

pub mod channel;
pub mod validation;

use std::{
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::platform::{
    AuthorizationPlatform, AuthorizationRequest, CompletionHandle, DefaultAnchorProvider,
    IdentityCredential, PlatformError, PlatformVersion, PresentationAnchorProvider,
    MINIMUM_PLATFORM_VERSION,
};

use self::{
    channel::{NotificationChannel, SignInDelegate, SignInFailure, SignInOutcome, SignInSuccess},
    validation::{validate_credential, CredentialError},
};

pub const DROPPED_ATTEMPT_CHANNEL_BUFFER: usize = 16;

/// Why an attempt ended without notifying anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Credential(CredentialError),
    /// No channel was registered, or it was already used or reset.
    NoChannel,
    /// The delegate was dropped before the outcome was ready.
    DelegateGone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedAttempt {
    /// ID of the [AuthorizationRequest] which the platform completed.
    pub request: Uuid,
    pub reason: DropReason,
}

#[derive(Debug, Default)]
struct CurrentAttempt {
    channel: Option<NotificationChannel>,
    request: Option<AuthorizationRequest>,
}

struct CoordinatorState {
    platform: Arc<dyn AuthorizationPlatform>,
    anchor_provider: Arc<dyn PresentationAnchorProvider>,
    minimum_version: PlatformVersion,
    current: Mutex<CurrentAttempt>,
    dropped_attempts: broadcast::Sender<DroppedAttempt>,
}

impl CoordinatorState {
    fn on_platform_success(&self, request: &AuthorizationRequest, credential: IdentityCredential) {
        match validate_credential(&credential) {
            Ok(success) => {
                info!("sign in request {} succeeded", request.id);
                self.dispatch(request, SignInOutcome::Success(success))
            }
            Err(e) => {
                let reason = *e.current_context();
                if reason == CredentialError::SubjectMismatch {
                    warn!("sign in request {} dropped: {:?}", request.id, e);
                } else {
                    error!("sign in request {} dropped: {:?}", request.id, e);
                }
                self.publish_drop(request, DropReason::Credential(reason));
            }
        }
    }

    fn on_platform_error(&self, request: &AuthorizationRequest, error: PlatformError) {
        let failure = if error.is_canceled() {
            info!("sign in request {} canceled", request.id);
            SignInFailure::Canceled
        } else {
            error!("sign in request {} failed: {}", request.id, error);
            SignInFailure::Other(error)
        };
        self.dispatch(request, SignInOutcome::Failure(failure))
    }

    fn dispatch(&self, request: &AuthorizationRequest, outcome: SignInOutcome) {
        let channel = {
            let mut current = self.current.lock();
            if let Some(latest) = current.request.as_ref() {
                if latest.id != request.id {
                    warn!(
                        "result of request {} is delivered to the channel of newer request {}",
                        request.id, latest.id
                    );
                }
            }
            current.channel.take()
        };

        // Lock is released, so channel code can start a new request.
        match channel {
            None => {
                debug!("no notification channel for request {}", request.id);
                self.publish_drop(request, DropReason::NoChannel);
            }
            Some(channel) => {
                if channel.dispatch(outcome).is_err() {
                    debug!("delegate of request {} is gone", request.id);
                    self.publish_drop(request, DropReason::DelegateGone);
                }
            }
        }
    }

    fn publish_drop(&self, request: &AuthorizationRequest, reason: DropReason) {
        // Error only means that nobody is listening.
        let _ = self.dropped_attempts.send(DroppedAttempt {
            request: request.id,
            reason,
        });
    }
}

/// Non-owning reference to the coordinator, given to the platform with
/// every request. Results which arrive after the coordinator is dropped
/// are ignored.
#[derive(Clone)]
pub struct CoordinatorHandle {
    state: Weak<CoordinatorState>,
}

impl CoordinatorHandle {
    pub(crate) fn on_platform_success(
        &self,
        request: &AuthorizationRequest,
        credential: IdentityCredential,
    ) {
        match self.state.upgrade() {
            Some(state) => state.on_platform_success(request, credential),
            None => debug!("coordinator dropped before request {} completed", request.id),
        }
    }

    pub(crate) fn on_platform_error(&self, request: &AuthorizationRequest, error: PlatformError) {
        match self.state.upgrade() {
            Some(state) => state.on_platform_error(request, error),
            None => debug!("coordinator dropped before request {} failed", request.id),
        }
    }
}

impl fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("alive", &(self.state.strong_count() > 0))
            .finish()
    }
}

/// Starts sign in requests and delivers their outcomes.
///
/// At most one notification channel is registered at a time. Starting a new
/// request replaces the channel without canceling the previous platform
/// request, so the next platform result goes to the newest channel. Every
/// channel is used at most once.
#[derive(Clone)]
pub struct SignInCoordinator {
    state: Arc<CoordinatorState>,
}

impl SignInCoordinator {
    pub fn new(platform: Arc<dyn AuthorizationPlatform>) -> Self {
        Self::builder(platform).build()
    }

    pub fn builder(platform: Arc<dyn AuthorizationPlatform>) -> CoordinatorBuilder {
        CoordinatorBuilder {
            platform,
            anchor_provider: Arc::new(DefaultAnchorProvider),
            minimum_version: MINIMUM_PLATFORM_VERSION,
        }
    }

    /// Platform version is new enough for the federation API.
    pub fn is_available(&self) -> bool {
        self.state.platform.os_version() >= self.state.minimum_version
    }

    /// Start a sign in request. Does nothing if the API is not available.
    /// `None` starts the request without a channel, so its outcome is
    /// dropped.
    pub fn begin_request(&self, channel: Option<NotificationChannel>) {
        if !self.is_available() {
            debug!(
                "sign in not available on platform version {}",
                self.state.platform.os_version()
            );
            return;
        }

        let request = self.state.platform.create_authorization_request();
        {
            let mut current = self.state.current.lock();
            if let (Some(previous), Some(_)) = (current.request.as_ref(), current.channel.as_ref())
            {
                debug!(
                    "request {} superseded by request {}",
                    previous.id, request.id
                );
            }
            current.channel = channel;
            current.request = Some(request.clone());
        }

        info!("sign in request {} started", request.id);
        let completion = CompletionHandle::new(
            request.clone(),
            CoordinatorHandle {
                state: Arc::downgrade(&self.state),
            },
        );
        self.state
            .platform
            .perform_request(request, self.state.anchor_provider.as_ref(), completion);
    }

    pub fn begin_request_with_delegate<D: SignInDelegate + 'static>(
        &self,
        delegate: Option<&Arc<D>>,
    ) {
        self.begin_request(delegate.map(NotificationChannel::delegate))
    }

    pub fn begin_request_with_callbacks(
        &self,
        on_complete: impl FnOnce(SignInSuccess) + Send + 'static,
        on_error: impl FnOnce(SignInFailure) + Send + 'static,
    ) {
        self.begin_request(Some(NotificationChannel::callbacks(on_complete, on_error)))
    }

    /// Forget the current channel. Results which arrive later are dropped.
    pub fn reset(&self) {
        let mut current = self.state.current.lock();
        if current.channel.is_some() {
            debug!("notification channel cleared");
        }
        *current = CurrentAttempt::default();
    }

    /// Request which was started most recently, if not reset.
    pub fn last_request(&self) -> Option<AuthorizationRequest> {
        self.state.current.lock().request.clone()
    }

    pub fn has_channel(&self) -> bool {
        self.state.current.lock().channel.is_some()
    }

    /// Receive attempts which ended without notifying the caller.
    pub fn subscribe_drops(&self) -> broadcast::Receiver<DroppedAttempt> {
        self.state.dropped_attempts.subscribe()
    }
}

impl fmt::Debug for SignInCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInCoordinator")
            .field("minimum_version", &self.state.minimum_version)
            .field("current", &*self.state.current.lock())
            .finish()
    }
}

pub struct CoordinatorBuilder {
    platform: Arc<dyn AuthorizationPlatform>,
    anchor_provider: Arc<dyn PresentationAnchorProvider>,
    minimum_version: PlatformVersion,
}

impl CoordinatorBuilder {
    pub fn anchor_provider(mut self, anchor_provider: Arc<dyn PresentationAnchorProvider>) -> Self {
        self.anchor_provider = anchor_provider;
        self
    }

    pub fn minimum_version(mut self, version: PlatformVersion) -> Self {
        self.minimum_version = version;
        self
    }

    pub fn build(self) -> SignInCoordinator {
        let (dropped_attempts, _) = broadcast::channel(DROPPED_ATTEMPT_CHANNEL_BUFFER);
        SignInCoordinator {
            state: Arc::new(CoordinatorState {
                platform: self.platform,
                anchor_provider: self.anchor_provider,
                minimum_version: self.minimum_version,
                current: Mutex::new(CurrentAttempt::default()),
                dropped_attempts,
            }),
        }
    }
}
