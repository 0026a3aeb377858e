use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::platform::PlatformError;

/// Validated result of a successful sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInSuccess {
    /// Complete identity token as received from the platform.
    pub token: String,
    pub auth_code: String,
    /// Value of the `sub` claim which matched the credential user.
    pub user: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SignInFailure {
    #[error("Sign in was canceled by the user")]
    Canceled,

    #[error("Sign in failed")]
    Other(#[source] PlatformError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Success(SignInSuccess),
    Failure(SignInFailure),
}

/// Observer which receives the sign in outcome.
pub trait SignInDelegate: Send + Sync {
    fn sign_in_did_complete(&self, success: SignInSuccess);

    fn sign_in_did_fail(&self, failure: SignInFailure);
}

pub type CompleteCallback = Box<dyn FnOnce(SignInSuccess) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(SignInFailure) + Send>;

/// Where the outcome of the current attempt is delivered.
pub enum NotificationChannel {
    /// Non-owning reference. If the delegate is dropped before the outcome
    /// is ready, the outcome is dropped too.
    Delegate(Weak<dyn SignInDelegate>),
    Callbacks {
        on_complete: CompleteCallback,
        on_error: ErrorCallback,
    },
}

/// Delivery failed because the channel no longer has a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelGone;

impl NotificationChannel {
    pub fn delegate<D: SignInDelegate + 'static>(delegate: &Arc<D>) -> Self {
        let delegate: Weak<D> = Arc::downgrade(delegate);
        Self::Delegate(delegate)
    }

    pub fn callbacks(
        on_complete: impl FnOnce(SignInSuccess) + Send + 'static,
        on_error: impl FnOnce(SignInFailure) + Send + 'static,
    ) -> Self {
        Self::Callbacks {
            on_complete: Box::new(on_complete),
            on_error: Box::new(on_error),
        }
    }

    /// Deliver the outcome. Consumes the channel so that it can be used
    /// only once.
    pub fn dispatch(self, outcome: SignInOutcome) -> Result<(), ChannelGone> {
        match self {
            Self::Delegate(delegate) => {
                let delegate = delegate.upgrade().ok_or(ChannelGone)?;
                match outcome {
                    SignInOutcome::Success(success) => delegate.sign_in_did_complete(success),
                    SignInOutcome::Failure(failure) => delegate.sign_in_did_fail(failure),
                }
            }
            Self::Callbacks {
                on_complete,
                on_error,
            } => match outcome {
                SignInOutcome::Success(success) => on_complete(success),
                SignInOutcome::Failure(failure) => on_error(failure),
            },
        }
        Ok(())
    }
}

impl fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delegate(delegate) => f
                .debug_struct("Delegate")
                .field("alive", &(delegate.strong_count() > 0))
                .finish(),
            Self::Callbacks { .. } => f.debug_struct("Callbacks").finish_non_exhaustive(),
        }
    }
}
