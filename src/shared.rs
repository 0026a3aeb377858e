//! Process wide coordinator for callers which do not want to pass one
//! around. Install it once at startup.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{coordinator::SignInCoordinator, platform::AuthorizationPlatform};

static SHARED: OnceCell<SignInCoordinator> = OnceCell::new();

#[derive(thiserror::Error, Debug)]
#[error("Shared sign in coordinator is already installed")]
pub struct AlreadyInstalled;

/// Create the shared coordinator for `platform`. Fails if it already
/// exists.
pub fn install(
    platform: Arc<dyn AuthorizationPlatform>,
) -> Result<&'static SignInCoordinator, AlreadyInstalled> {
    install_coordinator(SignInCoordinator::new(platform))
}

pub fn install_coordinator(
    coordinator: SignInCoordinator,
) -> Result<&'static SignInCoordinator, AlreadyInstalled> {
    SHARED.set(coordinator).map_err(|_| AlreadyInstalled)?;
    SHARED.get().ok_or(AlreadyInstalled)
}

/// The shared coordinator, if installed.
pub fn shared() -> Option<&'static SignInCoordinator> {
    SHARED.get()
}
