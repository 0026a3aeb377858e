//! Sign in with Apple client adapter.
//!
//! Use [coordinator::SignInCoordinator::is_available] to check that the
//! platform supports sign in, and then start a request with a delegate or
//! a callback pair. The outcome is delivered at most once.

pub mod config;
pub mod coordinator;
pub mod platform;
pub mod shared;
pub mod token;
pub mod utils;
