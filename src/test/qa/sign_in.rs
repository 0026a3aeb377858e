use crate::{
    coordinator::{validation::CredentialError, DropReason},
    platform::PlatformErrorCode,
    token::DecodeError,
};

use super::{
    actions::{
        AssertCanceled, AssertDropped, AssertNoOutcome, AssertOtherFailure, AssertSuccess,
        BeginWithCallbacks, BeginWithDelegate, BeginWithoutChannel, DropDelegate, PlatformFails,
        PlatformSucceeds, PlatformSucceedsWithoutToken, Reset,
    },
    ChannelKind, QaAction, SingleTest,
};

use crate::qa_test;

/// Payload {"sub":"U001"}
const TOKEN: &str = "h.eyJzdWIiOiJVMDAxIn0.s";

const VALID: PlatformSucceeds = PlatformSucceeds {
    token: TOKEN,
    auth_code: "code123",
    user: "U001",
};

const EXPECTED_CALLBACKS: AssertSuccess = AssertSuccess {
    via: ChannelKind::Callbacks,
    token: TOKEN,
    auth_code: "code123",
    user: "U001",
};

const EXPECTED_DELEGATE: AssertSuccess = AssertSuccess {
    via: ChannelKind::Delegate,
    token: TOKEN,
    auth_code: "code123",
    user: "U001",
};

pub const SIGN_IN_TESTS: &[SingleTest] = &[
    qa_test!(
        "Sign in: callbacks receive success once",
        [BeginWithCallbacks, VALID, EXPECTED_CALLBACKS, AssertNoOutcome,]
    ),
    qa_test!(
        "Sign in: delegate receives success",
        [BeginWithDelegate, VALID, EXPECTED_DELEGATE, AssertNoOutcome,]
    ),
    qa_test!(
        "Sign in: user cancellation",
        [
            BeginWithCallbacks,
            PlatformFails(PlatformErrorCode::Canceled),
            AssertCanceled(ChannelKind::Callbacks),
        ]
    ),
    qa_test!(
        "Sign in: other platform error",
        [
            BeginWithDelegate,
            PlatformFails(PlatformErrorCode::NotHandled),
            AssertOtherFailure(ChannelKind::Delegate, PlatformErrorCode::NotHandled),
        ]
    ),
    qa_test!(
        "Sign in: subject mismatch is dropped",
        [
            BeginWithCallbacks,
            PlatformSucceeds {
                token: TOKEN,
                auth_code: "code123",
                user: "U002",
            },
            AssertDropped(DropReason::Credential(CredentialError::SubjectMismatch)),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Sign in: malformed token is dropped",
        [
            BeginWithCallbacks,
            PlatformSucceeds {
                token: "not-a-token",
                auth_code: "code123",
                user: "U001",
            },
            AssertDropped(DropReason::Credential(CredentialError::Decode(
                DecodeError::MalformedToken
            ))),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Sign in: missing identity token is dropped",
        [
            BeginWithDelegate,
            PlatformSucceedsWithoutToken { user: "U001" },
            AssertDropped(DropReason::Credential(CredentialError::MissingIdentityToken)),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Sign in: late result after reset is dropped",
        [
            BeginWithCallbacks,
            Reset,
            VALID,
            AssertDropped(DropReason::NoChannel),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Sign in: dropped delegate is not notified",
        [
            BeginWithDelegate,
            DropDelegate,
            VALID,
            AssertDropped(DropReason::DelegateGone),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Sign in: request without channel",
        [
            BeginWithoutChannel,
            PlatformFails(PlatformErrorCode::Failed),
            AssertDropped(DropReason::NoChannel),
        ]
    ),
    qa_test!(
        "Sign in: newer request takes over pending result",
        [
            BeginWithDelegate,
            BeginWithCallbacks,
            VALID,
            EXPECTED_CALLBACKS,
            VALID,
            AssertDropped(DropReason::NoChannel),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Sign in: coordinator is reusable after reset",
        [
            BeginWithDelegate,
            PlatformFails(PlatformErrorCode::Canceled),
            AssertCanceled(ChannelKind::Delegate),
            Reset,
            BeginWithCallbacks,
            VALID,
            EXPECTED_CALLBACKS,
        ]
    ),
];
