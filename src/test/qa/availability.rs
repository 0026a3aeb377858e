use crate::platform::PlatformVersion;

use super::{
    actions::{
        AssertNoOutcome, AssertPendingRequests, BeginWithCallbacks, BeginWithDelegate,
        SetPlatformVersion,
    },
    QaAction, SingleTest,
};

use crate::qa_test;

pub const AVAILABILITY_TESTS: &[SingleTest] = &[
    qa_test!(
        "Availability: request on old platform does nothing",
        [
            SetPlatformVersion(PlatformVersion::new(12, 4)),
            BeginWithCallbacks,
            BeginWithDelegate,
            AssertPendingRequests(0),
            AssertNoOutcome,
        ]
    ),
    qa_test!(
        "Availability: request on current platform version is performed",
        [
            SetPlatformVersion(PlatformVersion::new(17, 0)),
            BeginWithCallbacks,
            AssertPendingRequests(1),
        ]
    ),
];
