// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wfm-core: shared entities, identifiers and error kinds for the
//! Workflow Manager.

pub mod macros;

pub mod activity_log;
pub mod clock;
pub mod error;
pub mod id;
pub mod namespace_lock;
pub mod service;
pub mod session;
pub mod shell_quote;
pub mod step;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use activity_log::{Activity, ActivityLogEntry, ActivityLogId, ObjectType};
#[cfg(any(test, feature = "test-support"))]
pub use activity_log::ActivityLogEntryBuilder;
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::WfmError;
pub use id::{short, IdBuf};
#[cfg(any(test, feature = "test-support"))]
pub use namespace_lock::NamespaceLockBuilder;
pub use namespace_lock::{NamespaceLock, NamespaceLockId};
#[cfg(any(test, feature = "test-support"))]
pub use service::ServiceBuilder;
pub use service::{Service, ServiceId, ServiceKind, ServiceStatus, NO_JOBID};
#[cfg(any(test, feature = "test-support"))]
pub use session::SessionBuilder;
pub use session::{Session, SessionId, SessionStatus};
pub use shell_quote::{shell_quote, shell_quote_join};
#[cfg(any(test, feature = "test-support"))]
pub use step::{StepDescriptionBuilder, StepInstanceBuilder};
pub use step::{
    StepDescription, StepDescriptionId, StepInstance, StepInstanceId, StepInstanceStatus,
    NO_SERVICE,
};
