// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: notifications, the delivery sink, and the
//! tail reader's subprocess plumbing.

mod env;
pub mod notify;
pub mod process_group;
pub mod sink;
pub mod traced;

pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use process_group::{killpg, spawn_in_new_group};
pub use sink::{HttpSinkAdapter, SinkAdapter, SinkError};
pub use traced::{TracedNotify, TracedSink};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use sink::{FakeSinkAdapter, SinkCall};
