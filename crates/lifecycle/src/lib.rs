//! # Page lifecycle
//!
//! Structured replacements for the legacy client's navigation plumbing:
//!
//! - [`retry`]: a bounded async retry helper with an explicit backoff schedule.
//! - [`TaskRegistry`]: every interval/timeout a page starts, stopped on teardown.
//! - [`Navigator`]: one navigation at a time, teardown of the previous page, and
//!   retried page initialization.

pub mod error;
pub mod navigator;
pub mod retry;
pub mod timers;

pub use error::{NavigationError, PageError};
pub use navigator::{Navigator, Page, PageContext};
pub use retry::{RetryPolicy, retry};
pub use timers::TaskRegistry;
