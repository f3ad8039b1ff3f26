//! Typed resources of the REST API.
//!
//! Each resource module provides request builders usable with
//! [`Client::execute`](crate::Client::execute) and
//! [`RestApi::execute`](crate::RestApi::execute), plus convenience methods on
//! both executors.

pub mod calls;
