//! Data types crossing the worker's boundaries.
//!
//! This module contains the structures exchanged with the platform
//! boundaries described in the worker design:
//!
//! - `FetchRequest`, `RequestMode`: intercepted requests and their identity
//! - `FetchedResponse`, `ResponseKind`: captured responses and their
//!   same-origin classification
//! - `NotificationPayload`, `NotificationAction`: per-push notification
//!   descriptions

pub mod notification;
pub mod request;
pub mod response;

pub use notification::{NotificationAction, NotificationPayload};
pub use request::{FetchRequest, RequestMode};
pub use response::{FetchedResponse, ResponseKind};
