//! The offline cache manager and its event dispatch.
//!
//! `OfflineWorker` implements the whole worker policy: install primes the
//! versioned bucket, activate evicts stale versions and claims clients,
//! fetch applies cache-first with network fallback, and push / click /
//! sync events drive the notification surface. `run_event_loop` dispatches
//! `WorkerEvent`s to the matching handler, one method per event kind.

pub mod clients;
pub mod events;
pub mod manager;

pub use clients::Clients;
pub use events::{channel, run_event_loop, WorkerEvent};
pub use manager::{OfflineWorker, WorkerState, SYNC_TASKS_TAG};
