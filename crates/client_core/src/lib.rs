//! Client side of the movie list: remote store access, the fetch/retry state
//! machine and the controller the presentation layer talks to.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod machine;
pub mod retry;
pub mod store;

pub use adapter::{adapter_for, BackendShape, RecordAdapter};
pub use config::{load_settings, Settings};
pub use controller::{ControllerEvent, ControllerView, FetchOutcome, MovieController};
pub use error::StoreError;
pub use machine::{FetchPhase, FetchTrigger};
pub use retry::{RetryPolicy, RetryTimer};
pub use store::{HttpMovieStore, MovieStore};
