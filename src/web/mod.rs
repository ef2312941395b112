//! HTTP front end
//!
//! Maps requests onto the cache store:
//! `GET /{key}`, `POST /` with a `{"key": "value"}` body, `DELETE /{key}`.

mod handlers;
mod server;

pub use handlers::{AppState, DeleteResponse, ErrorResponse, SHARD_HEADER};
pub use server::{router, run, run_with_state, shutdown_signal};
