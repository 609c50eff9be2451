//! HTTP JSON surface over the calendar and list view models.
//!
//! Routes are nested under `/api/`. Health and session are open; appointment
//! lists, transitions and calendar views require a signed-in session.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerError, ServerSession};
pub use types::ApiContext;
