//! REST front door over the resource service.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use router::create_router;
pub use server::Server;
pub use state::AppState;
