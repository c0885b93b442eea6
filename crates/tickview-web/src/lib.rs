//! # Tickview Web
//!
//! HTTP front end for the stock price viewer.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cli`] | Server flags |
//! | [`error`] | Startup errors and exit codes |
//! | [`page`] | The dashboard page |
//! | [`routes`] | Router, handlers, and server loop |
//! | [`session`] | Newest-trigger-wins ordering per browser session |
//! | [`telemetry`] | Log subscriber setup |

pub mod cli;
pub mod error;
pub mod page;
pub mod routes;
pub mod session;
pub mod telemetry;

pub use cli::Cli;
pub use error::WebError;
pub use routes::{create_router, serve, AppState};
pub use session::{Gated, SessionGate};
