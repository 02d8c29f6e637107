#![forbid(unsafe_code)]

//! Library behind the `lumos` command-line client.
//!
//! Resolves partial operator input into a complete access request,
//! submits it through a [`gateway::Gateway`], and polls the result.

pub mod config;
pub mod console;
pub mod duration;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod request;
pub mod resolve;
pub mod session;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use session::Session;
