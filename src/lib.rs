//! Generic ServiceNow Table API tools and a framework router, served over MCP.

pub mod client;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod frameworks;
pub mod logging;
pub mod outcome;
pub mod schemas;
pub mod server;
pub mod tools;

pub use client::{ClientGuard, TableClient};
pub use outcome::{ErrorType, Outcome};
pub use server::ServiceNowServer;
