//! # streetscout
//!
//! HTTP server and CLI over the StreetScout entity store.
//!
//! The binary is a thin shell around this library so that integration
//! tests can build the router (`api::create_router`) without a socket.

pub mod api;
pub mod cli;
pub mod config;
