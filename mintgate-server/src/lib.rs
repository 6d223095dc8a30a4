#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! x402 NFT mint gate HTTP server.
//!
//! Wires the core [`mintgate`] workflow and the [`mintgate_evm`] chain
//! collaborators behind two routes: a checkout endpoint that answers with
//! an HTTP 402 payment challenge, and a notify endpoint that verifies the
//! presented payment proof and authorizes the mint.
//!
//! # Modules
//!
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Mapping of the workflow error taxonomy to HTTP responses
//! - [`handlers`] - Axum route handlers and the router

pub mod config;
pub mod error;
pub mod handlers;
