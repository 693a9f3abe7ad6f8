/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Join function library.
//!
//! This crate provides the Axum router, application state, provisioner port,
//! and configuration for the join service. The binary entry point
//! (`main.rs`) is a thin wrapper that calls into this library.

pub mod auth;
pub mod config;
pub mod error;
pub mod provisioner;
pub mod routes;
pub mod state;
