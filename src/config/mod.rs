// ABOUTME: Configuration module root for the booking engine
// ABOUTME: Environment-only configuration, no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Encore Booking Contributors

//! Configuration management. Environment variables are the single source of
//! configuration; there is no file-based layer.

pub mod environment;

pub use environment::ServerConfig;
