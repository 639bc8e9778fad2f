// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drinks API - Permission-gated drink catalog
//!
//! A small CRUD service for a drink menu. Reads of the public menu are open;
//! detailed reads and all writes require a bearer token from the configured
//! issuer whose `scope` grants the route's permission.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token verification and scope permissions (JWKS)
//! - `config` - Environment configuration
//! - `store` - In-memory drink store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
