//! Pomelo server library.
//!
//! This crate provides the e-commerce backend as a library, allowing it to
//! be tested and reused. The binary in `main.rs` wires it to a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
