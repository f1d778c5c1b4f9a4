//! Test fixtures for trip-planner.
//!
//! Provides:
//! - Real Irvine / Orange County addresses with coordinates
//! - In-memory fakes for the backend and the mapping provider
//! - A canned-response HTTP server for exercising the real clients

#![allow(dead_code)]

pub mod fakes;
pub mod http;
pub mod irvine_addresses;

pub use fakes::*;
pub use irvine_addresses::*;
