//! Secret Friend: gift-exchange drawing over a remote participant table.
//!
//! Participants log in by picking their name, draw a random recipient who is
//! neither themself nor already taken, and the result is persisted so it can
//! never be drawn again. An optional insight service summarizes the group.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;

pub mod engine;
pub mod participant;
pub mod session;

pub mod insights;
pub mod service;
pub mod store;
