//! Client for UniVote, a blockchain-backed student election system.
//!
//! The client never holds key material: votes are signed by an external
//! wallet over a canonical message (see [`univote_protocol`]) and recorded by
//! the election backend.

#[macro_use]
extern crate log;

pub mod admin;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod vote;
pub mod wallet;

pub use config::Config;
pub use error::{Error, Result};
pub use univote_protocol as protocol;
