//! Test utilities for the exchange REST clients
//!
//! - Recording mock transport with canned responses per URL
//! - Credential fixtures and factories for every exchange
//! - Canned exchange responses
//! - Key file, clock and logging helpers
//! - Assertions over normalized results

pub mod assertions;
pub mod factories;
pub mod fixtures;
pub mod helpers;
pub mod mocks;

pub use assertions::*;
pub use factories::*;
pub use fixtures::*;
pub use helpers::*;
pub use mocks::*;
