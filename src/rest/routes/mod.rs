//! Route handlers for the REST API.

pub mod health;
pub mod states;
pub mod tickets;
