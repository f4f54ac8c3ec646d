//! Helpdesk - ticket workflow engine
//!
//! The `workflow` module holds the ticket state machine and its validator;
//! `tickets` applies validated changes to stored tickets; `rest` exposes both
//! over HTTP.

pub mod config;
pub mod logging;
pub mod rest;
pub mod tickets;
pub mod workflow;
