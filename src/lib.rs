//! Local review cache and categorization workflow for a remote
//! bookkeeping service: sync transactions down, assign categories by rule
//! or by hand, post the results back.

pub mod auth;
pub mod cli;
pub mod error;
pub mod fmt;
pub mod migrations;
pub mod models;
pub mod remote;
pub mod rules;
pub mod settings;
pub mod store;
pub mod sync;
