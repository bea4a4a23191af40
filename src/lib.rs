pub mod api;
pub mod config;
pub mod employers;
pub mod humanize;
pub mod ledger;
pub mod oauth;
pub mod observability;
pub mod pipeline;
pub mod server;
