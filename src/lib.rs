#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "Personal task tracker: registration and login with signed session"]
#![doc = "tokens, per-user tasks with a public/private flag, and browsing of"]
#![doc = "other users' public tasks. This crate holds the domain models, the"]
#![doc = "authentication layer (password hashing, token service, auth gate),"]
#![doc = "the persistence stores, routing, and error handling; the binary in"]
#![doc = "`main.rs` assembles them into the running server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
