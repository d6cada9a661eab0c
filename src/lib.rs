// src/lib.rs

//! gameframe: a multiplayer game server framework scaffold built around a
//! text-line command protocol.

pub mod config;
pub mod connection;
pub mod core;
pub mod server;
pub mod services;
