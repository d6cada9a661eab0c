// src/core/mod.rs

//! The central module containing the core logic and data structures of gameframe.

pub mod commands;
pub mod component;
pub mod dispatch;
pub mod errors;
pub mod metrics;
pub mod protocol;
pub mod storage;
pub mod trace;

pub use dispatch::CommandDispatcher;
pub use errors::GameError;
pub use protocol::Message;
