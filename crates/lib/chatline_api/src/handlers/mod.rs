//! Request handlers.

pub mod gateway;
