//! helpdeskctl library - exposes the client and output helpers for testing

pub mod client;
pub mod display;
pub mod input;
