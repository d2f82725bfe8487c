//! Application layer - flows, use cases and the ports they depend on

pub mod dto;
pub mod flow;
pub mod ports;
pub mod services;
