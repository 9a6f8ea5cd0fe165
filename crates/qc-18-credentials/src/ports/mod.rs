//! Hexagonal ports of the credential subsystem.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
