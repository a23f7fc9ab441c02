//! Infrastructure - ports and the adapters that implement them.

pub mod config;
pub mod holara;
pub mod openai;
pub mod ports;
pub mod telemetry;
