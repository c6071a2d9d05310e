//! Conversion between canonical request/reply types and wire formats
//!
//! Each submodule handles conversions for a specific provider's protocol.

pub mod anthropic;
pub mod openai;
