//! Wire format types for provider-specific API protocols
//!
//! Each module contains pure serde structs matching the respective provider's
//! JSON API format. Request types only serialize and response types only
//! deserialize; neither leaks past the provider adapters.

use serde::de::DeserializeOwned;

pub mod anthropic;
pub mod openai;

/// Error body a provider returns alongside a non-success status
pub trait ErrorEnvelope: DeserializeOwned {
    /// Provider's error message, verbatim
    fn into_message(self) -> String;
}
