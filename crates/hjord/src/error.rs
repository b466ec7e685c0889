//! Error types.
//!
//! Most ECS operations are total: unknown entities are ignored and empty
//! queries return empty results. The failures that remain come from the
//! component registry and, with `diagnostics`, from snapshot serialization.

use thiserror::Error;

/// Errors surfaced by the ECS.
#[derive(Debug, Error)]
pub enum EcsError {
    /// A component type was used before being registered.
    #[error("component `{type_name}` is not registered; register it before use")]
    NotRegistered {
        /// Fully-qualified type name of the offending component.
        type_name: &'static str,
    },

    /// Every component id has been handed out.
    #[error("component registry is full: at most {limit} component types can be registered")]
    RegistryFull {
        /// Number of assignable ids.
        limit: u32,
    },

    /// A diagnostics snapshot could not be encoded.
    #[cfg(feature = "diagnostics")]
    #[error("failed to serialize diagnostics snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shorthand result type.
pub type EcsResult<T> = Result<T, EcsError>;
