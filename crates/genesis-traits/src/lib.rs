//! # Genesis Traits
//!
//! Typed, attribute-backed stats ("traits") for game entities.
//!
//! This crate provides:
//! - Field schemas with mandatory fields, defaults and extra-field policy
//! - Built-in trait kinds: trait, numeric, static, counter, gauge
//! - A registry for custom trait types
//! - The per-entity [`TraitHandler`] that stores traits in an
//!   [`AttributeStore`](genesis_common::AttributeStore)
//! - Handler configuration loaded from TOML

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod handler;
pub mod kind;
pub mod schema;
pub mod traits;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::handler::*;
    pub use crate::kind::*;
    pub use crate::schema::*;
    pub use crate::traits::*;
}

pub use prelude::*;
