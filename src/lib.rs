#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

#[doc(inline)]
pub use cosmtx_core as core;
#[doc(inline)]
pub use cosmtx_middleware as middleware;
#[doc(inline)]
pub use cosmtx_providers as providers;
#[doc(inline)]
pub use cosmtx_signers as signers;

// Convenience re-exports
pub use crate::core::{types, utils};

/// Easy imports of frequently used type definitions and traits.
#[doc(hidden)]
pub mod prelude {
    pub use super::core::{
        types::{transaction::*, *},
        utils::*,
    };

    pub use super::middleware::*;

    pub use super::providers::*;

    pub use super::signers::*;
}
