//! GoMarketplace Core - Shared domain types.
//!
//! This crate provides the types shared by every GoMarketplace component:
//! - `storefront` - Cart store, catalog client and catalog screen
//! - `cli` - Terminal front-end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices, catalog products and cart line-items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
