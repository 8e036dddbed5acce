//! GoMarketplace Storefront library.
//!
//! # Architecture
//!
//! - [`cart`] - Cart store: line-items, mutations, ordered persistence
//! - [`storage`] - Key-value storage seam with memory and file backends
//! - [`catalog`] - Remote product catalog seam and its HTTP client
//! - [`screen`] - Catalog screen: display rows, add control, cart summary
//! - [`state`] - Application session owning the cart and catalog client
//!
//! Ambient concerns live in [`config`], [`error`] and [`telemetry`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod screen;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use error::{AppError, Result};
pub use state::Session;
