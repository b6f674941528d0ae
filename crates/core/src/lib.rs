//! Pixelwear Core - Cart state and catalog filtering.
//!
//! This crate holds the client-side logic of the Pixelwear gaming
//! merchandise store, shared by:
//! - `storefront` - JSON API serving the catalog, cart and checkout
//! - `cli` - Local tooling for carts and catalog exports
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no network, no
//! filesystem. Persistence goes through the [`cart::CartStorage`] trait, which
//! callers implement for their medium.
//!
//! # Modules
//!
//! - [`types`] - Product and order identifiers, prices
//! - [`cart`] - Line items, the cart store, persistence trait
//! - [`catalog`] - Product view and the filter/sort pipeline
//! - [`checkout`] - Order payload and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod types;

pub use types::*;
