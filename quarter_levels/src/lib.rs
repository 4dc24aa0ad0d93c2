//! Quarter-range detection and percentage-level mapping for daily price series.
//!
//! The pipeline, leaf first:
//! - [`normalize`] cleans raw bar rows into an ascending, de-duplicated [`models::bar::Bar`] series.
//! - [`quarters`] partitions a series into Friday-anchored calendar-quarter ranges.
//! - [`classify`] resolves each range into a breakout / breakdown / failure outcome.
//! - [`levels`] maps named percentage levels onto a range's mid price (lines, bands, summary).
//! - [`scaler`] rescales the benchmark's levels for another asset by relative volatility.
//!
//! [`pipeline`] strings these together; [`catalog`] and [`config`] hold the external inputs.

#![deny(missing_docs)]

pub mod aggregate;
pub mod calendar;
pub mod catalog;
pub mod classify;
pub mod config;
/// Crate-wide error and result types.
pub mod errors;
pub mod levels;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod quarters;
pub mod scaler;

pub use errors::{Error, Result};
