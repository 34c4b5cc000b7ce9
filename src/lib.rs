//! Simulation core of a small 2D entity-component engine.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg(feature = "sdl")]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg(feature = "sdl")]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod audio;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod error;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod formatter;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod logging;

pub mod backend;
pub mod config;
pub mod constants;
pub mod entity;
pub mod events;
pub mod geometry;
pub mod systems;
pub mod timing;
