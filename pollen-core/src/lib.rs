//! Core library for the `pollenflug` CLI.
//!
//! This crate defines:
//! - Layered configuration (defaults, settings file, command line)
//! - Classification of pollen severity codes into colors
//! - Rendering of a forecast as a terminal table
//! - Abstraction over the forecast source, with the Hexal HTTP implementation
//!
//! It is used by `pollenflug`, but can also be reused by other binaries or services.

pub mod calendar;
pub mod config;
pub mod model;
pub mod severity;
pub mod source;

pub use calendar::{Calendar, render};
pub use config::{CliOverrides, ConfigError, Defaults, PersistedSettings, ResolvedConfig, resolve};
pub use model::{ForecastRequest, ForecastRow, ForecastTable};
pub use severity::{Color, SeverityCategory, classify, format};
pub use source::{FetchError, ForecastSource, HexalSource};
