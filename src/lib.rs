//! Voice-driven vehicle registry search.
//!
//! * [`config`]     — TOML settings.
//! * [`search`]     — query normalizer, vehicle record, registry gateway.
//! * [`speech`]     — recognition and announcer capabilities.
//! * [`controller`] — the voice search state machine.
//! * [`console`]    — terminal presentation layer.

pub mod config;
pub mod console;
pub mod controller;
pub mod search;
pub mod speech;
