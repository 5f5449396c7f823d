#![no_std]
#![forbid(unsafe_code)]

//! # Second-level interrupt controller
//!
//! Multiplexes the five first-level interrupt lines into their virtual
//! sources. Each source is a bit in its group's pending and mask registers
//! and is bound at build time to one handler. The first-level vector of a
//! group calls [`SecondLevelController::dispatch`], which serves every active
//! source lowest bit first.

// Logging macros; declared first so later modules can use them.
pub(crate) mod fmt;

pub mod binding;
pub mod controller;
pub mod group;
pub mod source;

pub use binding::{unbound, Binding, BindingTable, Handler};
pub use controller::SecondLevelController;
pub use group::SourceGroup;
pub use source::{Group, Source};
