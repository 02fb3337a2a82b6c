//! expense-tracker: an observable model of expense transactions.
//!
//! The model lives in [`model`]; [`transaction`] defines the values it
//! stores and [`filter`] computes which of them match. [`cmd`] holds the
//! command-line subcommands.

pub mod cmd;
pub mod filter;
pub mod model;
pub mod transaction;
