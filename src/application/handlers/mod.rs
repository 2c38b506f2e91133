//! Application handlers.
//!
//! One command or query handler per operation, grouped by subsystem.

pub mod ledger;
pub mod purchase;
pub mod sharing;
pub mod subscription;
pub mod webhook;

#[cfg(test)]
mod test_support;
