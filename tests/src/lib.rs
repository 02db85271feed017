//! # mtl-tests
//!
//! End-to-end suite for the ledger workspace. Every test drives the runtime
//! through `invoke` with real ECDSA signatures, the way the orchestrator
//! does; nothing reaches into the domain crates directly.

pub mod support;

#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;
