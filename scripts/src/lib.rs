//! Scripts for deploying the Galxe smart contracts to any supported network.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod env;
pub mod errors;
mod solidity;
pub mod types;
pub mod utils;
pub mod verify;
