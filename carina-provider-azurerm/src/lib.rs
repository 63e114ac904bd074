//! Carina Azure Resource Manager provider
//!
//! Translates the configuration of an `azurerm.virtual_machine` (additional
//! capabilities, identity, network interfaces, OS and data disks) into
//! Compute API request models, and API responses back into state values.
//! Managed disks referenced by a virtual machine are read through a
//! [`DisksClient`].

pub mod compute;
pub mod config;
pub mod error;
pub mod ids;
mod utils;
pub mod virtual_machine;

#[cfg(test)]
mod testing;

pub use compute::{ArmDisksClient, DiskLookupError, DisksClient};
pub use config::{ArmClientConfig, LookupContext};
pub use error::{Error, Result};
pub use virtual_machine::{VirtualMachineConfig, virtual_machine_schema};
