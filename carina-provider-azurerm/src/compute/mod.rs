//! Azure Compute API surface used by the virtual machine mappings

pub mod disks;
pub mod models;

pub use disks::{ArmDisksClient, DiskLookupError, DisksClient};
pub use models::*;
