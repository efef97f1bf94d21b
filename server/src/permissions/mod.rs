//! Permission checks for configuration changes.

mod owner;

pub use owner::{Actor, OwnerCapability, OwnerPolicy};
