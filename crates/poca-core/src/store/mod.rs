//! Keyed stores: catalog, per-user inventories, distribution counters.

pub mod file;
pub mod port;
