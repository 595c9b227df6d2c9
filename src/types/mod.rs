pub mod inventory;
pub mod order;
pub mod stats;
