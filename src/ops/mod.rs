pub mod board;
pub mod filter;
pub mod stats;
pub mod store;
