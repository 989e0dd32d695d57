pub mod backend;
pub mod chain;
pub mod config;
pub mod deposit;
pub mod ens;
pub mod faucet;
pub mod model;
pub mod positions;
pub mod rebalance;
pub mod schema;

#[cfg(feature = "full")]
pub mod api;
