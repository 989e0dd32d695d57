pub mod ens;
pub mod schema;
