pub mod aggregator;
pub mod routes;

pub use routes::routes;
