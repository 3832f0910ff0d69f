pub mod demo;
pub mod json_seed;

pub use demo::{demo_tickets, fetch_demo_tickets};
pub use json_seed::{load_seed, seed_path_from_env};
