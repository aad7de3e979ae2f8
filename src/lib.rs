pub mod api;
pub mod cli;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod problem;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;
