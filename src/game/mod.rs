pub mod constants;
pub mod engine;
pub mod food;
pub mod input;
pub mod session;
pub mod snake;
pub mod types;
