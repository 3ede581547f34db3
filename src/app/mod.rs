pub mod session_name;
pub mod time;
