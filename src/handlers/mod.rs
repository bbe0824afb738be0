pub mod file;
pub mod system;
pub mod ws;
