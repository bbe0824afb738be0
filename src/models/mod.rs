pub mod file;
pub mod system;

pub use file::*;
pub use system::*;
