pub mod cookies;
pub mod password;

pub use cookies::*;
pub use password::*;
