pub mod passcodes;
pub mod passwords;
pub mod refresh_tokens;
pub mod reset_tokens;

pub use passcodes::*;
pub use passwords::*;
pub use refresh_tokens::*;
pub use reset_tokens::*;
