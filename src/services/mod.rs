pub mod auth;
pub mod data_deletion;
pub mod passcodes;
pub mod passwords;
pub mod reset_tokens;
pub mod session_tokens;
pub mod sweeper;
pub mod token_codec;

pub use auth::AuthService;
pub use data_deletion::DataDeletionService;
pub use passcodes::PasscodeService;
pub use passwords::PasswordService;
pub use reset_tokens::ResetTokenService;
pub use session_tokens::SessionTokenService;
pub use sweeper::{SweepReport, SweeperService};
