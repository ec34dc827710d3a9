pub mod auth;
pub mod passcode;
pub mod password;
pub mod refresh_token;
pub mod reset_token;
