pub mod auth;
pub mod data_deletion;
pub mod passcodes;
pub mod passwords;
