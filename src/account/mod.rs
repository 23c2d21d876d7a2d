/// Account management
mod manager;

pub use manager::{AccountManager, AdminAccountUpdate, ProfileUpdate, SignupRequest};
