pub mod security;
pub mod user;
