pub mod session;
pub mod spotify;
