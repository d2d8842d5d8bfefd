pub mod admin;
pub mod otp;
pub mod session;
