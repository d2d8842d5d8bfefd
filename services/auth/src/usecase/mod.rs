pub mod admin;
pub mod otp;
