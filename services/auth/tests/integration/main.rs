mod helpers;
mod otp_test;
