pub mod cache;
pub mod db;
pub mod ledger;
pub mod mailer;
