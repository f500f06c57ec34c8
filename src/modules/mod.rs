pub mod crypto;
pub mod notify;
pub mod providers;
pub mod web;
