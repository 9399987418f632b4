pub mod error;
pub mod hooks;
pub mod retry;
