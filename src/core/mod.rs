pub mod error;

pub use error::{NotifyError, Result};
