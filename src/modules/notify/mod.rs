pub mod dispatch;
pub mod envelope;
pub mod handler;
pub mod kind;

pub use dispatch::{dispatch, Acknowledgment, VerifiedNotification};
pub use envelope::NotificationEnvelope;
pub use handler::{FnNotify, NotifyHandler};
pub use kind::{classify, NotifyKind};
