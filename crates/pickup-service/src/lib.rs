pub mod directory;
pub mod error;
pub mod notify;
pub mod scheduling;

pub use directory::{DirectoryError, ResidentDirectory};
pub use error::{ConflictReason, PolicyReason, ServiceError, ServiceErrorKind};
pub use notify::{CollectionNotifier, NoopNotifier, NotifyError};
pub use scheduling::{RescheduleRequest, SchedulingService};
