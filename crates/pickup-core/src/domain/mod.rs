pub mod category;
pub mod collection;
pub mod ids;
pub mod payment;
pub mod qr;
pub mod resident;
pub mod slot;

pub use category::WasteCategory;
pub use collection::{CollectionRecord, CollectionRequest, CollectionStatus, Coordinates};
pub use ids::{CollectionId, ResidentId};
pub use payment::{PaymentMethod, PaymentStatus};
pub use qr::QrToken;
pub use resident::{normalize_email, Resident};
pub use slot::TimeSlot;
