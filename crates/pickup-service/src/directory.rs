use pickup_core::{Resident, ResidentId};
use pickup_store::repo::ResidentsRepo;
use pickup_store::Store;

pub type DirectoryError = Box<dyn std::error::Error + Send + Sync>;

/// Identity provider for residents: existence, active flag and overdue
/// payment status.
pub trait ResidentDirectory {
    fn resident(&self, id: ResidentId) -> Result<Option<Resident>, DirectoryError>;
}

impl ResidentDirectory for ResidentsRepo<'_> {
    fn resident(&self, id: ResidentId) -> Result<Option<Resident>, DirectoryError> {
        Ok(self.get(id)?)
    }
}

impl ResidentDirectory for Store {
    fn resident(&self, id: ResidentId) -> Result<Option<Resident>, DirectoryError> {
        Ok(self.residents().get(id)?)
    }
}
