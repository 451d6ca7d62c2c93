//! Reservation repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Reservation, ReservationId, ReservationStatus};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// List every reservation, ordered by id.
    async fn list_reservations(&self) -> RepositoryResult<Vec<Reservation>>;

    async fn get_reservation(&self, id: ReservationId) -> RepositoryResult<Reservation>;

    /// Book a PC.
    ///
    /// # Returns
    /// * `Ok(Reservation)` - The stored reservation with its id
    /// * `Err(RepositoryError::NotFound)` - If the PC does not exist
    /// * `Err(RepositoryError::ValidationError)` - If the PC is under maintenance
    ///   or another active reservation overlaps the requested time
    async fn insert_reservation(&self, reservation: &Reservation)
        -> RepositoryResult<Reservation>;

    async fn update_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation>;

    async fn delete_reservation(&self, id: ReservationId) -> RepositoryResult<()>;
}
