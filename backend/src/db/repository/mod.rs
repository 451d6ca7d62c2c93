//! Repository trait definitions for storage operations.
//!
//! Responsibilities are split across focused traits so each backend can be
//! tested one concern at a time.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`usage`]: Usage-session records and import bookkeeping
//! - [`pc`]: Workstation registry
//! - [`session`]: Live sessions, which feed usage records
//! - [`reservation`]: Bookings of workstations
//!
//! # Convenience Trait Bound
//!
//! For code that needs every repository capability, use [`FullRepository`]:
//!
//! ```ignore
//! async fn reset_floor<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     for pc in repo.list_pcs().await? {
//!         if let Some(id) = pc.id {
//!             repo.update_pc_status(id, PcStatus::Free).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod pc;
pub mod reservation;
pub mod session;
pub mod usage;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use pc::PcRepository;
pub use reservation::ReservationRepository;
pub use session::SessionRepository;
pub use usage::UsageRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type implementing every repository trait.
pub trait FullRepository:
    UsageRepository + PcRepository + SessionRepository + ReservationRepository
{
}

impl<T> FullRepository for T where
    T: UsageRepository + PcRepository + SessionRepository + ReservationRepository
{
}
