pub mod macros;
pub mod pc;
pub mod reservation;
pub mod session;
pub mod usage;

pub use pc::*;
pub use reservation::*;
pub use session::*;
pub use usage::*;
