pub mod actor;
pub mod ticket;

pub use actor::ActorId;
pub use ticket::{Ticket, MAX_DELIMITER};
