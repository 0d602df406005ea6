pub mod ticketmaster;

pub use ticketmaster::{EventSource, SourceError, TicketmasterClient};
