mod ticket;

pub use ticket::{Category, Priority, Ticket, TicketField, TicketStatus};
