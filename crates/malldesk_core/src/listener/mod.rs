use crate::model::Ticket;
use std::cell::Cell;
use std::rc::Rc;

/// Observer called by the store after each successful creation.
pub trait TicketListener {
    fn ticket_created(&mut self, ticket: &Ticket);
}

impl<F> TicketListener for F
where
    F: FnMut(&Ticket),
{
    fn ticket_created(&mut self, ticket: &Ticket) {
        self(ticket)
    }
}

/// Listener a store starts with.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl TicketListener for NoopListener {
    fn ticket_created(&mut self, _ticket: &Ticket) {}
}

/// Aggregate "maintenance requests" counter shown on the dashboard.
///
/// Clones share the same count, so one clone can be handed to the store
/// while the view keeps another for reading.
#[derive(Debug, Clone, Default)]
pub struct CreationCounter {
    count: Rc<Cell<usize>>,
}

impl CreationCounter {
    pub fn starting_at(base: usize) -> Self {
        Self {
            count: Rc::new(Cell::new(base)),
        }
    }

    pub fn get(&self) -> usize {
        self.count.get()
    }
}

impl TicketListener for CreationCounter {
    fn ticket_created(&mut self, _ticket: &Ticket) {
        self.count.set(self.count.get() + 1);
    }
}
