use crate::error::{AppError, ValidationErrors};
use crate::listener::{NoopListener, TicketListener};
use crate::model::{Category, Priority, Ticket, TicketField, TicketStatus};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

const MIN_DESCRIPTION_CHARS: usize = 10;

/// Raw form input for a new maintenance request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub category: String,
    pub description: String,
    pub location: String,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TicketStatus),
}

impl StatusFilter {
    pub fn matches(self, status: TicketStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        raw.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::Pending => self.pending,
            TicketStatus::Assigned => self.assigned,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Completed => self.completed,
        }
    }

    pub fn open(&self) -> usize {
        self.pending + self.assigned + self.in_progress
    }

    pub fn total(&self) -> usize {
        self.open() + self.completed
    }
}

/// In-memory, newest-first collection of maintenance requests.
pub struct TicketStore {
    tickets: Vec<Ticket>,
    listener: Box<dyn TicketListener>,
}

impl fmt::Debug for TicketStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketStore")
            .field("tickets", &self.tickets)
            .finish_non_exhaustive()
    }
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketStore {
    pub fn new() -> Self {
        Self {
            tickets: Vec::new(),
            listener: Box::new(NoopListener),
        }
    }

    /// Builds a store from seed tickets, kept in the given order.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for ticket in &tickets {
            check_seeded(ticket)?;
            if !seen.insert(ticket.id.as_str()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate ticket id '{}'",
                    ticket.id
                )));
            }
            if !ticket.resolution_consistent() {
                return Err(AppError::invalid_data(format!(
                    "ticket '{}' has status {} but resolved_at is {}",
                    ticket.id,
                    ticket.status,
                    if ticket.resolved_at.is_some() {
                        "set"
                    } else {
                        "missing"
                    }
                )));
            }
        }

        Ok(Self {
            tickets,
            listener: Box::new(NoopListener),
        })
    }

    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: TicketListener + 'static,
    {
        self.listener = Box::new(listener);
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn get(&self, id: &str) -> Result<&Ticket, AppError> {
        let trimmed_id = id.trim();
        self.tickets
            .iter()
            .find(|ticket| ticket.id == trimmed_id)
            .ok_or_else(|| not_found(trimmed_id))
    }

    pub fn create(&mut self, draft: TicketDraft) -> Result<Ticket, AppError> {
        let category = match validate_draft(&draft) {
            Ok(category) => category,
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "maintenance request rejected");
                return Err(errors.into());
            }
        };

        let created_at = OffsetDateTime::now_utc();
        let ticket = Ticket {
            id: self.allocate_id(created_at),
            category,
            description: draft.description.trim().to_string(),
            location: draft.location.trim().to_string(),
            priority: draft.priority.unwrap_or_default(),
            status: TicketStatus::Pending,
            created_at,
            resolved_at: None,
        };

        self.tickets.insert(0, ticket.clone());
        tracing::info!(
            ticket_id = %ticket.id,
            category = %ticket.category,
            priority = %ticket.priority,
            "maintenance request created"
        );

        self.listener.ticket_created(&ticket);

        Ok(ticket)
    }

    /// Sets the status of one ticket. Any target status is accepted.
    pub fn advance_status(&mut self, id: &str, status: TicketStatus) -> Result<Ticket, AppError> {
        let trimmed_id = id.trim();
        let ticket = self
            .tickets
            .iter_mut()
            .find(|ticket| ticket.id == trimmed_id)
            .ok_or_else(|| not_found(trimmed_id))?;

        let previous = ticket.status;
        ticket.status = status;
        ticket.resolved_at = if status == TicketStatus::Completed {
            Some(OffsetDateTime::now_utc())
        } else {
            None
        };

        tracing::info!(
            ticket_id = %ticket.id,
            from = %previous,
            to = %status,
            "maintenance request status updated"
        );

        Ok(ticket.clone())
    }

    /// Moves a ticket one stage along pending → assigned → in-progress → completed.
    pub fn advance_to_next(&mut self, id: &str) -> Result<Ticket, AppError> {
        let current = self.get(id)?.status;
        let next = current
            .next()
            .ok_or_else(|| AppError::invalid_input("request is already completed"))?;
        self.advance_status(id, next)
    }

    pub fn query(&self, filter: StatusFilter, search: &str) -> Vec<&Ticket> {
        let needle = search.to_lowercase();
        let matched: Vec<&Ticket> = self
            .tickets
            .iter()
            .filter(|ticket| filter.matches(ticket.status))
            .filter(|ticket| needle.is_empty() || ticket_matches(ticket, &needle))
            .collect();

        tracing::debug!(
            filter = %filter,
            search,
            matched = matched.len(),
            "maintenance requests queried"
        );

        matched
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for ticket in &self.tickets {
            match ticket.status {
                TicketStatus::Pending => counts.pending += 1,
                TicketStatus::Assigned => counts.assigned += 1,
                TicketStatus::InProgress => counts.in_progress += 1,
                TicketStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    fn contains(&self, id: &str) -> bool {
        self.tickets.iter().any(|ticket| ticket.id == id)
    }

    fn allocate_id(&self, now: OffsetDateTime) -> String {
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        let mut id = millis.to_string();
        let mut suffix = 1;
        while self.contains(&id) {
            id = format!("{millis}-{suffix}");
            suffix += 1;
        }
        id
    }
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("maintenance request '{id}' not found"))
}

/// Seeded tickets must be addressable by id and satisfy the form rules.
fn check_seeded(ticket: &Ticket) -> Result<(), AppError> {
    let problem = if ticket.id.is_empty() {
        Some("id is empty")
    } else if ticket.id.trim() != ticket.id {
        Some("id has surrounding whitespace")
    } else if ticket.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        Some("description is shorter than 10 characters")
    } else if ticket.location.trim().is_empty() {
        Some("location is blank")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(AppError::invalid_data(format!(
            "seeded ticket '{}': {problem}",
            ticket.id
        ))),
        None => Ok(()),
    }
}

fn ticket_matches(ticket: &Ticket, needle: &str) -> bool {
    ticket.description.to_lowercase().contains(needle)
        || ticket.location.to_lowercase().contains(needle)
        || ticket.category.as_str().to_lowercase().contains(needle)
}

fn validate_draft(draft: &TicketDraft) -> Result<Category, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let raw_category = draft.category.trim();
    let category = if raw_category.is_empty() {
        errors.insert(TicketField::Category, "Category is required");
        None
    } else {
        let parsed = Category::parse(raw_category);
        if parsed.is_none() {
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            errors.insert(
                TicketField::Category,
                format!("Category must be one of {}", names.join(", ")),
            );
        }
        parsed
    };

    let description = draft.description.trim();
    if description.is_empty() {
        errors.insert(TicketField::Description, "Description is required");
    } else if description.chars().count() < MIN_DESCRIPTION_CHARS {
        errors.insert(
            TicketField::Description,
            "Description should be at least 10 characters",
        );
    }

    if draft.location.trim().is_empty() {
        errors.insert(TicketField::Location, "Location is required");
    }

    match category {
        Some(category) if errors.is_empty() => Ok(category),
        _ => Err(errors),
    }
}
