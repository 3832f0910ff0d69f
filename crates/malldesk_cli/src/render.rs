use malldesk_core::config::Palette;
use malldesk_core::error::AppError;
use malldesk_core::model::{Priority, Ticket, TicketStatus};
use malldesk_core::ticket_api::StatusCounts;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const REPORTED_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Clock,
    ClipboardCheck,
    Tool,
    CheckCircle,
    AlertTriangle,
}

impl Icon {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Clock => "◷",
            Self::ClipboardCheck => "▣",
            Self::Tool => "⚒",
            Self::CheckCircle => "✔",
            Self::AlertTriangle => "⚠",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub icon: Icon,
    pub label: &'static str,
}

impl Badge {
    pub fn text(&self) -> String {
        format!("{} {}", self.icon.glyph(), self.label)
    }
}

pub fn status_badge(status: TicketStatus) -> Badge {
    match status {
        TicketStatus::Pending => Badge {
            icon: Icon::Clock,
            label: "Pending",
        },
        TicketStatus::Assigned => Badge {
            icon: Icon::ClipboardCheck,
            label: "Assigned",
        },
        TicketStatus::InProgress => Badge {
            icon: Icon::Tool,
            label: "In Progress",
        },
        TicketStatus::Completed => Badge {
            icon: Icon::CheckCircle,
            label: "Completed",
        },
    }
}

pub fn priority_badge(priority: Priority) -> Badge {
    match priority {
        Priority::High => Badge {
            icon: Icon::AlertTriangle,
            label: "High Priority",
        },
        Priority::Medium => Badge {
            icon: Icon::Clock,
            label: "Medium Priority",
        },
        Priority::Low => Badge {
            icon: Icon::CheckCircle,
            label: "Low Priority",
        },
    }
}

/// Label of the action that moves a request to its next stage.
pub fn next_action_label(status: TicketStatus) -> Option<&'static str> {
    match status {
        TicketStatus::Pending => Some("Assign"),
        TicketStatus::Assigned => Some("Start Work"),
        TicketStatus::InProgress => Some("Mark Complete"),
        TicketStatus::Completed => None,
    }
}

pub fn format_date(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(REPORTED_FORMAT)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Reported")]
    reported: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn tickets_table(tickets: &[&Ticket]) -> Result<String, AppError> {
    let mut rows = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        rows.push(TicketRow {
            id: ticket.id.clone(),
            status: status_badge(ticket.status).text(),
            priority: ticket.priority.to_string(),
            category: ticket.category.to_string(),
            location: ticket.location.clone(),
            reported: format_date(ticket.created_at)?,
            description: ticket.description.clone(),
        });
    }

    Ok(Table::new(rows).with(Style::psql()).to_string())
}

/// Message shown when a query matches nothing.
pub fn empty_list_hint(filtered: bool) -> &'static str {
    if filtered {
        "Try adjusting your filters or search terms"
    } else {
        "Create a new maintenance request to get started"
    }
}

pub fn ticket_details(ticket: &Ticket, palette: &Palette) -> Result<Vec<String>, AppError> {
    let priority = priority_badge(ticket.priority).text();
    let priority = if ticket.priority == Priority::High {
        palette.alertize(&priority)
    } else {
        priority
    };

    let mut lines = vec![
        format!(
            "{} | {} | {}",
            palette.accentize(&ticket.category.to_string()),
            status_badge(ticket.status).text(),
            priority
        ),
        format!("ID: {}", ticket.id),
        palette.mutedize(&format!("Reported {}", format_date(ticket.created_at)?)),
        ticket.description.clone(),
        format!("Location: {}", ticket.location),
    ];

    if let Some(resolved_at) = ticket.resolved_at {
        lines.push(format!("Resolved {}", format_date(resolved_at)?));
    }
    if let Some(action) = next_action_label(ticket.status) {
        lines.push(palette.mutedize(&format!("Next: {action} (malldesk next {})", ticket.id)));
    }

    Ok(lines)
}

pub fn stats_lines(counts: &StatusCounts, requests_counter: usize) -> Vec<String> {
    let mut lines = vec![
        format!("Maintenance requests: {requests_counter}"),
        format!("Open: {}", counts.open()),
    ];
    for status in TicketStatus::ALL {
        lines.push(format!(
            "{}: {}",
            status_badge(status).label,
            counts.get(status)
        ));
    }
    lines
}

pub fn stats_json(counts: &StatusCounts, requests_counter: usize) -> serde_json::Value {
    serde_json::json!({
        "maintenance_requests": requests_counter,
        "open": counts.open(),
        "total": counts.total(),
        "pending": counts.pending,
        "assigned": counts.assigned,
        "in-progress": counts.in_progress,
        "completed": counts.completed,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        Icon, format_date, next_action_label, priority_badge, stats_lines, status_badge,
        ticket_details, tickets_table,
    };
    use malldesk_core::config::palette_for_theme;
    use malldesk_core::model::{Category, Priority, Ticket, TicketStatus};
    use malldesk_core::ticket_api::StatusCounts;
    use time::macros::datetime;

    fn ticket(status: TicketStatus) -> Ticket {
        Ticket {
            id: "3".to_string(),
            category: Category::Hvac,
            description: "AC not working properly in the main atrium".to_string(),
            location: "Main Atrium, Ground Floor".to_string(),
            priority: Priority::High,
            status,
            created_at: datetime!(2025-12-05 09:30 UTC),
            resolved_at: if status == TicketStatus::Completed {
                Some(datetime!(2025-12-06 10:00 UTC))
            } else {
                None
            },
        }
    }

    #[test]
    fn badges_map_to_fixed_icons() {
        assert_eq!(status_badge(TicketStatus::InProgress).icon, Icon::Tool);
        assert_eq!(status_badge(TicketStatus::InProgress).label, "In Progress");
        assert_eq!(priority_badge(Priority::High).icon, Icon::AlertTriangle);
        assert_eq!(priority_badge(Priority::Low).text(), "✔ Low Priority");
    }

    #[test]
    fn next_action_follows_lifecycle() {
        assert_eq!(next_action_label(TicketStatus::Pending), Some("Assign"));
        assert_eq!(next_action_label(TicketStatus::Assigned), Some("Start Work"));
        assert_eq!(
            next_action_label(TicketStatus::InProgress),
            Some("Mark Complete")
        );
        assert_eq!(next_action_label(TicketStatus::Completed), None);
    }

    #[test]
    fn format_date_uses_short_month() {
        assert_eq!(format_date(datetime!(2025-12-05 09:30 UTC)).unwrap(), "Dec 5, 2025");
    }

    #[test]
    fn tickets_table_lists_each_ticket() {
        let pending = ticket(TicketStatus::Pending);
        let table = tickets_table(&[&pending]).unwrap();

        assert!(table.contains("Category"));
        assert!(table.contains("HVAC"));
        assert!(table.contains("Pending"));
        assert!(table.contains("Dec 5, 2025"));
    }

    #[test]
    fn ticket_details_show_resolution_or_next_step() {
        let palette = palette_for_theme(None);

        let open = ticket_details(&ticket(TicketStatus::Assigned), &palette).unwrap();
        assert!(open.iter().any(|line| line.contains("Next: Start Work")));
        assert!(!open.iter().any(|line| line.starts_with("Resolved")));

        let done = ticket_details(&ticket(TicketStatus::Completed), &palette).unwrap();
        assert!(done.iter().any(|line| line == "Resolved Dec 6, 2025"));
        assert!(!done.iter().any(|line| line.contains("Next:")));
    }

    #[test]
    fn stats_lines_report_counter_and_statuses() {
        let counts = StatusCounts {
            pending: 2,
            assigned: 1,
            in_progress: 0,
            completed: 3,
        };
        let lines = stats_lines(&counts, 13);

        assert_eq!(lines[0], "Maintenance requests: 13");
        assert_eq!(lines[1], "Open: 3");
        assert!(lines.contains(&"In Progress: 0".to_string()));
        assert!(lines.contains(&"Completed: 3".to_string()));
    }
}
