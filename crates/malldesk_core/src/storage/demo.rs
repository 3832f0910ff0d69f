use crate::model::{Category, Priority, Ticket, TicketStatus};
use std::time::Duration as StdDuration;
use time::{Duration, OffsetDateTime};

/// The dashboard's sample requests, timestamped relative to `now`.
pub fn demo_tickets(now: OffsetDateTime) -> Vec<Ticket> {
    vec![
        Ticket {
            id: "1".to_string(),
            category: Category::Plumbing,
            description: "Water leak in food court restroom".to_string(),
            location: "Food Court, Ground Floor".to_string(),
            priority: Priority::High,
            status: TicketStatus::Pending,
            created_at: now - Duration::days(2),
            resolved_at: None,
        },
        Ticket {
            id: "2".to_string(),
            category: Category::Electrical,
            description: "Flickering lights in corridor near Store #124".to_string(),
            location: "West Wing, First Floor".to_string(),
            priority: Priority::Medium,
            status: TicketStatus::InProgress,
            created_at: now - Duration::days(1),
            resolved_at: None,
        },
        Ticket {
            id: "3".to_string(),
            category: Category::Hvac,
            description: "AC not working properly in the main atrium".to_string(),
            location: "Main Atrium, Ground Floor".to_string(),
            priority: Priority::High,
            status: TicketStatus::Assigned,
            created_at: now - Duration::hours(12),
            resolved_at: None,
        },
        Ticket {
            id: "4".to_string(),
            category: Category::General,
            description: "Broken tile near entrance".to_string(),
            location: "Main Entrance, Ground Floor".to_string(),
            priority: Priority::Low,
            status: TicketStatus::Completed,
            created_at: now - Duration::days(2),
            resolved_at: Some(now - Duration::days(1)),
        },
    ]
}

/// Simulated fetch: waits out `delay`, then resolves once with the demo set.
pub fn fetch_demo_tickets(delay: StdDuration) -> Vec<Ticket> {
    if !delay.is_zero() {
        tracing::debug!(delay_ms = delay.as_millis() as u64, "simulating request fetch");
        std::thread::sleep(delay);
    }
    demo_tickets(OffsetDateTime::now_utc())
}
