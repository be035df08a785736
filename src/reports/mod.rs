//! Organizer reports
//!
//! Derived dashboard metrics and CSV exports built from data fetched by
//! [`crate::services::OrganizerService`].

pub mod csv;
pub mod stats;

pub use csv::{escape_field, export_event_sales, export_participants, export_refund_requests, CsvExport};
pub use stats::{event_metrics, summaries_by_revenue, summarize_dashboard, DashboardSummary, EventMetrics, ParticipantStats};
