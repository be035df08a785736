//! CSV exports
//!
//! RFC 4180 output: CRLF line endings, and fields containing a comma, a
//! double quote, CR or LF are quoted with inner quotes doubled.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::models::{EventSales, Participant, PricingRules, RefundRequestSummary};
use crate::reports::stats::event_metrics;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_timestamp, sanitize_filename};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// A generated CSV document
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content_type: &'static str,
    pub content: String,
    rows: usize,
}

impl CsvExport {
    fn new(name: &str, (content, rows): (String, usize)) -> Self {
        Self {
            filename: format!("{}.csv", sanitize_filename(name)),
            content_type: CSV_CONTENT_TYPE,
            content,
            rows,
        }
    }

    /// Number of data rows, excluding the header. Quoted fields may span
    /// several lines, so this is not the line count.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Write the document into `dir` and return the full path
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        fs::write(&path, self.content.as_bytes()).await?;
        info!(path = %path.display(), bytes = self.content.len(), "CSV export written");
        Ok(path)
    }
}

/// Quote a field when it needs it
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn push_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field.as_ref()));
    }
    out.push_str("\r\n");
}

/// Render the document and count its data rows
fn build_csv(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> (String, usize) {
    let mut out = String::new();
    push_record(&mut out, headers);
    let mut count = 0;
    for row in rows {
        push_record(&mut out, row);
        count += 1;
    }
    (out, count)
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Participant list of one event
pub fn export_participants(event_title: &str, participants: &[Participant]) -> CsvExport {
    let csv = build_csv(
        &["Name", "Email", "Ticket Number", "Order ID", "Purchase Date", "Checked In", "Refund Status"],
        participants.iter().map(|p| {
            vec![
                p.name.clone(),
                p.email.clone(),
                p.ticket_number.clone(),
                p.order_id.clone(),
                format_timestamp(p.purchase_date),
                yes_no(p.checked_in),
                p.refund_status.to_string(),
            ]
        }),
    );

    CsvExport::new(&format!("{}-participants", event_title), csv)
}

/// Sales overview across events, with estimated fee split
pub fn export_event_sales(sales: &[EventSales], rules: &PricingRules) -> CsvExport {
    let csv = build_csv(
        &[
            "Event",
            "Start",
            "Capacity",
            "Tickets Sold",
            "Fill Rate %",
            "Revenue",
            "Platform Fee",
            "Organizer Payout",
            "Refunded",
            "Checked In",
        ],
        sales.iter().map(|s| {
            let metrics = event_metrics(s, rules);
            vec![
                s.title.clone(),
                format_timestamp(s.start_date),
                s.capacity.to_string(),
                s.tickets_sold.to_string(),
                format!("{:.1}", metrics.fill_rate),
                format!("{:.2}", metrics.gross_revenue),
                format!("{:.2}", metrics.platform_fee),
                format!("{:.2}", metrics.organizer_payout),
                s.tickets_refunded.to_string(),
                s.checked_in.to_string(),
            ]
        }),
    );

    CsvExport::new("event-sales", csv)
}

/// Organizer refund queue
pub fn export_refund_requests(requests: &[RefundRequestSummary]) -> CsvExport {
    let csv = build_csv(
        &["Request ID", "Event", "Order ID", "Requester", "Tickets", "Amount", "Status", "Requested At", "Reason"],
        requests.iter().map(|r| {
            vec![
                r.id.clone(),
                r.event_title.clone(),
                r.order_id.clone(),
                r.requester_email.clone(),
                r.ticket_numbers.join(" "),
                format!("{:.2}", r.amount),
                r.status.to_string(),
                format_timestamp(r.requested_at),
                r.reason.clone(),
            ]
        }),
    );

    CsvExport::new("refund-requests", csv)
}
