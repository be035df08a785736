//! Organizer service implementation
//!
//! Dashboards, per-event reports, participant lists and the refund queue.

use tracing::info;

use super::http::ApiClient;
use crate::models::{DashboardStats, Event, EventReport, Participant, RefundDecision, RefundRequestSummary};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct OrganizerService {
    api: ApiClient,
}

impl OrganizerService {
    /// Create a new OrganizerService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.api.get("/organizer/dashboard").await
    }

    pub async fn get_events(&self) -> Result<Vec<Event>> {
        self.api.get("/organizer/events").await
    }

    pub async fn get_event_report(&self, event_id: &str) -> Result<EventReport> {
        let path = format!("/organizer/events/{}/report", urlencoding::encode(event_id));
        self.api.get(&path).await
    }

    pub async fn get_participants(&self, event_id: &str) -> Result<Vec<Participant>> {
        let path = format!("/organizer/events/{}/participants", urlencoding::encode(event_id));
        self.api.get(&path).await
    }

    pub async fn get_refund_requests(&self) -> Result<Vec<RefundRequestSummary>> {
        self.api.get("/organizer/refunds").await
    }

    pub async fn approve_refund(&self, refund_id: &str, note: Option<String>) -> Result<RefundRequestSummary> {
        let path = format!("/organizer/refunds/{}/approve", urlencoding::encode(refund_id));
        let summary: RefundRequestSummary = self.api.post(&path, &RefundDecision { note }).await?;
        info!(refund_id = %refund_id, "Refund approved");
        Ok(summary)
    }

    pub async fn reject_refund(&self, refund_id: &str, note: Option<String>) -> Result<RefundRequestSummary> {
        let path = format!("/organizer/refunds/{}/reject", urlencoding::encode(refund_id));
        let summary: RefundRequestSummary = self.api.post(&path, &RefundDecision { note }).await?;
        info!(refund_id = %refund_id, "Refund rejected");
        Ok(summary)
    }
}
