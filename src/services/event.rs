//! Event service implementation
//!
//! Public event browsing plus organizer-side event management.

use reqwest::Method;
use tracing::{debug, info};

use super::http::ApiClient;
use crate::models::{CreateEventRequest, Event, EventFilter, Paginated, UpdateEventRequest};
use crate::utils::errors::{Result, TicketflowError};

#[derive(Debug, Clone)]
pub struct EventService {
    api: ApiClient,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_events(&self, filter: &EventFilter) -> Result<Paginated<Event>> {
        debug!(filter = ?filter, "Listing events");
        self.api.get_with_query("/events", &filter.query_pairs()).await
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Event> {
        let path = format!("/events/{}", urlencoding::encode(event_id));
        match self.api.get(&path).await {
            Err(TicketflowError::Api { status: 404, .. }) => Err(TicketflowError::NotFound {
                resource: "Event",
                id: event_id.to_string(),
            }),
            other => other,
        }
    }

    pub async fn get_categories(&self) -> Result<Vec<String>> {
        self.api.get("/events/categories").await
    }

    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<Event> {
        validate_new_event(request)?;
        let event: Event = self.api.post("/events", request).await?;
        info!(event_id = %event.id, title = %event.title, "Event created");
        Ok(event)
    }

    pub async fn update_event(&self, event_id: &str, request: &UpdateEventRequest) -> Result<Event> {
        if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
            if end <= start {
                return Err(TicketflowError::InvalidInput("Event must end after it starts".to_string()));
            }
        }
        let path = format!("/events/{}", urlencoding::encode(event_id));
        let event: Event = self.api.put(&path, request).await?;
        info!(event_id = %event.id, "Event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        let path = format!("/events/{}", urlencoding::encode(event_id));
        self.api.send_unit::<()>(Method::DELETE, &path, None).await?;
        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }
}

fn validate_new_event(request: &CreateEventRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(TicketflowError::InvalidInput("Event title is required".to_string()));
    }
    if request.end_date <= request.start_date {
        return Err(TicketflowError::InvalidInput("Event must end after it starts".to_string()));
    }
    if request.capacity == 0 {
        return Err(TicketflowError::InvalidInput("Capacity must be greater than 0".to_string()));
    }
    if request.price.is_sign_negative() {
        return Err(TicketflowError::InvalidInput("Price cannot be negative".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn test_new_event_validation() {
        let start = Utc::now() + Duration::days(10);
        let mut request = CreateEventRequest {
            title: "Winter Ball".to_string(),
            description: None,
            start_date: start,
            end_date: start + Duration::hours(5),
            location: "Luzern".to_string(),
            price: Decimal::new(80, 0),
            capacity: 300,
            category: Some("dance".to_string()),
            image_url: None,
        };
        assert!(validate_new_event(&request).is_ok());

        request.end_date = start;
        assert!(validate_new_event(&request).is_err());

        request.end_date = start + Duration::hours(1);
        request.capacity = 0;
        assert!(validate_new_event(&request).is_err());
    }
}
