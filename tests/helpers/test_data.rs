//! Test data helpers
//!
//! JSON fixtures shaped like the platform API's payloads, plus typed
//! builders for tests that work without a server.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use ticketflow::models::{EventSummary, PaymentStatus, RefundStatus, TicketDetail, TicketOrder};

pub const TEST_PASSWORD: &str = "correct-horse";

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    exp: i64,
}

/// HS256 JWT for `user_id` expiring at `exp`
pub fn jwt(user_id: &str, exp: DateTime<Utc>) -> String {
    encode(
        &Header::default(),
        &Claims { sub: user_id, exp: exp.timestamp() },
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("encode test token")
}

pub fn valid_token() -> String {
    jwt("user-1", Utc::now() + Duration::hours(2))
}

pub fn expired_token() -> String {
    jwt("user-1", Utc::now() - Duration::hours(2))
}

pub fn user_json(role: &str) -> Value {
    json!({
        "id": "user-1",
        "email": "anna@example.ch",
        "firstName": "Anna",
        "lastName": "Muster",
        "role": role,
        "isSubscribed": role == "organizer",
        "preferredLanguage": "de",
        "createdAt": "2026-01-15T10:00:00Z"
    })
}

pub fn subscription_json(tier: &str, status: &str) -> Value {
    json!({
        "id": "sub_1",
        "plan": {
            "id": format!("plan_{}", tier),
            "name": tier,
            "tier": tier,
            "price": "29.00",
            "interval": "month",
            "features": ["reports", "csv-export"]
        },
        "status": status,
        "currentPeriodEnd": (Utc::now() + Duration::days(20)).to_rfc3339(),
        "cancelAtPeriodEnd": false,
        "stripeSubscriptionId": "sub_stripe_1"
    })
}

pub fn event_json(id: &str, capacity: u32, tickets_sold: u32) -> Value {
    let start = Utc::now() + Duration::days(14);
    json!({
        "id": id,
        "title": "Lindy Hop Night",
        "description": "Social dance with live band",
        "startDate": start.to_rfc3339(),
        "endDate": (start + Duration::hours(5)).to_rfc3339(),
        "location": "Volkshaus Zürich",
        "price": "35.00",
        "capacity": capacity,
        "ticketsSold": tickets_sold,
        "organizer": { "id": "org-1", "name": "Swing Club Zürich" },
        "category": "social",
        "status": "published"
    })
}

pub fn ticket_detail_json(name: &str, number: &str, refund_status: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.ch", name.to_lowercase()),
        "ticketNumber": number,
        "refundStatus": refund_status,
        "checkedIn": false
    })
}

pub fn order_json(order_id: &str, event_end: DateTime<Utc>, payment_status: &str, details: Vec<Value>) -> Value {
    let quantity = details.len();
    json!({
        "id": order_id,
        "event": {
            "id": "evt-1",
            "title": "Lindy Hop Night",
            "startDate": (event_end - Duration::hours(5)).to_rfc3339(),
            "endDate": event_end.to_rfc3339(),
            "location": "Volkshaus Zürich",
            "price": "35.00"
        },
        "userId": "user-1",
        "quantity": quantity,
        "totalPrice": format!("{}.00", 35 * quantity),
        "paymentStatus": payment_status,
        "paymentIntentId": "pi_123",
        "ticketDetails": details,
        "purchaseDate": (Utc::now() - Duration::days(2)).to_rfc3339()
    })
}

pub fn participant_json(name: &str, number: &str, checked_in: bool) -> Value {
    json!({
        "name": name,
        "email": "participant@example.ch",
        "ticketNumber": number,
        "orderId": "ord-1",
        "purchaseDate": "2026-10-01T18:30:00Z",
        "checkedIn": checked_in,
        "refundStatus": "none"
    })
}

/// Paid order for an upcoming event with the given ticket numbers
pub fn paid_order(ticket_numbers: &[&str]) -> TicketOrder {
    let end = Utc::now() + Duration::days(7);
    let price = Decimal::new(3500, 2);
    TicketOrder {
        id: "ord-1".to_string(),
        event: EventSummary {
            id: "evt-1".to_string(),
            title: "Lindy Hop Night".to_string(),
            start_date: end - Duration::hours(5),
            end_date: end,
            location: "Volkshaus Zürich".to_string(),
            price,
        },
        user_id: "user-1".to_string(),
        quantity: ticket_numbers.len() as u32,
        total_price: price * Decimal::from(ticket_numbers.len() as u64),
        payment_status: PaymentStatus::Paid,
        payment_intent_id: Some("pi_123".to_string()),
        ticket_details: ticket_numbers
            .iter()
            .map(|number| TicketDetail {
                name: "Anna Muster".to_string(),
                email: "anna@example.ch".to_string(),
                ticket_number: number.to_string(),
                refund_status: RefundStatus::None,
                checked_in: false,
            })
            .collect(),
        purchase_date: Utc::now() - Duration::days(2),
    }
}
