//! Data models module
//!
//! Client-side DTOs mirrored from the platform API

pub mod api;
pub mod event;
pub mod pricing;
pub mod report;
pub mod subscription;
pub mod ticket;
pub mod user;

// Re-export commonly used models
pub use api::{ApiResponse, Paginated};
pub use event::{CreateEventRequest, Event, EventFilter, EventStatus, EventSummary, OrganizerRef, UpdateEventRequest};
pub use pricing::{PriceBreakdown, PricingRules};
pub use report::{DailySales, DashboardStats, EventReport, EventSales, Participant, RefundDecision, RefundRequestSummary};
pub use subscription::{BillingInterval, Plan, PlanTier, Subscription, SubscriptionCheckout, SubscriptionCheckoutRequest, SubscriptionStatus};
pub use ticket::{
    AttendeeInfo, AttendeeUpdate, ConfirmPurchaseRequest, PaymentIntentRequest, PaymentIntentResponse, PaymentStatus,
    RefundRequest, RefundStatus, TicketDetail, TicketOrder,
};
pub use user::{AuthPayload, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserRole};
