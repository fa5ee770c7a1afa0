use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::chat::{resolve_conversation, send_message, ChatScope, SendMessageRequest};
use crate::error::AppError;
use crate::models::availability::DriverAvailability;
use crate::models::issue::DeliveryIssue;
use crate::models::message::{ChatMessage, ConversationKey, Sender};
use crate::models::order::{sort_for_driver, Order, OrderStatus};
use crate::models::route::RoutePlan;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/driver/:driver_id/order", get(list_driver_orders))
        .route("/driver/:driver_id/order/:order_id", put(update_order_status))
        // Legacy path quirk: the first segment of the issue route carries the
        // order id, not a driver id.
        .route("/driver/:driver_id/order/deliveryIssue", post(report_issue))
        .route(
            "/driver/:driver_id/deliverymessage",
            get(list_driver_messages)
                .post(send_driver_message)
                .delete(resolve_driver_conversation),
        )
        .route("/driver/:driver_id/route", get(driver_route))
        .route(
            "/driver/:driver_id/driveravailability",
            get(list_availability).post(create_availability),
        )
        .route(
            "/driver/:driver_id/driveravailability/:availability_id",
            put(update_availability),
        )
}

// ---- orders ----

async fn list_driver_orders(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
) -> Json<Vec<Order>> {
    Json(orders_for_driver(&state, driver_id))
}

fn orders_for_driver(state: &AppState, driver_id: i64) -> Vec<Order> {
    let mut orders: Vec<Order> = state
        .orders
        .iter()
        .filter(|entry| entry.value().driver_id == driver_id)
        .map(|entry| entry.value().clone())
        .collect();
    sort_for_driver(&mut orders);
    orders
}

/// Typed patch of the fields a driver may change. Only `status` today; new
/// fields get added here rather than built from raw request keys.
#[derive(Deserialize)]
pub struct OrderPatch {
    pub status: Option<String>,
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path((driver_id, order_id)): Path<(i64, i64)>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<Order>, AppError> {
    let Some(raw_status) = patch.status else {
        return Err(AppError::BadRequest("no valid fields to update".to_string()));
    };
    let status: OrderStatus = raw_status.parse().map_err(AppError::BadRequest)?;

    // One entry lock covers the ownership check and the write.
    let mut order = state
        .orders
        .get_mut(&order_id)
        .filter(|order| order.driver_id == driver_id)
        .ok_or_else(|| {
            AppError::NotFound(format!("order {order_id} not found for this driver"))
        })?;

    order.status = status;
    state
        .metrics
        .status_updates_total
        .with_label_values(&[status.as_str()])
        .inc();
    info!(driver_id, order_id, status = %status, "order status updated");

    Ok(Json(order.clone()))
}

// ---- delivery issues ----

#[derive(Deserialize)]
pub struct IssueReport {
    #[serde(rename = "issueID")]
    pub issue_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

async fn report_issue(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    Json(body): Json<IssueReport>,
) -> Result<(StatusCode, Json<DeliveryIssue>), AppError> {
    let issue_id = body.issue_id.ok_or_else(|| AppError::missing_field("issueID"))?;
    let timestamp = body.timestamp.ok_or_else(|| AppError::missing_field("timestamp"))?;
    let description = body
        .description
        .ok_or_else(|| AppError::missing_field("description"))?;

    if description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "description cannot be empty".to_string(),
        ));
    }

    let issue = DeliveryIssue {
        issue_id,
        order_id,
        timestamp,
        description,
    };

    // The legacy API never verified the order exists; the issue log is
    // append-only and keyed by the caller-supplied id alone.
    match state.issues.entry(issue_id) {
        Entry::Occupied(_) => {
            return Err(AppError::Conflict(format!("issue {issue_id} already exists")));
        }
        Entry::Vacant(slot) => {
            slot.insert(issue.clone());
        }
    }

    state.metrics.delivery_issues_total.inc();
    info!(order_id, issue_id, "delivery issue reported");

    Ok((StatusCode::CREATED, Json(issue)))
}

// ---- driver chat ----

fn driver_key(driver_id: i64, scope: &ChatScope) -> ConversationKey {
    ConversationKey::Driver {
        driver_id,
        order_id: scope.order,
    }
}

async fn list_driver_messages(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
    Query(scope): Query<ChatScope>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let messages = state.chat.list(&driver_key(driver_id, &scope))?;
    Ok(Json(messages))
}

async fn send_driver_message(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
    Query(scope): Query<ChatScope>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let key = driver_key(driver_id, &scope);
    let message = send_message(&state, &key, body, Sender::Driver, "driver")?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn resolve_driver_conversation(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
    Query(scope): Query<ChatScope>,
) -> Result<Json<Value>, AppError> {
    resolve_conversation(&state, &driver_key(driver_id, &scope), "driver")?;
    Ok(Json(json!({ "message": "conversation resolved" })))
}

// ---- route view ----

async fn driver_route(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
) -> Json<RoutePlan> {
    Json(RoutePlan::from_orders(orders_for_driver(&state, driver_id)))
}

// ---- availability ----

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub date: Option<NaiveDate>,
    #[serde(rename = "availStartTime")]
    pub avail_start_time: Option<NaiveTime>,
    #[serde(rename = "availEndTime")]
    pub avail_end_time: Option<NaiveTime>,
    #[serde(rename = "isAvailable")]
    pub is_available: Option<bool>,
}

async fn list_availability(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
) -> Json<Vec<DriverAvailability>> {
    let mut rows: Vec<DriverAvailability> = state
        .availability
        .iter()
        .filter(|entry| entry.value().driver_id == driver_id)
        .map(|entry| entry.value().clone())
        .collect();
    rows.sort_by_key(|row| row.date);
    Json(rows)
}

async fn create_availability(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<i64>,
    Json(body): Json<AvailabilityRequest>,
) -> Result<(StatusCode, Json<DriverAvailability>), AppError> {
    let date = body.date.ok_or_else(|| AppError::missing_field("date"))?;
    let avail_start_time = body
        .avail_start_time
        .ok_or_else(|| AppError::missing_field("availStartTime"))?;
    let avail_end_time = body
        .avail_end_time
        .ok_or_else(|| AppError::missing_field("availEndTime"))?;
    let is_available = body
        .is_available
        .ok_or_else(|| AppError::missing_field("isAvailable"))?;

    match state.availability.entry((driver_id, date)) {
        Entry::Occupied(_) => Err(AppError::Conflict(
            "availability already exists for this date".to_string(),
        )),
        Entry::Vacant(slot) => {
            let row = DriverAvailability {
                availability_id: state.next_availability_id(),
                driver_id,
                date,
                avail_start_time,
                avail_end_time,
                is_available,
            };
            slot.insert(row.clone());
            Ok((StatusCode::CREATED, Json(row)))
        }
    }
}

async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path((driver_id, availability_id)): Path<(i64, i64)>,
    Json(patch): Json<AvailabilityRequest>,
) -> Result<Json<DriverAvailability>, AppError> {
    if patch.date.is_none()
        && patch.avail_start_time.is_none()
        && patch.avail_end_time.is_none()
        && patch.is_available.is_none()
    {
        return Err(AppError::BadRequest("no valid fields to update".to_string()));
    }

    let current_key = state
        .availability
        .iter()
        .find_map(|entry| {
            let row = entry.value();
            (row.availability_id == availability_id && row.driver_id == driver_id)
                .then(|| *entry.key())
        })
        .ok_or_else(|| AppError::NotFound("availability entry not found".to_string()))?;

    let apply = |row: &mut DriverAvailability| {
        if let Some(start) = patch.avail_start_time {
            row.avail_start_time = start;
        }
        if let Some(end) = patch.avail_end_time {
            row.avail_end_time = end;
        }
        if let Some(available) = patch.is_available {
            row.is_available = available;
        }
    };

    // A date change moves the row to a new (driver, date) key. The old row
    // is taken out first so no two entry locks are ever held at once.
    if let Some(new_date) = patch.date.filter(|d| *d != current_key.1) {
        let (_, previous) = state
            .availability
            .remove(&current_key)
            .ok_or_else(|| AppError::NotFound("availability entry not found".to_string()))?;

        let mut row = previous.clone();
        row.date = new_date;
        apply(&mut row);

        let conflicted = match state.availability.entry((driver_id, new_date)) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                false
            }
        };

        if conflicted {
            state.availability.insert(current_key, previous);
            return Err(AppError::Conflict(
                "availability already exists for this date".to_string(),
            ));
        }
        Ok(Json(row))
    } else {
        let mut row = state
            .availability
            .get_mut(&current_key)
            .ok_or_else(|| AppError::NotFound("availability entry not found".to_string()))?;
        apply(&mut row);
        Ok(Json(row.clone()))
    }
}
