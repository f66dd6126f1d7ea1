//! API routes for helpdeskd
//!
//! All routes live under `/v1`. The acting user comes from the `x-user-id`
//! header; errors answer with the status from `DeskError::status_code` and
//! an [`ErrorBody`].

use crate::desk::{NewZoomAccount, TicketFilter, WorkOrderFilter};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use helpdesk_shared::api::{ErrorBody, HealthResponse, MarkedRead, NotificationFeed};
use helpdesk_shared::booking::{MeetingAction, NewMeetingTicket, ZoomAccount};
use helpdesk_shared::inventory::{InventoryInput, InventoryItem};
use helpdesk_shared::repair::{NewRepairTicket, RepairAction};
use helpdesk_shared::work_order::{NewWorkOrder, WorkOrderAction};
use helpdesk_shared::{
    DeskError, Notification, Ticket, User, WorkOrder, WorkOrderStatus, USER_HEADER, VERSION,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

type AppStateArc = Arc<AppState>;
type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<T, ApiError>;

fn api_error(err: DeskError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("  Request failed: {}", err);
    } else {
        debug!("  Request refused ({}): {}", status, err);
    }
    (status, Json(ErrorBody::from(&err)))
}

/// Acting user id from the request headers
fn acting_user(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            api_error(DeskError::forbidden(format!(
                "missing {} header",
                USER_HEADER
            )))
        })
}

// ============================================================================
// Health & Users
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> ApiResult<Json<HealthResponse>> {
    let desk = state.desk.read().await;
    let counts = desk.counts().map_err(api_error)?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        counts,
    }))
}

pub fn user_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/users", get(list_users))
}

async fn list_users(State(state): State<AppStateArc>) -> ApiResult<Json<Vec<User>>> {
    let desk = state.desk.read().await;
    desk.users().map(Json).map_err(api_error)
}

// ============================================================================
// Ticket Routes
// ============================================================================

pub fn ticket_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/tickets", get(list_tickets))
        .route("/v1/tickets/repair", post(create_repair))
        .route("/v1/tickets/meeting", post(create_meeting))
        .route("/v1/tickets/:id", get(get_ticket))
        .route("/v1/tickets/:id/repair-actions", post(repair_action))
        .route("/v1/tickets/:id/meeting-actions", post(meeting_action))
        .route("/v1/tickets/:id/work-orders", post(request_work_order))
}

#[derive(Debug, Default, Deserialize)]
struct TicketQuery {
    #[serde(rename = "type")]
    ticket_type: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
    requester: Option<String>,
}

async fn list_tickets(
    State(state): State<AppStateArc>,
    Query(q): Query<TicketQuery>,
) -> ApiResult<Json<Vec<Ticket>>> {
    let filter = TicketFilter::parse(
        q.ticket_type.as_deref(),
        q.status.as_deref(),
        q.assignee.as_deref(),
        q.requester.as_deref(),
    )
    .map_err(api_error)?;
    let desk = state.desk.read().await;
    desk.tickets(&filter).map(Json).map_err(api_error)
}

async fn get_ticket(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ticket>> {
    let desk = state.desk.read().await;
    desk.ticket(&id).map(Json).map_err(api_error)
}

async fn create_repair(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(req): Json<NewRepairTicket>,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    let ticket = desk.submit_repair(&user_id, req).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn create_meeting(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(req): Json<NewMeetingTicket>,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    let ticket = desk.submit_meeting(&user_id, req).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn repair_action(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(action): Json<RepairAction>,
) -> ApiResult<Json<Ticket>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.apply_repair_action(&user_id, &id, action)
        .map(Json)
        .map_err(api_error)
}

async fn meeting_action(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(action): Json<MeetingAction>,
) -> ApiResult<Json<Ticket>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.apply_meeting_action(&user_id, &id, action)
        .map(Json)
        .map_err(api_error)
}

async fn request_work_order(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<NewWorkOrder>,
) -> ApiResult<(StatusCode, Json<WorkOrder>)> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    let order = desk
        .request_work_order(&user_id, &id, req)
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(order)))
}

// ============================================================================
// Work Order Routes
// ============================================================================

pub fn work_order_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/work-orders", get(list_work_orders))
        .route("/v1/work-orders/:id", get(get_work_order))
        .route("/v1/work-orders/:id/actions", post(work_order_action))
}

#[derive(Debug, Default, Deserialize)]
struct WorkOrderQuery {
    ticket_id: Option<String>,
    status: Option<String>,
}

async fn list_work_orders(
    State(state): State<AppStateArc>,
    Query(q): Query<WorkOrderQuery>,
) -> ApiResult<Json<Vec<WorkOrder>>> {
    let status = q
        .status
        .as_deref()
        .map(str::parse::<WorkOrderStatus>)
        .transpose()
        .map_err(api_error)?;
    let filter = WorkOrderFilter {
        ticket_id: q.ticket_id,
        status,
    };
    let desk = state.desk.read().await;
    desk.work_orders(&filter).map(Json).map_err(api_error)
}

async fn get_work_order(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkOrder>> {
    let desk = state.desk.read().await;
    desk.work_order(&id).map(Json).map_err(api_error)
}

async fn work_order_action(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(action): Json<WorkOrderAction>,
) -> ApiResult<Json<WorkOrder>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.apply_work_order_action(&user_id, &id, action)
        .map(Json)
        .map_err(api_error)
}

// ============================================================================
// Notification Routes
// ============================================================================

pub fn notification_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/notifications", get(list_notifications))
        .route("/v1/notifications/read-all", post(mark_all_read))
        .route("/v1/notifications/:id/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<Json<NotificationFeed>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.read().await;
    desk.notifications(&user_id).map(Json).map_err(api_error)
}

async fn mark_read(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.mark_read(&user_id, &id).map(Json).map_err(api_error)
}

async fn mark_all_read(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<Json<MarkedRead>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    let marked = desk.mark_all_read(&user_id).map_err(api_error)?;
    Ok(Json(MarkedRead { marked }))
}

// ============================================================================
// Zoom Account Routes
// ============================================================================

pub fn zoom_routes() -> Router<AppStateArc> {
    Router::new()
        .route(
            "/v1/zoom-accounts",
            get(list_zoom_accounts).post(create_zoom_account),
        )
        .route("/v1/zoom-accounts/:id", delete(delete_zoom_account))
        .route(
            "/v1/zoom-accounts/:id/deactivate",
            post(deactivate_zoom_account),
        )
        .route("/v1/zoom-accounts/:id/schedule", get(account_schedule))
}

async fn list_zoom_accounts(
    State(state): State<AppStateArc>,
) -> ApiResult<Json<Vec<ZoomAccount>>> {
    let desk = state.desk.read().await;
    desk.zoom_accounts().map(Json).map_err(api_error)
}

async fn create_zoom_account(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(input): Json<NewZoomAccount>,
) -> ApiResult<(StatusCode, Json<ZoomAccount>)> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    let account = desk
        .create_zoom_account(&user_id, input)
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn deactivate_zoom_account(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<ZoomAccount>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.deactivate_zoom_account(&user_id, &id)
        .map(Json)
        .map_err(api_error)
}

async fn delete_zoom_account(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.delete_zoom_account(&user_id, &id).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    date: NaiveDate,
}

async fn account_schedule(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Query(q): Query<ScheduleQuery>,
) -> ApiResult<Json<Vec<Ticket>>> {
    let desk = state.desk.read().await;
    desk.schedule(&id, q.date).map(Json).map_err(api_error)
}

// ============================================================================
// Inventory Routes
// ============================================================================

pub fn inventory_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/inventory", get(list_inventory).post(create_inventory))
        .route("/v1/inventory/low-stock", get(low_stock))
        .route(
            "/v1/inventory/:id",
            put(update_inventory).delete(delete_inventory),
        )
}

async fn list_inventory(State(state): State<AppStateArc>) -> ApiResult<Json<Vec<InventoryItem>>> {
    let desk = state.desk.read().await;
    desk.inventory().map(Json).map_err(api_error)
}

async fn low_stock(State(state): State<AppStateArc>) -> ApiResult<Json<Vec<InventoryItem>>> {
    let desk = state.desk.read().await;
    desk.low_stock().map(Json).map_err(api_error)
}

async fn create_inventory(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(input): Json<InventoryInput>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    let item = desk
        .create_inventory_item(&user_id, input)
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_inventory(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<InventoryInput>,
) -> ApiResult<Json<InventoryItem>> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.update_inventory_item(&user_id, &id, input)
        .map(Json)
        .map_err(api_error)
}

async fn delete_inventory(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = acting_user(&headers)?;
    let desk = state.desk.write().await;
    desk.delete_inventory_item(&user_id, &id)
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
