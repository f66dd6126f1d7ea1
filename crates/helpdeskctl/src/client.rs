//! HTTP client for helpdeskd.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use helpdesk_shared::api::{ErrorBody, HealthResponse, MarkedRead, NotificationFeed};
use helpdesk_shared::booking::{MeetingAction, NewMeetingTicket, ZoomAccount};
use helpdesk_shared::repair::{NewRepairTicket, RepairAction};
use helpdesk_shared::work_order::{NewWorkOrder, WorkOrderAction};
use helpdesk_shared::{Notification, Ticket, User, WorkOrder, USER_HEADER};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default daemon URL
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:7870";

/// Request timeout (ms)
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Non-2xx answer from the daemon
#[derive(Debug, Clone)]
pub struct ServerError {
    pub status: u16,
    /// `ErrorBody::kind`, e.g. `forbidden` or `conflict`
    pub kind: String,
    pub message: String,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.message, self.status, self.kind)
    }
}

impl std::error::Error for ServerError {}

/// Ticket list filters, sent as query parameters
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkOrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Client for the helpdeskd HTTP API
#[derive(Debug, Clone)]
pub struct DeskClient {
    http: reqwest::Client,
    base_url: String,
    user: Option<String>,
}

impl DeskClient {
    /// `user` is sent as the acting user on every request
    pub fn new(base_url: &str, user: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/v1{}", self.base_url, path));
        match &self.user {
            Some(user) => builder.header(USER_HEADER, user),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = builder.send().await.map_err(|e| {
            if e.is_connect() {
                anyhow!(
                    "Cannot connect to helpdeskd at {}: {}\n\n\
                     Is the daemon running? Start it with: helpdeskd",
                    self.base_url,
                    e
                )
            } else if e.is_timeout() {
                anyhow!("Request to {} timed out", self.base_url)
            } else {
                anyhow!("HTTP error: {}", e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
                error: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                kind: "http".to_string(),
            });
            return Err(ServerError {
                status: status.as_u16(),
                kind: body.kind,
                message: body.error,
            }
            .into());
        }

        resp.json::<T>()
            .await
            .map_err(|e| anyhow!("Unexpected response from helpdeskd: {}", e))
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.send(self.request(Method::GET, "/health")).await
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.send(self.request(Method::GET, "/users")).await
    }

    pub async fn tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        self.send(self.request(Method::GET, "/tickets").query(query))
            .await
    }

    pub async fn ticket(&self, id: &str) -> Result<Ticket> {
        self.send(self.request(Method::GET, &format!("/tickets/{}", id)))
            .await
    }

    pub async fn submit_repair(&self, request: &NewRepairTicket) -> Result<Ticket> {
        self.send(self.request(Method::POST, "/tickets/repair").json(request))
            .await
    }

    pub async fn submit_meeting(&self, request: &NewMeetingTicket) -> Result<Ticket> {
        self.send(self.request(Method::POST, "/tickets/meeting").json(request))
            .await
    }

    pub async fn repair_action(&self, id: &str, action: &RepairAction) -> Result<Ticket> {
        let path = format!("/tickets/{}/repair-actions", id);
        self.send(self.request(Method::POST, &path).json(action))
            .await
    }

    pub async fn meeting_action(&self, id: &str, action: &MeetingAction) -> Result<Ticket> {
        let path = format!("/tickets/{}/meeting-actions", id);
        self.send(self.request(Method::POST, &path).json(action))
            .await
    }

    /// Raise a work order for an in-progress repair; the ticket goes on hold
    pub async fn request_work_order(
        &self,
        ticket_id: &str,
        request: &NewWorkOrder,
    ) -> Result<WorkOrder> {
        let path = format!("/tickets/{}/work-orders", ticket_id);
        self.send(self.request(Method::POST, &path).json(request))
            .await
    }

    pub async fn work_orders(&self, query: &WorkOrderQuery) -> Result<Vec<WorkOrder>> {
        self.send(self.request(Method::GET, "/work-orders").query(query))
            .await
    }

    pub async fn work_order_action(
        &self,
        id: &str,
        action: &WorkOrderAction,
    ) -> Result<WorkOrder> {
        let path = format!("/work-orders/{}/actions", id);
        self.send(self.request(Method::POST, &path).json(action))
            .await
    }

    pub async fn work_order(&self, id: &str) -> Result<WorkOrder> {
        self.send(self.request(Method::GET, &format!("/work-orders/{}", id)))
            .await
    }

    pub async fn notifications(&self) -> Result<NotificationFeed> {
        self.send(self.request(Method::GET, "/notifications")).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<Notification> {
        let path = format!("/notifications/{}/read", id);
        self.send(self.request(Method::POST, &path)).await
    }

    /// Returns how many notifications were unread
    pub async fn mark_all_read(&self) -> Result<usize> {
        let marked: MarkedRead = self
            .send(self.request(Method::POST, "/notifications/read-all"))
            .await?;
        Ok(marked.marked)
    }

    pub async fn zoom_accounts(&self) -> Result<Vec<ZoomAccount>> {
        self.send(self.request(Method::GET, "/zoom-accounts")).await
    }

    /// Approved bookings on `account_id` for `date`, by start time
    pub async fn schedule(&self, account_id: &str, date: NaiveDate) -> Result<Vec<Ticket>> {
        let path = format!("/zoom-accounts/{}/schedule", account_id);
        self.send(
            self.request(Method::GET, &path)
                .query(&[("date", date.to_string())]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = DeskClient::new("http://localhost:7870/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:7870");
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError {
            status: 409,
            kind: "conflict".to_string(),
            message: "Zoom 1 is booked".to_string(),
        };
        assert_eq!(err.to_string(), "Zoom 1 is booked (409 conflict)");
    }
}
