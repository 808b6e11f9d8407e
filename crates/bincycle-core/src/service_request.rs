//! Service request workflow
//!
//! ```text
//! Pending ─┐
//!          ├─ assign ─> Assigned ─ start ─> InProgress ─┐
//! Scheduled┘               │                            ├─ complete ─> Completed
//!                          └────────────────────────────┘
//! any non-terminal ─ cancel_request ─> Cancelled
//! ```
//!
//! Every transition is a compare-and-set on the current status, so two staff
//! members acting on the same request cannot interleave partial updates.

use std::sync::Arc;

use bincycle_db::{CreateServiceRequest, RequestUpdate, ServiceRequestRepository, Stores};
use bincycle_types::{
    ServiceRequest, ServiceRequestId, ServiceRequestStatus, Subscription, SubscriptionId, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::{day_bounds, month_bounds_this_year, start_of_day, today};
use crate::{EngineConfig, EngineError, EngineResult, Page};

use ServiceRequestStatus::{Assigned, Cancelled, Completed, InProgress, Scheduled};

/// Statuses a conditional update may start from
fn statuses_where(keep: fn(&ServiceRequestStatus) -> bool) -> Vec<ServiceRequestStatus> {
    ServiceRequestStatus::ALL
        .into_iter()
        .filter(|s| keep(s))
        .collect()
}

/// Service request workflow
#[derive(Clone)]
pub struct ServiceRequestWorkflow {
    requests: Arc<dyn ServiceRequestRepository>,
    config: EngineConfig,
}

impl ServiceRequestWorkflow {
    /// Create a new workflow
    pub fn new(requests: Arc<dyn ServiceRequestRepository>, config: EngineConfig) -> Self {
        Self { requests, config }
    }

    /// Create a workflow from the storage bundle
    pub fn from_stores(stores: &Stores, config: EngineConfig) -> Self {
        Self::new(Arc::clone(&stores.service_requests), config)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Place an ad-hoc request on the schedule for `requested_date`.
    ///
    /// Unlike the entity default (`Pending`), requests created here start
    /// out `Scheduled`.
    pub async fn create_request(
        &self,
        user_id: &UserId,
        service_type: &str,
        requested_date: DateTime<Utc>,
    ) -> EngineResult<ServiceRequest> {
        self.insert(user_id.clone(), None, service_type, requested_date)
            .await
    }

    /// Same as [`create_request`](Self::create_request), linked to a subscription
    pub async fn create_request_for_subscription(
        &self,
        subscription: &Subscription,
        service_type: &str,
        requested_date: DateTime<Utc>,
    ) -> EngineResult<ServiceRequest> {
        self.insert(
            subscription.user_id.clone(),
            Some(subscription.id),
            service_type,
            requested_date,
        )
        .await
    }

    async fn insert(
        &self,
        user_id: UserId,
        subscription_id: Option<SubscriptionId>,
        service_type: &str,
        requested_date: DateTime<Utc>,
    ) -> EngineResult<ServiceRequest> {
        let service_type = service_type.trim();
        if service_type.is_empty() {
            return Err(EngineError::Validation(
                "service type must not be empty".to_string(),
            ));
        }

        let request = self
            .requests
            .create(CreateServiceRequest {
                user_id,
                subscription_id,
                service_type: service_type.to_string(),
                status: Scheduled,
                requested_date,
                scheduled_date: Some(requested_date),
            })
            .await?;

        tracing::info!(
            request_id = %request.id,
            user_id = %request.user_id,
            service_type = %request.service_type,
            scheduled_date = %requested_date,
            "Service request created"
        );
        Ok(request)
    }

    /// Hand an unassigned request to an employee.
    ///
    /// Of two racing calls exactly one wins. Repeating the call with the
    /// winning employee succeeds without writing; any other employee gets
    /// `Conflict` and must go through [`reassign`](Self::reassign).
    pub async fn assign(
        &self,
        request_id: ServiceRequestId,
        employee_id: &UserId,
    ) -> EngineResult<ServiceRequest> {
        require_employee(employee_id)?;

        let update = RequestUpdate {
            status: Some(Assigned),
            assigned_employee_id: Some(employee_id.clone()),
            ..RequestUpdate::default()
        };
        if let Some(request) = self
            .requests
            .update_if_status(
                request_id,
                &statuses_where(ServiceRequestStatus::is_assignable),
                update,
            )
            .await?
        {
            tracing::info!(request_id = %request_id, employee_id = %employee_id, "Service request assigned");
            return Ok(request);
        }

        let current = self.require(request_id).await?;
        if current.status.is_in_hand() && current.assigned_employee_id.as_ref() == Some(employee_id) {
            tracing::debug!(request_id = %request_id, employee_id = %employee_id, "Already assigned to this employee");
            return Ok(current);
        }

        let reason = match &current.assigned_employee_id {
            Some(other) if current.status.is_in_hand() => {
                format!("service request {request_id} is already assigned to {other}")
            }
            _ => format!(
                "service request {request_id} cannot be assigned while {}",
                current.status
            ),
        };
        tracing::warn!(request_id = %request_id, employee_id = %employee_id, %reason, "Assignment rejected");
        Err(EngineError::Conflict(reason))
    }

    /// Explicitly move an assigned or in-progress request to another employee
    pub async fn reassign(
        &self,
        request_id: ServiceRequestId,
        employee_id: &UserId,
    ) -> EngineResult<ServiceRequest> {
        require_employee(employee_id)?;

        let update = RequestUpdate {
            assigned_employee_id: Some(employee_id.clone()),
            ..RequestUpdate::default()
        };
        let request = self
            .transition(
                request_id,
                &statuses_where(ServiceRequestStatus::is_in_hand),
                update,
                "reassign",
            )
            .await?;

        tracing::info!(request_id = %request_id, employee_id = %employee_id, "Service request reassigned");
        Ok(request)
    }

    /// Mark an assigned request as being worked on
    pub async fn start(&self, request_id: ServiceRequestId) -> EngineResult<ServiceRequest> {
        let update = RequestUpdate {
            status: Some(InProgress),
            ..RequestUpdate::default()
        };
        let request = self.transition(request_id, &[Assigned], update, "start").await?;

        tracing::info!(request_id = %request_id, "Service request started");
        Ok(request)
    }

    /// Record completion with notes (may be empty).
    ///
    /// Only assigned or in-progress requests can be completed; completing
    /// twice is a `Conflict` rather than an overwrite.
    pub async fn complete(
        &self,
        request_id: ServiceRequestId,
        notes: &str,
    ) -> EngineResult<ServiceRequest> {
        let update = RequestUpdate {
            status: Some(Completed),
            completed_date: Some(Utc::now()),
            notes: Some(notes.to_string()),
            ..RequestUpdate::default()
        };
        let request = self
            .transition(
                request_id,
                &statuses_where(ServiceRequestStatus::is_in_hand),
                update,
                "complete",
            )
            .await?;

        tracing::info!(
            request_id = %request_id,
            employee_id = ?request.assigned_employee_id,
            "Service request completed"
        );
        Ok(request)
    }

    /// Cancel a request that has not finished. Cancellation is final.
    pub async fn cancel_request(&self, request_id: ServiceRequestId) -> EngineResult<ServiceRequest> {
        let update = RequestUpdate {
            status: Some(Cancelled),
            ..RequestUpdate::default()
        };
        let request = self
            .transition(request_id, &statuses_where(|s| !s.is_terminal()), update, "cancel")
            .await?;

        tracing::info!(request_id = %request_id, "Service request cancelled");
        Ok(request)
    }

    async fn transition(
        &self,
        request_id: ServiceRequestId,
        expected: &[ServiceRequestStatus],
        update: RequestUpdate,
        action: &'static str,
    ) -> EngineResult<ServiceRequest> {
        if let Some(request) = self
            .requests
            .update_if_status(request_id, expected, update)
            .await?
        {
            return Ok(request);
        }

        let current = self.require(request_id).await?;
        tracing::warn!(
            request_id = %request_id,
            status = %current.status,
            action,
            "Service request transition rejected"
        );
        Err(EngineError::Conflict(format!(
            "cannot {action} service request {request_id} while {}",
            current.status
        )))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up a request
    pub async fn get(&self, request_id: ServiceRequestId) -> EngineResult<Option<ServiceRequest>> {
        Ok(self.requests.find_by_id(request_id).await?)
    }

    /// The user's open requests from today on, soonest first (capped)
    pub async fn upcoming_services(&self, user_id: &UserId) -> EngineResult<Vec<ServiceRequest>> {
        Ok(self
            .requests
            .find_upcoming_for_user(user_id, start_of_day(today()), self.config.upcoming_limit)
            .await?)
    }

    /// The employee's open requests scheduled on `date` (default today)
    pub async fn assigned_services(
        &self,
        employee_id: &UserId,
        date: Option<NaiveDate>,
    ) -> EngineResult<Vec<ServiceRequest>> {
        let (start, end) = day_bounds(date.unwrap_or_else(today))?;
        Ok(self
            .requests
            .find_assigned_between(employee_id, start, end)
            .await?)
    }

    /// Requests in exactly `Scheduled` status on `date` (default today).
    /// `Pending` requests are not included.
    pub async fn pending_services(&self, date: Option<NaiveDate>) -> EngineResult<Vec<ServiceRequest>> {
        let (start, end) = day_bounds(date.unwrap_or_else(today))?;
        Ok(self.requests.find_scheduled_between(start, end).await?)
    }

    /// All of the user's requests, latest first. `page_size` defaults to the configured size.
    pub async fn service_history(
        &self,
        user_id: &UserId,
        page_size: Option<i64>,
        page: i64,
    ) -> EngineResult<Vec<ServiceRequest>> {
        let page = Page::new(page_size.unwrap_or(self.config.history_page_size), page)?;
        Ok(self
            .requests
            .find_history_for_user(user_id, page.limit(), page.offset())
            .await?)
    }

    /// Every request, latest first, optionally limited to an inclusive
    /// scheduled-date range
    pub async fn all_service_requests(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> EngineResult<Vec<ServiceRequest>> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(EngineError::Validation(format!(
                    "range start {start} is after end {end}"
                )));
            }
        }
        Ok(self.requests.find_in_range(start, end).await?)
    }

    /// Requests the user had completed during `month` (1-12) of the current
    /// UTC year
    pub async fn completed_services_count(&self, user_id: &UserId, month: u32) -> EngineResult<i64> {
        let (start, end) = month_bounds_this_year(month)?;
        Ok(self
            .requests
            .count_completed_for_user_between(user_id, start, end)
            .await?)
    }

    /// Requests of any status scheduled on `date`
    pub async fn scheduled_count_on(&self, date: NaiveDate) -> EngineResult<i64> {
        let (start, end) = day_bounds(date)?;
        Ok(self.requests.count_scheduled_between(start, end).await?)
    }

    /// Requests completed on `date`
    pub async fn completed_count_on(&self, date: NaiveDate) -> EngineResult<i64> {
        let (start, end) = day_bounds(date)?;
        Ok(self.requests.count_completed_between(start, end).await?)
    }

    async fn require(&self, request_id: ServiceRequestId) -> EngineResult<ServiceRequest> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("service request", request_id))
    }
}

fn require_employee(employee_id: &UserId) -> EngineResult<()> {
    if employee_id.as_str().trim().is_empty() {
        return Err(EngineError::Validation(
            "employee id must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl std::fmt::Debug for ServiceRequestWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRequestWorkflow")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_sources() {
        assert_eq!(
            statuses_where(ServiceRequestStatus::is_assignable),
            [ServiceRequestStatus::Pending, Scheduled]
        );
        assert_eq!(statuses_where(ServiceRequestStatus::is_in_hand), [Assigned, InProgress]);

        let open = statuses_where(|s| !s.is_terminal());
        assert_eq!(open.len(), 4);
        assert!(!open.contains(&Completed) && !open.contains(&Cancelled));
    }

    #[test]
    fn test_blank_employee_rejected() {
        assert!(require_employee(&UserId::new("  ")).unwrap_err().is_validation());
        assert!(require_employee(&UserId::new("emp-1")).is_ok());
    }
}
