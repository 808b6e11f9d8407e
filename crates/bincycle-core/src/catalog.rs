//! Plan catalog: pricing plans and service areas

use std::sync::Arc;

use bincycle_db::{DbError, PlanRepository, ServiceAreaRepository, Stores};
use bincycle_types::{PlanId, ServiceArea, SubscriptionPlan};

use crate::{EngineError, EngineResult};

/// Read-mostly view over plans and service areas
#[derive(Clone)]
pub struct PlanCatalog {
    plans: Arc<dyn PlanRepository>,
    areas: Arc<dyn ServiceAreaRepository>,
}

impl PlanCatalog {
    /// Create a new catalog
    pub fn new(plans: Arc<dyn PlanRepository>, areas: Arc<dyn ServiceAreaRepository>) -> Self {
        Self { plans, areas }
    }

    /// Create a catalog from the storage bundle
    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(Arc::clone(&stores.plans), Arc::clone(&stores.areas))
    }

    /// Active plans, cheapest monthly price first
    pub async fn list_active_plans(&self) -> EngineResult<Vec<SubscriptionPlan>> {
        Ok(self.plans.find_active().await?)
    }

    /// Look up an active plan. Deactivated plans are reported as absent.
    pub async fn get_plan(&self, plan_id: PlanId) -> EngineResult<Option<SubscriptionPlan>> {
        let plan = self.plans.find_active_by_id(plan_id).await?;
        if plan.is_none() {
            tracing::debug!(plan_id = %plan_id, "Plan not found or inactive");
        }
        Ok(plan)
    }

    /// Like [`get_plan`](Self::get_plan) but absence is an error
    pub async fn require_plan(&self, plan_id: PlanId) -> EngineResult<SubscriptionPlan> {
        self.get_plan(plan_id)
            .await?
            .ok_or(EngineError::PlanNotFound(plan_id))
    }

    /// Active area whose zip code equals `zip_code` exactly
    pub async fn find_service_area(&self, zip_code: &str) -> EngineResult<Option<ServiceArea>> {
        Ok(self.areas.find_active_by_zip(zip_code).await?)
    }

    /// Like [`find_service_area`](Self::find_service_area) but absence is an error
    pub async fn require_service_area(&self, zip_code: &str) -> EngineResult<ServiceArea> {
        self.find_service_area(zip_code)
            .await?
            .ok_or_else(|| EngineError::AreaNotFound(zip_code.to_string()))
    }

    /// Retire a plan. Existing subscriptions keep their snapshot; the plan
    /// stops resolving for new ones. Retiring twice succeeds.
    pub async fn retire_plan(&self, plan_id: PlanId) -> EngineResult<()> {
        match self.plans.deactivate(plan_id).await {
            Ok(()) => {
                tracing::info!(plan_id = %plan_id, "Plan retired");
                Ok(())
            }
            Err(DbError::NotFound) => Err(EngineError::PlanNotFound(plan_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether an active service area covers `zip_code`
    pub async fn is_service_available(&self, zip_code: &str) -> EngineResult<bool> {
        Ok(self.find_service_area(zip_code).await?.is_some())
    }
}

impl std::fmt::Debug for PlanCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCatalog").finish()
    }
}
