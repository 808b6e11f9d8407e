//! Price computation
//!
//! A price is the plan's catalog price for the billing cycle, multiplied by
//! the service area's multiplier when the zip code is served, rounded to
//! cents. Unserved zip codes price at face value.

use bincycle_db::PlanSnapshot;
use bincycle_types::{BillingCycle, PlanId, ServiceArea, ServiceAreaId, SubscriptionPlan};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{EngineResult, PlanCatalog};

/// Round to 2 fractional digits, halves away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Area-adjusted price for a plan; never negative
pub fn area_price(plan: &SubscriptionPlan, cycle: BillingCycle, area: Option<&ServiceArea>) -> Decimal {
    let base = plan.base_price(cycle);
    let price = match area {
        Some(area) => base * area.service_multiplier,
        None => base,
    };
    round_money(price).max(Decimal::ZERO)
}

/// Monthly amount snapshotted onto a subscription.
///
/// Yearly subscriptions are charged the yearly price spread over 12 months.
pub fn monthly_price(plan: &SubscriptionPlan, cycle: BillingCycle) -> Decimal {
    match cycle {
        BillingCycle::Monthly => round_money(plan.monthly_price),
        BillingCycle::Yearly => round_money(plan.yearly_price / Decimal::from(12)),
    }
}

/// Plan fields copied onto a subscription for the given cycle
pub fn plan_snapshot(plan: &SubscriptionPlan, cycle: BillingCycle) -> PlanSnapshot {
    PlanSnapshot {
        plan_name: plan.name.clone(),
        monthly_price: monthly_price(plan, cycle),
        bins_included: plan.bins_included,
        pickups_per_week: plan.pickups_per_week,
    }
}

/// Breakdown of a computed price
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub plan_id: PlanId,
    pub billing_cycle: BillingCycle,
    /// Catalog price before the area multiplier
    pub base_price: Decimal,
    /// Matched area, if the zip code is served
    pub service_area_id: Option<ServiceAreaId>,
    /// Multiplier applied (1 when no area matched)
    pub multiplier: Decimal,
    /// Final price, 2 fractional digits
    pub price: Decimal,
}

/// Prices plans against the current catalog. No side effects.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    catalog: PlanCatalog,
}

impl PricingCalculator {
    /// Create a new calculator
    pub fn new(catalog: PlanCatalog) -> Self {
        Self { catalog }
    }

    /// Price for a plan, cycle and zip code.
    ///
    /// Fails with `PlanNotFound` if the plan is missing or inactive.
    pub async fn compute_price(
        &self,
        plan_id: PlanId,
        cycle: BillingCycle,
        zip_code: &str,
    ) -> EngineResult<Decimal> {
        Ok(self.quote(plan_id, cycle, zip_code).await?.price)
    }

    /// Price with its breakdown
    pub async fn quote(
        &self,
        plan_id: PlanId,
        cycle: BillingCycle,
        zip_code: &str,
    ) -> EngineResult<PriceQuote> {
        let plan = self.catalog.require_plan(plan_id).await?;
        let area = self.catalog.find_service_area(zip_code).await?;
        let price = area_price(&plan, cycle, area.as_ref());

        tracing::debug!(
            plan_id = %plan_id,
            cycle = %cycle,
            zip_code,
            area_matched = area.is_some(),
            %price,
            "Price computed"
        );

        Ok(PriceQuote {
            plan_id,
            billing_cycle: cycle,
            base_price: plan.base_price(cycle),
            service_area_id: area.as_ref().map(|a| a.id),
            multiplier: area.map_or(Decimal::ONE, |a| a.service_multiplier),
            price,
        })
    }
}
