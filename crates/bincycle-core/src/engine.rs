//! Engine facade

use bincycle_db::Stores;

use crate::{
    ConfigError, CustomerProfiles, DashboardAggregator, EngineConfig, PlanCatalog, PricingCalculator,
    ServiceRequestWorkflow, SubscriptionManager,
};

/// All engine components wired to one set of stores
#[derive(Debug, Clone)]
pub struct Engine {
    pub catalog: PlanCatalog,
    pub pricing: PricingCalculator,
    pub subscriptions: SubscriptionManager,
    pub requests: ServiceRequestWorkflow,
    pub profiles: CustomerProfiles,
    pub dashboard: DashboardAggregator,
    config: EngineConfig,
}

impl Engine {
    /// Build every component over `stores`.
    ///
    /// Fails if `config` is out of range.
    pub fn new(stores: Stores, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let catalog = PlanCatalog::from_stores(&stores);
        let pricing = PricingCalculator::new(catalog.clone());
        let subscriptions = SubscriptionManager::from_stores(&stores, config.clone());
        let requests = ServiceRequestWorkflow::from_stores(&stores, config.clone());
        let profiles = CustomerProfiles::from_stores(&stores);
        let dashboard =
            DashboardAggregator::new(subscriptions.clone(), requests.clone(), profiles.clone());

        tracing::debug!(?config, "Engine initialized");

        Ok(Self {
            catalog,
            pricing,
            subscriptions,
            requests,
            profiles,
            dashboard,
            config,
        })
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
