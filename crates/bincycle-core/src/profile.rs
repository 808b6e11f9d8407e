//! Customer profile store

use std::sync::Arc;

use bincycle_db::{CustomerProfileRepository, Stores};
use bincycle_types::{CustomerProfile, ProfileDetails, UserId};

use crate::EngineResult;

/// Customer profile access
#[derive(Clone)]
pub struct CustomerProfiles {
    profiles: Arc<dyn CustomerProfileRepository>,
}

impl CustomerProfiles {
    pub fn new(profiles: Arc<dyn CustomerProfileRepository>) -> Self {
        Self { profiles }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(Arc::clone(&stores.profiles))
    }

    /// The user's profile, if one was ever saved
    pub async fn get_profile(&self, user_id: &UserId) -> EngineResult<Option<CustomerProfile>> {
        Ok(self.profiles.find_by_user_id(user_id).await?)
    }

    /// Create the profile on first write, overwrite its details afterwards
    pub async fn upsert_profile(
        &self,
        user_id: &UserId,
        details: ProfileDetails,
    ) -> EngineResult<CustomerProfile> {
        let profile = self.profiles.upsert(user_id, details).await?;
        tracing::info!(user_id = %user_id, profile_id = %profile.id, "Customer profile saved");
        Ok(profile)
    }
}

impl std::fmt::Debug for CustomerProfiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerProfiles").finish_non_exhaustive()
    }
}
