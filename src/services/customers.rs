use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::CustomerProfile,
    store::PersistenceStore,
};

/// Saved customer profiles, keyed by email. Checkout upserts the profile
/// when an order is placed so returning shoppers keep their details.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn PersistenceStore>,
    event_sender: EventSender,
}

impl CustomerService {
    pub fn new(store: Arc<dyn PersistenceStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    #[instrument(skip(self, profile), fields(email = %profile.email))]
    pub async fn upsert_profile(&self, profile: CustomerProfile) -> Result<(), ServiceError> {
        if profile.email.trim().is_empty() {
            return Err(ServiceError::validation("email", "must not be empty"));
        }
        let email = profile.email.clone();
        self.store.upsert_customer(profile).await?;
        self.event_sender
            .send_or_log(Event::CustomerSaved(email.clone()))
            .await;
        info!("Saved customer profile {}", email);
        Ok(())
    }

    pub async fn list_profiles(&self) -> Result<Vec<CustomerProfile>, ServiceError> {
        Ok(self.store.list_customers().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events, store::MemoryStore};

    #[tokio::test]
    async fn upsert_replaces_by_email() {
        let store = Arc::new(MemoryStore::new());
        let (sender, _rx) = events::channel(16);
        let service = CustomerService::new(store, sender);

        let mut profile = CustomerProfile {
            email: "asha@example.com".into(),
            name: "Asha Rao".into(),
            phone: "9876543210".into(),
            street: "12 MG Road".into(),
            city: "Bengaluru".into(),
            postal_code: "560001".into(),
        };
        service.upsert_profile(profile.clone()).await.unwrap();

        profile.city = "Mysuru".into();
        service.upsert_profile(profile).await.unwrap();

        let profiles = service.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].city, "Mysuru");
    }
}
