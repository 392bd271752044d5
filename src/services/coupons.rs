use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::Coupon,
    session::Session,
    store::PersistenceStore,
};

/// Coupon validation for checkout sessions plus the admin-side coupon
/// collection.
#[derive(Clone)]
pub struct CouponService {
    store: Arc<dyn PersistenceStore>,
    event_sender: EventSender,
}

impl CouponService {
    pub fn new(store: Arc<dyn PersistenceStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    /// Applies a coupon code to the session.
    ///
    /// The code is trimmed and upper-cased, then matched exactly against
    /// the active coupon set. Rules:
    /// - empty/whitespace-only input is a no-op (keeps whatever was
    ///   applied before, no error);
    /// - a valid code becomes the session's applied coupon, replacing
    ///   any previous one; re-applying the same code is idempotent;
    /// - an invalid code clears the applied coupon and returns
    ///   `InvalidCoupon` — the prior valid coupon is NOT retained.
    ///
    /// Returns the coupon applied after the call, if any.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub async fn apply(
        &self,
        session: &mut Session,
        code: &str,
    ) -> Result<Option<Coupon>, ServiceError> {
        let canonical = Coupon::canonicalize(code);
        if canonical.is_empty() {
            return Ok(session.applied_coupon().cloned());
        }

        match self.find_active(&canonical).await? {
            Some(coupon) => {
                info!("Applied coupon {} ({}%)", coupon.code, coupon.discount_percent);
                self.event_sender
                    .send_or_log(Event::CouponApplied {
                        code: coupon.code.clone(),
                        discount_percent: coupon.discount_percent,
                    })
                    .await;
                session.set_applied_coupon(Some(coupon.clone()));
                Ok(Some(coupon))
            }
            None => {
                warn!("Rejected coupon code {}", canonical);
                self.event_sender
                    .send_or_log(Event::CouponRejected {
                        code: canonical.clone(),
                    })
                    .await;
                session.set_applied_coupon(None);
                Err(ServiceError::InvalidCoupon(canonical))
            }
        }
    }

    /// Removes the session's applied coupon, if any.
    pub fn clear(&self, session: &mut Session) {
        session.set_applied_coupon(None);
    }

    /// Exact-match lookup against active coupons.
    async fn find_active(&self, canonical_code: &str) -> Result<Option<Coupon>, ServiceError> {
        let coupons = self.store.list_coupons().await?;
        Ok(coupons
            .into_iter()
            .find(|c| c.is_active && c.code == canonical_code))
    }

    // Admin surface

    #[instrument(skip(self))]
    pub async fn create_coupon(
        &self,
        code: &str,
        discount_percent: u8,
    ) -> Result<Coupon, ServiceError> {
        let coupon = Coupon::new(code, discount_percent)?;
        self.store.create_coupon(coupon.clone()).await?;
        self.event_sender
            .send_or_log(Event::CouponCreated(coupon.code.clone()))
            .await;
        info!("Created coupon {}", coupon.code);
        Ok(coupon)
    }

    #[instrument(skip(self))]
    pub async fn delete_coupon(&self, code: &str) -> Result<(), ServiceError> {
        let canonical = Coupon::canonicalize(code);
        self.store.delete_coupon(&canonical).await?;
        self.event_sender
            .send_or_log(Event::CouponDeleted(canonical))
            .await;
        Ok(())
    }

    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, ServiceError> {
        Ok(self.store.list_coupons().await?)
    }
}
