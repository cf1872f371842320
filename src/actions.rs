//! Server actions
//!
//! `subscribe_user`, `unsubscribe_user` and `send_notification` as seen by
//! the page. Every failure is converted into an [`ActionResult`]; nothing
//! escapes this boundary.

use async_trait::async_trait;
use std::{fmt, sync::Arc};
use tracing::{error, info, warn};
use url::Url;

use crate::{
    client::ServerActions,
    codec,
    error::Error,
    push::Dispatcher,
    registry::SubscriptionStore,
    types::{ActionResult, NotificationPayload, PushSubscriptionRecord},
};

pub const SEND_ERROR_MESSAGE: &str = "Error al enviar la notificación";
pub const SUBSCRIBE_ERROR_MESSAGE: &str = "Suscripción inválida";
pub const NO_SUBSCRIPTION_MESSAGE: &str = "No hay suscripción disponible";

pub struct PushActions {
    registry: Arc<dyn SubscriptionStore>,
    dispatcher: Dispatcher,
    status_code_to_delete: Vec<u16>,
}

impl PushActions {
    pub fn new(
        registry: Arc<dyn SubscriptionStore>,
        dispatcher: Dispatcher,
        status_code_to_delete: Vec<u16>,
    ) -> PushActions {
        PushActions {
            registry,
            dispatcher,
            status_code_to_delete,
        }
    }

    pub fn vapid_public_key(&self) -> Option<&str> {
        self.dispatcher.public_key()
    }

    pub async fn subscription(
        &self,
        subject: &str,
    ) -> Option<PushSubscriptionRecord> {
        self.registry.get(subject).await
    }

    pub async fn subscribe_user(
        &self,
        subject: &str,
        record: PushSubscriptionRecord,
    ) -> ActionResult {
        if let Err(e) = validate(&record) {
            warn!("Rejected subscription for {}: {}", subject, e);
            return ActionResult::failure(SUBSCRIBE_ERROR_MESSAGE);
        }

        if record.keys.is_none() {
            warn!("Subscription for {} has no encryption keys", subject);
        }

        self.registry.put(subject, record).await;
        info!("Subscription stored for {}", subject);

        ActionResult::ok()
    }

    pub async fn unsubscribe_user(&self, subject: &str) -> ActionResult {
        self.registry.remove(subject).await;
        info!("Subscription removed for {}", subject);

        ActionResult::ok()
    }

    /// Sends through `record`, or through the subject's stored subscription
    /// when `record` is `None`.
    pub async fn send_notification(
        &self,
        subject: &str,
        payload: NotificationPayload,
        record: Option<PushSubscriptionRecord>,
    ) -> ActionResult {
        let record = match record {
            Some(record) => record,
            None => match self.registry.get(subject).await {
                Some(record) => record,
                None => {
                    warn!("No subscription stored for {}", subject);
                    return ActionResult::failure(NO_SUBSCRIPTION_MESSAGE);
                },
            },
        };

        match self.dispatcher.dispatch(&payload, &record).await {
            Ok(_) => {
                info!("Notification sent to {}", subject);
                ActionResult::ok()
            },
            Err(e) => {
                error!("{}: {}", SEND_ERROR_MESSAGE, e);

                if let Error::DeliveryError { status } = e {
                    self.drop_expired(subject, &record, status).await;
                }

                ActionResult::failure(SEND_ERROR_MESSAGE)
            },
        }
    }

    async fn drop_expired(
        &self,
        subject: &str,
        record: &PushSubscriptionRecord,
        status: u16,
    ) {
        if !self.status_code_to_delete.contains(&status) {
            return;
        }

        // a newer subscription for the same subject stays
        if self.registry.remove_if(subject, &record.endpoint).await {
            info!(
                "Subscription for {} removed after status {}",
                subject, status
            );
        }
    }

    /// Binds the actions to one subject, the shape the page sees.
    pub fn for_subject(
        self: &Arc<Self>,
        subject: &str,
    ) -> SubjectActions {
        SubjectActions {
            actions: Arc::clone(self),
            subject: subject.to_owned(),
        }
    }
}

impl fmt::Debug for PushActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushActions")
            .field("dispatcher", &self.dispatcher)
            .field("status_code_to_delete", &self.status_code_to_delete)
            .finish_non_exhaustive()
    }
}

fn validate(record: &PushSubscriptionRecord) -> Result<(), Error> {
    let endpoint = Url::parse(&record.endpoint)?;
    if !matches!(endpoint.scheme(), "https" | "http") {
        return Err(Error::InvalidOption {
            option: String::from("endpoint"),
        });
    }

    if let Some(keys) = &record.keys {
        codec::decode_public_key(&keys.p256dh)?;
        if codec::decode(&keys.auth)?.len() != codec::AUTH_SECRET_LENGTH {
            return Err(Error::InvalidOption {
                option: String::from("auth"),
            });
        }
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct SubjectActions {
    actions: Arc<PushActions>,
    subject: String,
}

#[async_trait]
impl ServerActions for SubjectActions {
    async fn subscribe_user(
        &self,
        record: PushSubscriptionRecord,
    ) -> Result<ActionResult, Error> {
        Ok(self.actions.subscribe_user(&self.subject, record).await)
    }

    async fn unsubscribe_user(&self) -> Result<ActionResult, Error> {
        Ok(self.actions.unsubscribe_user(&self.subject).await)
    }

    async fn send_notification(
        &self,
        payload: NotificationPayload,
        record: PushSubscriptionRecord,
    ) -> Result<ActionResult, Error> {
        Ok(self
            .actions
            .send_notification(&self.subject, payload, Some(record))
            .await)
    }
}
