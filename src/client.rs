//! Client lifecycle controller
//!
//! Drives the subscriber side: capability detection, service worker
//! registration, subscribe/unsubscribe and test sends. Browser APIs sit
//! behind [`PushPlatform`], server actions behind [`ServerActions`]; every
//! awaited call on either is a suspension point.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    codec::{self, SubscriptionHandle},
    error::Error,
    types::{ActionResult, NotificationPayload, PushSubscriptionRecord},
};

pub const SERVICE_WORKER_PATH: &str = "/sw.js";
pub const SERVICE_WORKER_SCOPE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateViaCache {
    Imports,
    All,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOptions {
    pub scope: String,
    pub update_via_cache: UpdateViaCache,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        RegistrationOptions {
            scope: String::from(SERVICE_WORKER_SCOPE),
            update_via_cache: UpdateViaCache::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    pub application_server_key: Vec<u8>,
}

/// Service Worker and Push Manager capabilities of the host environment.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    type Subscription: SubscriptionHandle + Send + Sync;

    fn has_service_worker(&self) -> bool;

    fn has_push_manager(&self) -> bool;

    async fn register(
        &self,
        script: &str,
        options: RegistrationOptions,
    ) -> Result<(), Error>;

    async fn get_subscription(
        &self,
    ) -> Result<Option<Self::Subscription>, Error>;

    async fn subscribe(
        &self,
        options: SubscribeOptions,
    ) -> Result<Self::Subscription, Error>;

    async fn unsubscribe(
        &self,
        subscription: &Self::Subscription,
    ) -> Result<(), Error>;
}

/// Server actions reachable from the page.
#[async_trait]
pub trait ServerActions: Send + Sync {
    async fn subscribe_user(
        &self,
        record: PushSubscriptionRecord,
    ) -> Result<ActionResult, Error>;

    async fn unsubscribe_user(&self) -> Result<ActionResult, Error>;

    async fn send_notification(
        &self,
        payload: NotificationPayload,
        record: PushSubscriptionRecord,
    ) -> Result<ActionResult, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unsupported,
    Unregistered,
    Subscribing,
    Subscribed,
    Unsubscribing,
}

pub struct ClientController<P: PushPlatform, A: ServerActions> {
    platform: P,
    actions: A,
    application_server_key: Option<String>,
    state: LifecycleState,
    subscription: Option<P::Subscription>,
}

impl<P: PushPlatform, A: ServerActions> ClientController<P, A> {
    pub fn new(
        platform: P,
        actions: A,
        application_server_key: Option<String>,
    ) -> Self {
        ClientController {
            platform,
            actions,
            application_server_key,
            state: LifecycleState::Unregistered,
            subscription: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn record(&self) -> Option<PushSubscriptionRecord> {
        self.subscription.as_ref().map(codec::encode)
    }

    /// Detects capabilities, registers the worker and reconciles with an
    /// existing browser subscription.
    pub async fn start(&mut self) -> Result<LifecycleState, Error> {
        if !(self.platform.has_service_worker()
            && self.platform.has_push_manager())
        {
            self.state = LifecycleState::Unsupported;
            return Ok(self.state);
        }

        self.platform
            .register(SERVICE_WORKER_PATH, RegistrationOptions::default())
            .await?;

        self.subscription = self.platform.get_subscription().await?;
        self.state = if self.subscription.is_some() {
            LifecycleState::Subscribed
        } else {
            LifecycleState::Unregistered
        };

        Ok(self.state)
    }

    pub async fn subscribe(&mut self) -> Result<PushSubscriptionRecord, Error> {
        self.expect_state(LifecycleState::Unregistered, "subscribe")?;

        let key = self
            .application_server_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::ConfigurationError(String::from(
                    "application server public key is not configured",
                ))
            })?;
        let application_server_key = codec::decode_public_key(key)?;

        self.state = LifecycleState::Subscribing;

        let subscription = match self
            .platform
            .subscribe(SubscribeOptions {
                user_visible_only: true,
                application_server_key,
            })
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                self.state = LifecycleState::Unregistered;
                return Err(e);
            },
        };

        let record = codec::encode(&subscription);
        self.subscription = Some(subscription);
        self.state = LifecycleState::Subscribed;

        match self.actions.subscribe_user(record.clone()).await {
            Ok(result) if result.success => {
                info!("Subscribed to push notifications");
            },
            Ok(result) => {
                warn!("Server rejected subscription: {:?}", result.error);
            },
            Err(e) => {
                warn!("Subscription not stored on server: {}", e);
            },
        }

        Ok(record)
    }

    /// Local teardown first; the server result never moves the state back.
    pub async fn unsubscribe(&mut self) -> Result<(), Error> {
        self.expect_state(LifecycleState::Subscribed, "unsubscribe")?;
        self.state = LifecycleState::Unsubscribing;

        if let Some(subscription) = &self.subscription {
            if let Err(e) = self.platform.unsubscribe(subscription).await {
                self.state = LifecycleState::Subscribed;
                return Err(e);
            }
        }

        self.subscription = None;
        self.state = LifecycleState::Unregistered;

        match self.actions.unsubscribe_user().await {
            Ok(result) if result.success => {
                info!("Unsubscribed from push notifications");
            },
            Ok(result) => {
                warn!("Server kept subscription: {:?}", result.error);
            },
            Err(e) => {
                warn!("Subscription not cleared on server: {}", e);
            },
        }

        Ok(())
    }

    pub async fn send_test(
        &self,
        payload: NotificationPayload,
    ) -> Result<ActionResult, Error> {
        self.expect_state(LifecycleState::Subscribed, "send")?;

        let record = self.record().ok_or_else(|| {
            Error::LifecycleError(String::from("no active subscription"))
        })?;

        info!("Sending test notification: {}", payload.body);
        self.actions.send_notification(payload, record).await
    }

    fn expect_state(
        &self,
        expected: LifecycleState,
        action: &str,
    ) -> Result<(), Error> {
        if self.state == LifecycleState::Unsupported {
            return Err(Error::LifecycleError(String::from(
                "push notifications are not supported",
            )));
        }

        if self.state != expected {
            return Err(Error::LifecycleError(format!(
                "cannot {} while {:?}",
                action, self.state
            )));
        }

        Ok(())
    }
}
