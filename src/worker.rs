//! Service worker event handling
//!
//! The browser runs `static/sw.js`; this module is the same contract with
//! the host (notification display, window opening) behind [`WorkerHost`].
//! No state is kept between events.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    configuration::Config,
    error::Error,
    types::{DEFAULT_BADGE, DEFAULT_ICON},
};

pub const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];
pub const PRIMARY_KEY: &str = "2";

/// Inbound push data. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundPush {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub url: Option<String>,
}

/// Routing metadata attached to a displayed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(rename = "dateOfArrival")]
    pub date_of_arrival: i64,
    #[serde(rename = "primaryKey")]
    pub primary_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

/// A notification as the click event hands it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedNotification {
    pub title: String,
    pub data: Option<NotificationData>,
}

#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Resolves once the notification is shown.
    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), Error>;

    async fn close_notification(&self, notification: &DisplayedNotification);

    async fn open_window(&self, url: &str) -> Result<(), Error>;
}

pub fn parse_push(data: Option<&[u8]>) -> Result<InboundPush, Error> {
    let data = data.ok_or_else(|| {
        Error::ParseMessage(String::from("push event has no data"))
    })?;

    let value: serde_json::Value = serde_json::from_slice(data)
        .map_err(|e| Error::ParseMessage(e.to_string()))?;

    if !value.is_object() {
        return Err(Error::ParseMessage(String::from(
            "push data is not a JSON object",
        )));
    }

    serde_json::from_value(value).map_err(|e| Error::ParseMessage(e.to_string()))
}

pub fn build_notification(
    push: InboundPush,
    date_of_arrival: i64,
) -> (String, NotificationOptions) {
    let icon = push
        .icon
        .filter(|icon| !icon.is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_ICON));

    let options = NotificationOptions {
        body: push.body.unwrap_or_default(),
        icon,
        badge: String::from(DEFAULT_BADGE),
        vibrate: VIBRATE_PATTERN.to_vec(),
        data: NotificationData {
            date_of_arrival,
            primary_key: String::from(PRIMARY_KEY),
            url: push.url,
        },
    };

    (push.title.unwrap_or_default(), options)
}

pub struct ServiceWorker<H: WorkerHost> {
    host: H,
    fallback_url: String,
}

impl<H: WorkerHost> ServiceWorker<H> {
    pub fn new(host: H, fallback_url: String) -> Self {
        ServiceWorker { host, fallback_url }
    }

    pub fn from_config(host: H, config: &Config) -> Self {
        Self::new(host, config.fallback_url.to_owned())
    }

    /// Shows the pushed notification. Missing or malformed data is dropped
    /// and reported as `Ok(false)`.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<bool, Error> {
        let push = match parse_push(data) {
            Ok(push) => push,
            Err(e) => {
                debug!("Ignoring push event: {}", e);
                return Ok(false);
            },
        };

        let (title, options) =
            build_notification(push, Utc::now().timestamp_millis());
        self.host.show_notification(&title, &options).await?;

        Ok(true)
    }

    /// Closes the notification and opens its URL; returns the URL opened.
    pub async fn on_notification_click(
        &self,
        notification: &DisplayedNotification,
    ) -> Result<String, Error> {
        self.host.close_notification(notification).await;

        let url = self.click_target(notification).to_owned();
        self.host.open_window(&url).await?;

        Ok(url)
    }

    pub fn click_target<'a>(
        &'a self,
        notification: &'a DisplayedNotification,
    ) -> &'a str {
        notification
            .data
            .as_ref()
            .and_then(|data| data.url.as_deref())
            .filter(|url| !url.is_empty())
            .unwrap_or(self.fallback_url.as_str())
    }
}
