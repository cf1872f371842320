//! Push notification types
//!
//! Types for the notification payload, the push envelope sent on the wire,
//! delivery headers and VAPID claims.

use serde::{Deserialize, Serialize};
use std::{fmt, io, str::FromStr};

pub const DEFAULT_ICON: &str = "/icon.png";
pub const DEFAULT_BADGE: &str = "/badge.png";

// =============================================================================
// Payload Types
// =============================================================================

/// Message a caller asks to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// JSON object carried inside the encrypted push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub url: String,
}

impl From<&NotificationPayload> for PushEnvelope {
    fn from(payload: &NotificationPayload) -> Self {
        let icon = match payload.icon.as_deref() {
            Some(icon) if !icon.is_empty() => icon.to_owned(),
            _ => String::from(DEFAULT_ICON),
        };

        PushEnvelope {
            title: payload.title.to_owned(),
            body: payload.body.to_owned(),
            icon,
            url: payload.url.to_owned(),
        }
    }
}

// =============================================================================
// Push Headers
// =============================================================================

#[derive(Debug, Clone)]
pub struct PushHeader {
    pub ttl: i64,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Urgency::VeryLow => write!(f, "very-low"),
            Urgency::Low => write!(f, "low"),
            Urgency::Normal => write!(f, "normal"),
            Urgency::High => write!(f, "high"),
        }
    }
}

impl FromStr for Urgency {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Urgency, Self::Err> {
        match value {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            _ => Err(io::Error::other("Urgency not supported")),
        }
    }
}

// =============================================================================
// Action Result
// =============================================================================

/// Result shape returned by every server action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        ActionResult {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        ActionResult {
            success: false,
            error: Some(message.to_owned()),
        }
    }
}

// =============================================================================
// JWT Claims
// =============================================================================

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub sub: String,
    pub exp: i64,
}
