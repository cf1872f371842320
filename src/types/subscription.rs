use serde::{Deserialize, Serialize};

/// Serialized browser push subscription, as produced by
/// `PushSubscription.toJSON()` on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscriptionRecord {
    pub endpoint: String,
    #[serde(
        rename = "expirationTime",
        alias = "expiration_time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_time: Option<i64>,
    #[serde(default)]
    pub keys: Option<SubscriptionKeys>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl PushSubscriptionRecord {
    pub fn new(endpoint: String, keys: Option<SubscriptionKeys>) -> Self {
        Self {
            endpoint,
            expiration_time: None,
            keys,
        }
    }
}
