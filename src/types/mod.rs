pub use self::{
    push::{
        ActionResult, Claims, NotificationPayload, PushEnvelope, PushHeader,
        Urgency, DEFAULT_BADGE, DEFAULT_ICON,
    },
    subscription::{PushSubscriptionRecord, SubscriptionKeys},
};

mod push;
mod subscription;
