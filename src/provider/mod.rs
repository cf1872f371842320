use async_trait::async_trait;

use crate::{error::Error, types::PushHeader};

pub use self::http::HTTP;

mod http;

/// Encrypted, signed message ready to hand to a push service.
#[derive(Debug, Clone)]
pub struct PushRequest {
    pub endpoint: String,
    pub authorization: String,
    pub push_header: PushHeader,
    pub body: Vec<u8>,
}

/// Delivers a [`PushRequest`] and reports the push service's status code.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn post_push(&self, request: PushRequest) -> Result<u16, Error>;
}
