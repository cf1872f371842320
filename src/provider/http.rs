use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::str::FromStr;
use std::time::Duration;

use crate::{
    configuration::Config,
    error::{self, Error},
};

use super::{PushRequest, PushTransport};

const USER_AGENT: &str = concat!("push/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct HTTP {
    pub http: Client,
}

impl HTTP {
    pub fn new(config: &Config) -> Result<HTTP, Error> {
        Self::with_timeout(config.timeout)
    }

    pub fn with_timeout(timeout: u64) -> Result<HTTP, Error> {
        let http = match Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                return Err(error::Error::ReqwestError(e));
            },
        };

        Ok(HTTP { http })
    }
}

#[async_trait]
impl PushTransport for HTTP {
    async fn post_push(&self, request: PushRequest) -> Result<u16, Error> {
        let mut header_map = HeaderMap::new();

        header_map.insert(
            HeaderName::from_str("User-Agent")?,
            HeaderValue::from_str(USER_AGENT)?,
        );
        header_map.insert(
            HeaderName::from_str("authorization")?,
            HeaderValue::from_str(request.authorization.as_str())?,
        );
        header_map.insert(
            HeaderName::from_str("content-encoding")?,
            HeaderValue::from_str("aes128gcm")?,
        );
        header_map.insert(
            HeaderName::from_str("content-type")?,
            HeaderValue::from_str("application/octet-stream")?,
        );
        header_map.insert(
            HeaderName::from_str("ttl")?,
            HeaderValue::from_str(&request.push_header.ttl.to_string())?,
        );
        header_map.insert(
            HeaderName::from_str("urgency")?,
            HeaderValue::from_str(&request.push_header.urgency.to_string())?,
        );

        let data = self
            .http
            .post(request.endpoint)
            .headers(header_map)
            .body(request.body)
            .send()
            .await?;
        let status = data.status().as_u16();

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PushHeader, Urgency};
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn request(endpoint: String) -> PushRequest {
        PushRequest {
            endpoint,
            authorization: String::from("vapid t=token, k=BKey"),
            push_header: PushHeader {
                ttl: 60,
                urgency: Urgency::High,
            },
            body: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_post_push_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/push/1"))
            .and(header("content-encoding", "aes128gcm"))
            .and(header("ttl", "60"))
            .and(header("urgency", "high"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let http = HTTP::with_timeout(5).unwrap();
        let status = http
            .post_push(request(format!("{}/push/1", server.uri())))
            .await
            .unwrap();

        assert_eq!(status, 201);

        let received = server.received_requests().await.unwrap();
        let authorization = received[0]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(authorization, "vapid t=token, k=BKey");
        assert_eq!(received[0].body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_post_push_returns_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let http = HTTP::with_timeout(5).unwrap();
        let status = http
            .post_push(request(format!("{}/gone", server.uri())))
            .await
            .unwrap();

        assert_eq!(status, 410);
    }

    #[tokio::test]
    async fn test_post_push_unreachable() {
        let http = HTTP::with_timeout(1).unwrap();
        let result = http
            .post_push(request(String::from("http://127.0.0.1:9/push")))
            .await;

        assert!(matches!(result, Err(Error::ReqwestError(_))));
    }
}
