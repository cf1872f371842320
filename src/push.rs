use std::{fmt, sync::Arc};

use chrono::Local;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use p256::{
    elliptic_curve::sec1::ToEncodedPoint,
    pkcs8::{EncodePrivateKey, SecretDocument},
    SecretKey,
};
use tracing::debug;
use url::Url;

use crate::{
    codec,
    error::Error,
    provider::{PushRequest, PushTransport},
    types::{
        Claims, NotificationPayload, PushEnvelope, PushHeader,
        PushSubscriptionRecord,
    },
};

/// VAPID tokens must expire within 24 hours of signing.
pub const VAPID_TOKEN_LIFETIME: i64 = 12 * 60 * 60;

const P256_PRIVATE_KEY_LENGTH: usize = 32;

/// Application server signing identity.
#[derive(Clone)]
pub struct VapidIdentity {
    public_key: String,
    key: EncodingKey,
    contact: String,
}

impl VapidIdentity {
    /// Builds the identity from the raw base64url key pair, as produced by
    /// the usual web-push key generators.
    pub fn from_raw(
        public_key: &str,
        private_key: &str,
        contact: &str,
    ) -> Result<VapidIdentity, Error> {
        let public = codec::decode_public_key(public_key).map_err(|e| {
            Error::ConfigurationError(format!("VAPID public key: {}", e))
        })?;
        let private = codec::decode(private_key.trim()).map_err(|e| {
            Error::ConfigurationError(format!("VAPID private key: {}", e))
        })?;

        if private.len() != P256_PRIVATE_KEY_LENGTH {
            return Err(Error::ConfigurationError(format!(
                "VAPID private key must be {} bytes, got {}",
                P256_PRIVATE_KEY_LENGTH,
                private.len()
            )));
        }

        let der = pkcs8_der(&private, &public)?;
        let key = EncodingKey::from_ec_der(der.as_bytes());

        Self::checked(public_key, key, contact)
    }

    /// Builds the identity from a PKCS#8 PEM private key.
    pub fn from_pem(
        public_key: &str,
        pem: &[u8],
        contact: &str,
    ) -> Result<VapidIdentity, Error> {
        codec::decode_public_key(public_key).map_err(|e| {
            Error::ConfigurationError(format!("VAPID public key: {}", e))
        })?;
        let key = EncodingKey::from_ec_pem(pem).map_err(|e| {
            Error::ConfigurationError(format!("VAPID private key: {}", e))
        })?;

        Self::checked(public_key, key, contact)
    }

    fn checked(
        public_key: &str,
        key: EncodingKey,
        contact: &str,
    ) -> Result<VapidIdentity, Error> {
        let identity = VapidIdentity {
            public_key: public_key.trim().to_owned(),
            key,
            contact: contact.to_owned(),
        };

        // `from_ec_der` defers validation to the first signature
        let probe = Url::parse("https://localhost")?;
        identity.sign(&probe).map_err(|e| {
            Error::ConfigurationError(format!("VAPID private key: {}", e))
        })?;

        Ok(identity)
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// ES256 JWT with the endpoint's origin as audience.
    pub fn sign(&self, endpoint: &Url) -> Result<String, Error> {
        let aud = match endpoint.scheme() {
            "https" | "http" if endpoint.host().is_some() => {
                endpoint.origin().ascii_serialization()
            },
            _ => {
                return Err(Error::InvalidOption {
                    option: String::from("endpoint"),
                });
            },
        };

        let exp = Local::now().timestamp() + VAPID_TOKEN_LIFETIME;
        let claims = Claims {
            aud,
            sub: self.contact.to_owned(),
            exp,
        };
        let token = encode(&Header::new(Algorithm::ES256), &claims, &self.key)?;

        Ok(token)
    }

    pub fn authorization(&self, endpoint: &Url) -> Result<String, Error> {
        let token = self.sign(endpoint)?;
        Ok(format!("vapid t={}, k={}", token, self.public_key))
    }
}

impl fmt::Debug for VapidIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidIdentity")
            .field("public_key", &self.public_key)
            .field("contact", &self.contact)
            .finish_non_exhaustive()
    }
}

/// PKCS#8 document for a raw P-256 scalar, the form `ring` signs with.
fn pkcs8_der(
    private_key: &[u8],
    public_key: &[u8],
) -> Result<SecretDocument, Error> {
    let secret = SecretKey::from_slice(private_key).map_err(|e| {
        Error::ConfigurationError(format!("VAPID private key: {}", e))
    })?;

    if secret.public_key().to_encoded_point(false).as_bytes() != public_key {
        return Err(Error::ConfigurationError(String::from(
            "VAPID public key does not match the private key",
        )));
    }

    secret.to_pkcs8_der().map_err(|e| {
        Error::ConfigurationError(format!("VAPID private key: {}", e))
    })
}

/// Encrypts and signs notifications and hands them to a [`PushTransport`].
pub struct Dispatcher {
    vapid: Option<VapidIdentity>,
    transport: Arc<dyn PushTransport>,
    push_header: PushHeader,
}

impl Dispatcher {
    pub fn new(
        vapid: Option<VapidIdentity>,
        transport: Arc<dyn PushTransport>,
        push_header: PushHeader,
    ) -> Dispatcher {
        Dispatcher {
            vapid,
            transport,
            push_header,
        }
    }

    pub fn public_key(&self) -> Option<&str> {
        self.vapid.as_ref().map(VapidIdentity::public_key)
    }

    /// Returns the push service status on a 2xx answer.
    ///
    /// Fails without touching the network when the record has no keys or
    /// no VAPID identity is configured.
    pub async fn dispatch(
        &self,
        payload: &NotificationPayload,
        record: &PushSubscriptionRecord,
    ) -> Result<u16, Error> {
        let keys = record.keys.as_ref().ok_or(Error::MissingKeysError())?;
        let vapid = self.vapid.as_ref().ok_or_else(|| {
            Error::ConfigurationError(String::from(
                "VAPID identity is not configured",
            ))
        })?;

        let url = Url::parse(&record.endpoint)?;
        let authorization = vapid.authorization(&url)?;

        let p256dh = codec::decode(&keys.p256dh)?;
        let auth = codec::decode(&keys.auth)?;

        let envelope = serde_json::to_vec(&PushEnvelope::from(payload))?;
        let data = ece::encrypt(&p256dh, &auth, &envelope)?;

        let status = self
            .transport
            .post_push(PushRequest {
                endpoint: record.endpoint.to_owned(),
                authorization,
                push_header: self.push_header.clone(),
                body: data,
            })
            .await?;

        if !(200..300).contains(&status) {
            return Err(Error::DeliveryError { status });
        }

        debug!(
            "Push delivered to {} with status {}",
            url.host_str().unwrap_or_default(),
            status
        );

        Ok(status)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("vapid", &self.vapid)
            .field("push_header", &self.push_header)
            .finish_non_exhaustive()
    }
}
