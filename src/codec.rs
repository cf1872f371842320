//! Subscription codec
//!
//! Maps a browser-native subscription handle to a [`PushSubscriptionRecord`]
//! and decodes the base64url key material carried by the record.

use base64::{
    alphabet,
    engine::{
        general_purpose::URL_SAFE_NO_PAD as BASE64_URL, GeneralPurpose,
        GeneralPurposeConfig,
    },
    Engine,
};

use crate::{
    error::Error,
    types::{PushSubscriptionRecord, SubscriptionKeys},
};

/// Standard alphabet that, like `atob`, ignores non-zero trailing bits.
const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Length of an uncompressed P-256 point.
pub const P256_PUBLIC_KEY_LENGTH: usize = 65;
pub const AUTH_SECRET_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    P256dh,
    Auth,
}

/// Native subscription handle, the equivalent of the browser's
/// `PushSubscription` object.
pub trait SubscriptionHandle {
    fn endpoint(&self) -> &str;

    fn expiration_time(&self) -> Option<i64> {
        None
    }

    /// Raw key material, `None` when the platform does not expose it.
    fn get_key(&self, name: KeyName) -> Option<Vec<u8>>;
}

/// Plain in-memory handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSubscription {
    pub endpoint: String,
    pub expiration_time: Option<i64>,
    pub p256dh: Option<Vec<u8>>,
    pub auth: Option<Vec<u8>>,
}

impl SubscriptionHandle for RawSubscription {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn expiration_time(&self) -> Option<i64> {
        self.expiration_time
    }

    fn get_key(&self, name: KeyName) -> Option<Vec<u8>> {
        match name {
            KeyName::P256dh => self.p256dh.clone(),
            KeyName::Auth => self.auth.clone(),
        }
    }
}

pub fn encode<H: SubscriptionHandle + ?Sized>(
    handle: &H,
) -> PushSubscriptionRecord {
    let keys = match (
        handle.get_key(KeyName::P256dh),
        handle.get_key(KeyName::Auth),
    ) {
        (Some(p256dh), Some(auth)) => Some(SubscriptionKeys {
            p256dh: encode_base64url(&p256dh),
            auth: encode_base64url(&auth),
        }),
        _ => None,
    };

    PushSubscriptionRecord {
        endpoint: handle.endpoint().to_owned(),
        expiration_time: handle.expiration_time(),
        keys,
    }
}

pub fn encode_base64url(bytes: &[u8]) -> String {
    BASE64_URL.encode(bytes)
}

/// Decodes a base64url string: pads to a multiple of four with `=`, maps
/// `-` to `+` and `_` to `/`, then applies the standard alphabet.
pub fn decode(value: &str) -> Result<Vec<u8>, Error> {
    let padding = "=".repeat((4 - value.len() % 4) % 4);
    let base64 = format!("{}{}", value, padding)
        .replace('-', "+")
        .replace('_', "/");

    let data = BASE64_LENIENT.decode(base64)?;
    Ok(data)
}

/// Decodes an application-server or subscriber public key.
pub fn decode_public_key(value: &str) -> Result<Vec<u8>, Error> {
    let key = decode(value.trim())?;

    if key.len() != P256_PUBLIC_KEY_LENGTH || key[0] != 0x04 {
        return Err(Error::InvalidOption {
            option: String::from("p256 public key"),
        });
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLICATION_SERVER_KEY: &str = "BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U";

    fn handle(p256dh: Option<Vec<u8>>, auth: Option<Vec<u8>>) -> RawSubscription {
        RawSubscription {
            endpoint: String::from("https://push.example.com/send/1"),
            expiration_time: None,
            p256dh,
            auth,
        }
    }

    #[test]
    fn test_decode_round_trip() {
        for value in [
            "",
            "Zg",
            "Zm8",
            "Zm9v",
            "FWm6VC-Bt_ZZ163WXu-X-w",
            APPLICATION_SERVER_KEY,
        ] {
            let bytes = decode(value).unwrap();
            assert_eq!(encode_base64url(&bytes), value);
        }
    }

    #[test]
    fn test_decode_maps_url_alphabet() {
        assert_eq!(decode("-_-_").unwrap(), vec![0xfb, 0xff, 0xbf]);
        assert_eq!(decode("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_decode_accepts_padded_input() {
        assert_eq!(decode("Zg==").unwrap(), b"f".to_vec());
    }

    #[test]
    fn test_decode_ignores_trailing_bits() {
        assert_eq!(decode("Zh").unwrap(), b"f".to_vec());
        assert_eq!(decode("Zm9=").unwrap(), b"fo".to_vec());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode("Z"), Err(Error::Base64DecodeError(_))));
        assert!(matches!(decode("Zm9v!"), Err(Error::Base64DecodeError(_))));
        assert!(matches!(decode("Zm 9v"), Err(Error::Base64DecodeError(_))));
    }

    #[test]
    fn test_decode_public_key() {
        let key = decode_public_key(APPLICATION_SERVER_KEY).unwrap();
        assert_eq!(key.len(), P256_PUBLIC_KEY_LENGTH);
        assert_eq!(key[0], 0x04);

        assert!(matches!(
            decode_public_key("FWm6VC-Bt_ZZ163WXu-X-w"),
            Err(Error::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_encode_with_both_keys() {
        let record = encode(&handle(Some(vec![4, 1, 2]), Some(vec![9; 16])));
        let keys = record.keys.unwrap();

        assert_eq!(record.endpoint, "https://push.example.com/send/1");
        assert_eq!(keys.p256dh, "BAEC");
        assert_eq!(decode(&keys.auth).unwrap(), vec![9; 16]);
    }

    #[test]
    fn test_encode_never_partial_keys() {
        assert!(encode(&handle(Some(vec![4, 1, 2]), None)).keys.is_none());
        assert!(encode(&handle(None, Some(vec![9; 16]))).keys.is_none());
        assert!(encode(&handle(None, None)).keys.is_none());
    }
}
