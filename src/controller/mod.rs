//! API Controller modules

use actix_web::HttpRequest;

use crate::{error::Error, registry::DEFAULT_SUBJECT};

pub mod send_notification;
pub mod service_worker;
pub mod subscribe;
pub mod vapid_public_key;
pub mod version;

pub const SUBJECT_HEADER: &str = "x-push-subject";

/// Registry key for the request; an absent or blank header maps to the
/// default subject.
pub fn subject(req: &HttpRequest) -> Result<String, Error> {
    let subject = match req.headers().get(SUBJECT_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| Error::InvalidOption {
                option: String::from(SUBJECT_HEADER),
            })?
            .trim()
            .to_owned(),
        None => String::new(),
    };

    if subject.is_empty() {
        return Ok(String::from(DEFAULT_SUBJECT));
    }

    Ok(subject)
}
