use actix_web::{post, web, HttpRequest, HttpResponse, Result};
use serde::Deserialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
    types::{NotificationPayload, PushSubscriptionRecord},
};

use super::subject;

#[post("/send-notification")]
pub async fn index(
    state: web::Data<AppState<State>>,
    data: web::Json<Request>,
    req: HttpRequest,
) -> Result<HttpResponse, Error> {
    let subject = subject(&req)?;
    let Request {
        message,
        subscription,
    } = data.into_inner();

    let result = state
        .actions
        .send_notification(&subject, message, subscription)
        .await;

    Ok(HttpResponse::Ok().json(result))
}

#[derive(Debug, Deserialize)]
pub struct Request {
    pub message: NotificationPayload,
    #[serde(default)]
    pub subscription: Option<PushSubscriptionRecord>,
}
