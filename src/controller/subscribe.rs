use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
    types::PushSubscriptionRecord,
};

use super::subject;

#[post("/subscribe")]
pub async fn post_index(
    state: web::Data<AppState<State>>,
    subscription: web::Json<PushSubscriptionRecord>,
    req: HttpRequest,
) -> Result<HttpResponse, Error> {
    let subject = subject(&req)?;
    let result = state
        .actions
        .subscribe_user(&subject, subscription.into_inner())
        .await;

    Ok(HttpResponse::Ok().json(result))
}

#[delete("/subscribe")]
pub async fn delete_index(
    state: web::Data<AppState<State>>,
    req: HttpRequest,
) -> Result<HttpResponse, Error> {
    let subject = subject(&req)?;
    let result = state.actions.unsubscribe_user(&subject).await;

    Ok(HttpResponse::Ok().json(result))
}

#[get("/subscribe")]
pub async fn get_index(
    state: web::Data<AppState<State>>,
    req: HttpRequest,
) -> Result<HttpResponse, Error> {
    let subject = subject(&req)?;
    let result = state.actions.subscription(&subject).await.is_some();

    Ok(HttpResponse::Ok().json(Response { result }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub result: bool,
}
