use actix_web::{get, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/vapid-public-key")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<HttpResponse, Error> {
    match state.actions.vapid_public_key() {
        Some(key) => Ok(HttpResponse::Ok().json(Response {
            public_key: key.to_owned(),
        })),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_state, FakeTransport, VAPID_PUBLIC_KEY};
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_public_key() {
        let state = app_state(Arc::new(FakeTransport::with_status(201)));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(index),
        )
        .await;

        let req = test::TestRequest::get().uri("/vapid-public-key").to_request();
        let response: Response = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response.public_key, VAPID_PUBLIC_KEY);
    }
}
