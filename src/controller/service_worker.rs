use actix_web::{get, http::header, HttpResponse, Responder};

const SERVICE_WORKER: &str = include_str!("../../static/sw.js");

/// Served outside the static directory so the browser never caches it and
/// may register it with scope `/`.
#[get("/sw.js")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/javascript"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("Service-Worker-Allowed", "/"))
        .body(SERVICE_WORKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_service_worker_headers() {
        let app = test::init_service(App::new().service(index)).await;

        let req = test::TestRequest::get().uri("/sw.js").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
        assert_eq!(resp.headers().get("service-worker-allowed").unwrap(), "/");

        let body = test::read_body(resp).await;
        let script = std::str::from_utf8(&body).unwrap();
        assert!(script.contains("notificationclick"));
    }
}
