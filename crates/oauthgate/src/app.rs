use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use oauthgate_auth::{login_required, with_oauth2, AuthState};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{index, restrict};

/// Create the application router with all routes and middleware.
///
/// The request timeout also bounds the provider code exchange: when it fires
/// the in-flight exchange is dropped with the request.
pub fn create_app(auth: AuthState) -> Router {
    let routes = Router::new().route("/", get(index)).route(
        "/restrict",
        get(restrict).route_layer(middleware::from_fn_with_state(
            auth.clone(),
            login_required,
        )),
    );

    with_oauth2(routes, auth)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, Response},
    };
    use http_body_util::BodyExt;
    use oauthgate_auth::{
        MemorySessionStore, MockProvider, OAuth2Config, ProviderEndpoints, SessionConfig,
    };
    use std::sync::Arc;
    use tower::ServiceExt;
    use url::Url;

    fn test_app() -> Router {
        let config = OAuth2Config::new(
            "client_id",
            "client_secret",
            "http://localhost:19300/oauth2callback",
            ProviderEndpoints::google(),
        )
        .unwrap()
        .with_scopes(["https://www.googleapis.com/auth/drive"]);

        let provider = MockProvider::new(Url::parse("http://localhost:3001/authorize").unwrap());
        let state = AuthState::with_provider(
            config,
            Arc::new(provider),
            Arc::new(MemorySessionStore::default()),
            SessionConfig {
                cookie_secure: false,
                ..SessionConfig::default()
            },
        )
        .unwrap();

        create_app(state)
    }

    async fn send(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response<Body>) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_string(response: Response<Body>) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_login_flow_end_to_end() {
        let app = test_app();

        // 1. Anonymous index
        let response = send(&app, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "not logged in, or the access token is expired"
        );

        // 2. Restricted page sends the visitor to login
        let response = send(&app, "/restrict", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/login?next=%2Frestrict");

        // 3. Login, then the provider calls back with the same state
        let response = send(&app, "/login?next=%2Frestrict", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let cookie = session_cookie(&response);
        let provider_url = Url::parse(&location(&response)).unwrap();
        let state = provider_url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap();

        let response = send(
            &app,
            &format!("/oauth2callback?code=demo&state={state}"),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/restrict");
        let cookie = session_cookie(&response);

        // 4. Restricted page now answers with the token
        let response = send(&app, "/restrict", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK: access-demo");

        let response = send(&app, "/", Some(&cookie)).await;
        assert_eq!(body_string(response).await, "logged in");
    }

    #[tokio::test]
    async fn test_logout_forgets_token() {
        let app = test_app();

        let response = send(&app, "/login", None).await;
        let cookie = session_cookie(&response);
        let provider_url = Url::parse(&location(&response)).unwrap();
        let state = provider_url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        let response = send(
            &app,
            &format!("/oauth2callback?code=demo&state={state}"),
            Some(&cookie),
        )
        .await;
        let cookie = session_cookie(&response);

        let response = send(&app, "/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/");

        let response = send(&app, "/restrict", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_forged_callback_is_rejected() {
        let app = test_app();

        let response = send(&app, "/login", None).await;
        let cookie = session_cookie(&response);

        let response = send(
            &app,
            "/oauth2callback?code=demo&state=forged",
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "/", Some(&cookie)).await;
        assert_eq!(
            body_string(response).await,
            "not logged in, or the access token is expired"
        );
    }
}
