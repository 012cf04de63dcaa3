//! Route configuration for the API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    check_service_health, get_alerts, get_circuit_breakers, get_errors, get_health, get_logs,
    get_metrics, get_service_health, get_status, record_metric, resolve_alert, resolve_error,
    test_channel,
};
use crate::state::ApiState;

/// Create the API router.
pub fn create_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Metrics
        .route("/metrics", get(get_metrics))
        .route("/metrics/{name}", post(record_metric))
        // Health
        .route("/health", get(get_health))
        .route("/health/{service}", get(get_service_health))
        .route("/health/{service}/check", post(check_service_health))
        // Alerts
        .route("/alerts", get(get_alerts))
        .route("/alerts/{id}/resolve", post(resolve_alert))
        // Logs
        .route("/logs", get(get_logs))
        // Error reports
        .route("/errors", get(get_errors))
        .route("/errors/{id}/resolve", post(resolve_error))
        // Resilience
        .route("/circuit-breakers", get(get_circuit_breakers))
        // Load-balancer probe
        .route("/status", get(get_status))
        // Channel verification
        .route("/alerting/test-channel", post(test_channel))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use std::sync::Arc as StdArc;
    use tower::ServiceExt;
    use vigil_core::{Monitor, MonitorConfig};
    use vigil_health::{FnProbe, ProbeReport, ServiceDependency};
    use vigil_metrics::MetricName;

    fn make_state() -> Arc<ApiState> {
        Arc::new(ApiState::new(Monitor::new(MonitorConfig::default())))
    }

    fn make_state_with_monitor() -> (Arc<ApiState>, Monitor) {
        let monitor = Monitor::new(MonitorConfig::default());
        (Arc::new(ApiState::new(monitor.clone())), monitor)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    mod status_tests {
        use super::*;

        #[tokio::test]
        async fn status_is_ok_with_no_dependencies() {
            let app = create_router(make_state());

            let response = app.oneshot(get_req("/status")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let json = body_json(response).await;
            assert_eq!(json["healthy"], true);
            assert_eq!(json["status"], "healthy");
        }

        #[tokio::test]
        async fn status_is_503_when_a_dependency_fails() {
            let (state, monitor) = make_state_with_monitor();
            monitor
                .register_dependency(ServiceDependency::new(
                    "db",
                    "database",
                    StdArc::new(FnProbe::new(|| async {
                        Err::<ProbeReport, _>("down".into())
                    })),
                ))
                .unwrap();
            monitor.health_runner().run_all().await;

            let app = create_router(state);
            let response = app.oneshot(get_req("/status")).await.unwrap();

            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            let json = body_json(response).await;
            assert_eq!(json["healthy"], false);
        }
    }

    mod metrics_tests {
        use super::*;

        #[tokio::test]
        async fn record_and_read_back_history() {
            let app = create_router(make_state());

            let response = app
                .clone()
                .oneshot(post_req(
                    "/metrics/api.latency_ms",
                    serde_json::json!({"value": 12.5, "unit": "ms"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["name"], "api.latency_ms");
            assert_eq!(json["value"], 12.5);

            let response = app
                .oneshot(get_req("/metrics?metric=api.latency_ms"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["metric"], "api.latency_ms");
            assert_eq!(json["history"].as_array().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn non_numeric_value_is_400() {
            let app = create_router(make_state());

            let response = app
                .oneshot(post_req(
                    "/metrics/api.latency_ms",
                    serde_json::json!({"value": "fast"}),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert_eq!(json["error"], "invalid_request");
        }

        #[tokio::test]
        async fn invalid_metric_name_is_400() {
            let app = create_router(make_state());

            let response = app
                .oneshot(post_req(
                    "/metrics/9bad",
                    serde_json::json!({"value": 1.0}),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn overview_contains_resource_sections() {
            let (state, monitor) = make_state_with_monitor();
            monitor.record_metric(
                MetricName::new("system.cpu.usage").unwrap(),
                40.0,
                "percent",
                HashMap::new(),
            );

            let app = create_router(state);
            let response = app.oneshot(get_req("/metrics")).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["cpu"], 40.0);
            assert!(json["requests"].is_object());
            assert!(json["database"].is_object());
            assert!(json["cache"].is_object());
        }

        #[tokio::test]
        async fn recording_a_breach_creates_an_alert() {
            let app = create_router(make_state());

            let response = app
                .clone()
                .oneshot(post_req(
                    "/metrics/system.memory.usage",
                    serde_json::json!({"value": 96, "unit": "percent"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let response = app.oneshot(get_req("/alerts")).await.unwrap();
            let json = body_json(response).await;
            assert_eq!(json["total"], 1);
            assert_eq!(json["alerts"][0]["severity"], "critical");
        }
    }

    mod health_tests {
        use super::*;

        #[tokio::test]
        async fn health_aggregate_shape() {
            let app = create_router(make_state());

            let response = app.oneshot(get_req("/health")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let json = body_json(response).await;
            assert_eq!(json["status"], "healthy");
            assert!(json["checks"].as_array().unwrap().is_empty());
            assert_eq!(json["summary"]["total"], 0);
        }

        #[tokio::test]
        async fn unknown_service_is_404() {
            let app = create_router(make_state());
            let response = app.oneshot(get_req("/health/ghost")).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn forced_check_returns_updated_record() {
            let (state, monitor) = make_state_with_monitor();
            monitor
                .register_dependency(ServiceDependency::new(
                    "db",
                    "database",
                    StdArc::new(FnProbe::new(|| async {
                        Ok(ProbeReport::healthy("pool ok"))
                    })),
                ))
                .unwrap();

            let app = create_router(state);
            let response = app.oneshot(post_empty("/health/db/check")).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["status"], "healthy");
            assert_eq!(json["name"], "db");
        }

        #[tokio::test]
        async fn forced_check_unknown_service_is_404() {
            let app = create_router(make_state());
            let response = app
                .oneshot(post_empty("/health/ghost/check"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    mod alerts_tests {
        use super::*;

        #[tokio::test]
        async fn resolve_is_idempotent_over_http() {
            let (state, monitor) = make_state_with_monitor();
            let alert = monitor.engine().create_alert(vigil_alerts::NewAlert::new(
                "test",
                vigil_alerts::AlertSeverity::High,
                "t",
                "m",
                "test",
            ));

            let app = create_router(state);

            let response = app
                .clone()
                .oneshot(post_empty(&format!("/alerts/{}/resolve", alert.id)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["message"], "alert resolved");

            let response = app
                .oneshot(post_empty(&format!("/alerts/{}/resolve", alert.id)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["message"], "alert already resolved");
        }

        #[tokio::test]
        async fn resolve_unknown_alert_is_404() {
            let app = create_router(make_state());
            let response = app
                .oneshot(post_empty("/alerts/no-such-id/resolve"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn alerts_filter_by_severity() {
            let (state, monitor) = make_state_with_monitor();
            monitor.engine().create_alert(vigil_alerts::NewAlert::new(
                "test",
                vigil_alerts::AlertSeverity::Critical,
                "c",
                "m",
                "test",
            ));
            monitor.engine().create_alert(vigil_alerts::NewAlert::new(
                "test",
                vigil_alerts::AlertSeverity::Low,
                "l",
                "m",
                "test",
            ));

            let app = create_router(state);
            let response = app
                .oneshot(get_req("/alerts?severity=critical"))
                .await
                .unwrap();

            let json = body_json(response).await;
            assert_eq!(json["total"], 1);
            assert_eq!(json["statistics"]["total"], 2);
        }

        #[tokio::test]
        async fn invalid_severity_filter_is_400() {
            let app = create_router(make_state());
            let response = app
                .oneshot(get_req("/alerts?severity=urgent"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    mod logs_tests {
        use super::*;

        #[tokio::test]
        async fn logs_filter_by_level() {
            let (state, monitor) = make_state_with_monitor();
            monitor.logs().append(vigil_logs::LogEntry::now(
                vigil_logs::LogLevel::Error,
                "alerts",
                "boom",
            ));
            monitor.logs().append(vigil_logs::LogEntry::now(
                vigil_logs::LogLevel::Info,
                "health",
                "fine",
            ));

            let app = create_router(state);
            let response = app.oneshot(get_req("/logs?level=error")).await.unwrap();

            let json = body_json(response).await;
            assert_eq!(json["total"], 1);
            assert_eq!(json["logs"][0]["service"], "alerts");
        }

        #[tokio::test]
        async fn invalid_level_is_400() {
            let app = create_router(make_state());
            let response = app.oneshot(get_req("/logs?level=loud")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    mod errors_tests {
        use super::*;

        #[tokio::test]
        async fn errors_list_and_resolve() {
            let (state, monitor) = make_state_with_monitor();
            let report = monitor.errors().handle(
                "ValidationError",
                "name too long",
                vigil_errors::ErrorContext::new("web", "create"),
            );

            let app = create_router(state);

            let response = app.clone().oneshot(get_req("/errors")).await.unwrap();
            let json = body_json(response).await;
            assert_eq!(json["total"], 1);

            let response = app
                .clone()
                .oneshot(post_empty(&format!("/errors/{}/resolve", report.id)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let response = app
                .oneshot(get_req("/errors?resolved=false"))
                .await
                .unwrap();
            let json = body_json(response).await;
            assert_eq!(json["total"], 0);
        }

        #[tokio::test]
        async fn resolve_unknown_error_is_404() {
            let app = create_router(make_state());
            let response = app
                .oneshot(post_empty("/errors/ghost/resolve"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    mod breaker_tests {
        use super::*;

        #[tokio::test]
        async fn circuit_breakers_list_is_empty_initially() {
            let app = create_router(make_state());
            let response = app.oneshot(get_req("/circuit-breakers")).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert!(json.as_array().unwrap().is_empty());
        }
    }

    mod test_channel_tests {
        use super::*;

        #[tokio::test]
        async fn test_channel_succeeds_for_registered_channel() {
            let app = create_router(make_state());

            let response = app
                .oneshot(post_req(
                    "/alerting/test-channel",
                    serde_json::json!({"channel": "slack"}),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["channel"], "slack");
            assert_eq!(json["success"], true);
        }

        #[tokio::test]
        async fn test_unknown_channel_is_404() {
            let app = create_router(make_state());

            let response = app
                .oneshot(post_req(
                    "/alerting/test-channel",
                    serde_json::json!({"channel": "pager"}),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }
}
