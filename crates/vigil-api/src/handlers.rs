//! HTTP handlers for the API surface.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use vigil_alerts::{AlertError, AlertFilter, AlertSeverity};
use vigil_errors::{ErrorStoreError, ReportFilter};
use vigil_health::{HealthError, HealthStatus};
use vigil_logs::{LogFilter, LogLevel};
use vigil_metrics::{MetricName, now_timestamp};
use vigil_notify::NotifyError;
use vigil_resilience::BreakerSnapshot;

use crate::error::{ApiError, ApiResult};
use crate::state::ApiState;
use crate::types::{
    AlertsQuery, AlertsResponse, CacheOverview, DatabaseOverview, ErrorsQuery, ErrorsResponse,
    HealthResponse, LogsQuery, LogsResponse, MetricHistoryResponse, MetricPointBody,
    MetricsOverviewResponse, MetricsQuery, RecordMetricBody, RecordMetricResponse,
    RequestsOverview, ResolveResponse, StatusResponse, TestChannelBody, TestChannelResponse,
};

const DEFAULT_LIST_LIMIT: usize = 100;
const MAX_HISTORY_RETURNED: usize = 1000;

fn latest(state: &ApiState, metric: &str) -> Option<f64> {
    let name = MetricName::new(metric).ok()?;
    state.monitor().metrics().latest(&name)
}

/// `GET /metrics` — overview, or one metric's history with `?metric=`.
pub async fn get_metrics(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Response> {
    let Some(metric) = query.metric else {
        let overview = MetricsOverviewResponse {
            cpu: latest(&state, "system.cpu.usage"),
            memory: latest(&state, "system.memory.usage"),
            disk: latest(&state, "system.disk.usage"),
            requests: RequestsOverview {
                response_time_ms: latest(&state, "http.response_time_ms"),
            },
            database: DatabaseOverview {
                query_time_ms: latest(&state, "db.query_time_ms"),
            },
            cache: CacheOverview {
                hit_rate: latest(&state, "cache.hit_rate"),
            },
        };
        return Ok(Json(overview).into_response());
    };

    let name =
        MetricName::new(&metric).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let cutoff = query.time_range.map(|range| now_timestamp() - range);
    let history = state
        .monitor()
        .metrics()
        .history(&name, MAX_HISTORY_RETURNED)
        .into_iter()
        .filter(|m| cutoff.is_none_or(|c| m.timestamp >= c))
        .map(|m| MetricPointBody {
            timestamp: m.timestamp,
            value: m.value,
            unit: m.unit,
        })
        .collect();

    Ok(Json(MetricHistoryResponse { metric, history }).into_response())
}

/// `POST /metrics/{name}` — records one sample.
pub async fn record_metric(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(body): Json<RecordMetricBody>,
) -> ApiResult<Json<RecordMetricResponse>> {
    let value = body
        .value
        .as_f64()
        .ok_or_else(|| ApiError::InvalidRequest("metric value must be numeric".to_string()))?;

    let name = MetricName::new(&name).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let metric = state.monitor().record_metric(
        name,
        value,
        body.unit.unwrap_or_default(),
        body.tags.unwrap_or_else(HashMap::new),
    );

    Ok(Json(RecordMetricResponse {
        name: metric.name.into_inner(),
        value: metric.value,
        unit: metric.unit,
        tags: metric.tags,
    }))
}

/// `GET /health` — aggregate of every dependency.
pub async fn get_health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let health = state.monitor().health();
    Json(HealthResponse {
        status: health.overall().as_str().to_string(),
        checks: health.all_checks(),
        summary: health.summary(),
    })
}

/// `GET /health/{service}` — one dependency's current record.
pub async fn get_service_health(
    State(state): State<Arc<ApiState>>,
    Path(service): Path<String>,
) -> ApiResult<Response> {
    state.monitor().health().current(&service).map_or_else(
        || Err(ApiError::NotFound("service".to_string(), service.clone())),
        |check| Ok(Json(check).into_response()),
    )
}

/// `POST /health/{service}/check` — forces one probe.
pub async fn check_service_health(
    State(state): State<Arc<ApiState>>,
    Path(service): Path<String>,
) -> ApiResult<Response> {
    match state.monitor().health_runner().run_one(&service).await {
        Ok(check) => Ok(Json(check).into_response()),
        Err(HealthError::DependencyNotFound { name }) => {
            Err(ApiError::NotFound("service".to_string(), name))
        }
        Err(e) => Err(ApiError::internal(e.to_string(), state.dev_mode())),
    }
}

/// `GET /alerts` — filtered alerts with statistics.
pub async fn get_alerts(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AlertsQuery>,
) -> ApiResult<Json<AlertsResponse>> {
    let severity = query
        .severity
        .as_deref()
        .map(|s| {
            AlertSeverity::parse(s)
                .ok_or_else(|| ApiError::InvalidRequest(format!("unknown severity '{s}'")))
        })
        .transpose()?;

    let filter = AlertFilter {
        resolved: query.resolved,
        severity,
    };
    let engine = state.monitor().engine();
    let alerts = engine.list_alerts(&filter, query.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    Ok(Json(AlertsResponse {
        total: alerts.len(),
        statistics: engine.statistics(),
        alerts,
    }))
}

/// `POST /alerts/{id}/resolve` — idempotent.
pub async fn resolve_alert(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResolveResponse>> {
    match state.monitor().engine().resolve(&id) {
        Ok(true) => Ok(Json(ResolveResponse {
            message: "alert resolved".to_string(),
        })),
        Ok(false) => Ok(Json(ResolveResponse {
            message: "alert already resolved".to_string(),
        })),
        Err(AlertError::AlertNotFound { id }) => {
            Err(ApiError::NotFound("alert".to_string(), id))
        }
        Err(e) => Err(ApiError::internal(e.to_string(), state.dev_mode())),
    }
}

/// `GET /logs` — filtered log entries.
pub async fn get_logs(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<LogsResponse>> {
    let level = query
        .level
        .as_deref()
        .map(|l| {
            LogLevel::parse(l)
                .ok_or_else(|| ApiError::InvalidRequest(format!("unknown log level '{l}'")))
        })
        .transpose()?;

    let filter = LogFilter {
        level,
        service: query.service,
        start_time: query.start_time,
        end_time: query.end_time,
    };
    let logs = state
        .monitor()
        .logs()
        .query(&filter, query.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    Ok(Json(LogsResponse {
        total: logs.len(),
        logs,
    }))
}

/// `GET /errors` — filtered error reports.
pub async fn get_errors(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ErrorsQuery>,
) -> ApiResult<Json<ErrorsResponse>> {
    let filter = ReportFilter {
        service: query.service,
        resolved: query.resolved,
    };
    let errors = state
        .monitor()
        .errors()
        .list(&filter, query.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    Ok(Json(ErrorsResponse {
        total: errors.len(),
        errors,
    }))
}

/// `POST /errors/{id}/resolve` — idempotent.
pub async fn resolve_error(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResolveResponse>> {
    match state.monitor().errors().resolve(&id) {
        Ok(true) => Ok(Json(ResolveResponse {
            message: "error report resolved".to_string(),
        })),
        Ok(false) => Ok(Json(ResolveResponse {
            message: "error report already resolved".to_string(),
        })),
        Err(ErrorStoreError::ReportNotFound { id }) => {
            Err(ApiError::NotFound("error report".to_string(), id))
        }
    }
}

/// `GET /circuit-breakers` — snapshot of every cached breaker.
pub async fn get_circuit_breakers(
    State(state): State<Arc<ApiState>>,
) -> Json<Vec<BreakerSnapshot>> {
    Json(state.monitor().resilience().snapshots())
}

/// `GET /status` — load-balancer probe; 503 unless aggregate healthy.
pub async fn get_status(State(state): State<Arc<ApiState>>) -> Response {
    let overall = state.monitor().health().overall();
    let healthy = overall == HealthStatus::Healthy;
    let body = Json(StatusResponse {
        status: overall.as_str().to_string(),
        healthy,
    });

    if healthy {
        (StatusCode::OK, body).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

/// `POST /alerting/test-channel` — sends a synthetic low-severity alert.
pub async fn test_channel(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<TestChannelBody>,
) -> ApiResult<Json<TestChannelResponse>> {
    match state.monitor().dispatcher().test_channel(&body.channel) {
        Ok(success) => Ok(Json(TestChannelResponse {
            channel: body.channel,
            success,
        })),
        Err(NotifyError::ChannelNotFound { name }) => {
            Err(ApiError::NotFound("channel".to_string(), name))
        }
        Err(NotifyError::ChannelDisabled { name }) => Err(ApiError::InvalidRequest(format!(
            "channel '{name}' is disabled"
        ))),
        Err(_) => Ok(Json(TestChannelResponse {
            channel: body.channel,
            success: false,
        })),
    }
}
