//! Request and response shapes for the API surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use vigil_alerts::{Alert, AlertStatistics};
use vigil_errors::ErrorReport;
use vigil_health::{HealthCheck, HealthSummary};
use vigil_logs::LogEntry;

/// Query parameters for `GET /metrics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsQuery {
    /// Single metric to fetch history for; omitted means overview.
    pub metric: Option<String>,
    /// Restrict history to the last N milliseconds.
    #[serde(rename = "timeRange")]
    pub time_range: Option<i64>,
}

/// One history point in a single-metric response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPointBody {
    /// Sample time (epoch millis).
    pub timestamp: i64,
    /// Sample value.
    pub value: f64,
    /// Sample unit.
    pub unit: String,
}

/// Response for `GET /metrics?metric=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricHistoryResponse {
    /// The metric name.
    pub metric: String,
    /// History, most-recent-last.
    pub history: Vec<MetricPointBody>,
}

/// Request-path latency overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestsOverview {
    /// Latest `http.response_time_ms` sample.
    pub response_time_ms: Option<f64>,
}

/// Database overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseOverview {
    /// Latest `db.query_time_ms` sample.
    pub query_time_ms: Option<f64>,
}

/// Cache overview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheOverview {
    /// Latest `cache.hit_rate` sample.
    pub hit_rate: Option<f64>,
}

/// Response for `GET /metrics` without a metric filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsOverviewResponse {
    /// Latest `system.cpu.usage` sample.
    pub cpu: Option<f64>,
    /// Latest `system.memory.usage` sample.
    pub memory: Option<f64>,
    /// Latest `system.disk.usage` sample.
    pub disk: Option<f64>,
    /// Request-path overview.
    pub requests: RequestsOverview,
    /// Database overview.
    pub database: DatabaseOverview,
    /// Cache overview.
    pub cache: CacheOverview,
}

/// Body for `POST /metrics/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMetricBody {
    /// The value to record; must be numeric.
    pub value: serde_json::Value,
    /// Optional unit.
    #[serde(default)]
    pub unit: Option<String>,
    /// Optional tags.
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// Response for `POST /metrics/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetricResponse {
    /// The metric name.
    pub name: String,
    /// The recorded value.
    pub value: f64,
    /// The recorded unit.
    pub unit: String,
    /// The recorded tags.
    pub tags: HashMap<String, String>,
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Worst status across dependencies.
    pub status: String,
    /// Current record per dependency.
    pub checks: Vec<HealthCheck>,
    /// Aggregate counts.
    pub summary: HealthSummary,
}

/// Query parameters for `GET /alerts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsQuery {
    /// Filter by resolution state.
    pub resolved: Option<bool>,
    /// Filter by severity string.
    pub severity: Option<String>,
    /// Maximum alerts returned.
    pub limit: Option<usize>,
}

/// Response for `GET /alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    /// Matching alerts, most-recent-first.
    pub alerts: Vec<Alert>,
    /// Aggregate counts over the whole store.
    pub statistics: AlertStatistics,
    /// Number of alerts returned.
    pub total: usize,
}

/// Response for resolve endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// What happened.
    pub message: String,
}

/// Query parameters for `GET /logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    /// Filter by level string.
    pub level: Option<String>,
    /// Filter by service.
    pub service: Option<String>,
    /// Inclusive start (epoch millis).
    #[serde(rename = "startTime")]
    pub start_time: Option<i64>,
    /// Inclusive end (epoch millis).
    #[serde(rename = "endTime")]
    pub end_time: Option<i64>,
    /// Maximum entries returned.
    pub limit: Option<usize>,
}

/// Response for `GET /logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    /// Matching entries, most-recent-first.
    pub logs: Vec<LogEntry>,
    /// Number of entries returned.
    pub total: usize,
}

/// Query parameters for `GET /errors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorsQuery {
    /// Filter by service.
    pub service: Option<String>,
    /// Filter by resolution state.
    pub resolved: Option<bool>,
    /// Maximum reports returned.
    pub limit: Option<usize>,
}

/// Response for `GET /errors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsResponse {
    /// Matching reports, most-recently-seen first.
    pub errors: Vec<ErrorReport>,
    /// Number of reports returned.
    pub total: usize,
}

/// Response for `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Aggregate health status string.
    pub status: String,
    /// True only when the aggregate status is `healthy`.
    pub healthy: bool,
}

/// Body for `POST /alerting/test-channel`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestChannelBody {
    /// The channel name to test.
    pub channel: String,
}

/// Response for `POST /alerting/test-channel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestChannelResponse {
    /// The channel that was tested.
    pub channel: String,
    /// Whether the synthetic alert was delivered.
    pub success: bool,
}
