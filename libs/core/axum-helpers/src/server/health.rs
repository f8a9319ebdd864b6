use axum::{Json, http::StatusCode};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use utoipa::ToSchema;

pub const STATUS_OK: &str = "ok";
pub const STATUS_UNHEALTHY: &str = "unhealthy";
pub const DEPENDENCY_UP: &str = "UP";
pub const DEPENDENCY_DOWN: &str = "DOWN";

/// Aggregated health report.
///
/// ```json
/// { "status": "ok", "details": { "MongoDB": "UP" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    /// `ok` when every dependency is up, `unhealthy` otherwise
    #[schema(example = "ok")]
    pub status: String,
    /// Per-dependency state, `UP` or `DOWN`
    pub details: BTreeMap<String, String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// A boxed future for health checks with a string error
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Runs the named dependency checks concurrently.
///
/// Returns 200 when all pass, 503 otherwise. The body lists every check.
///
/// ```ignore
/// let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
///     "MongoDB",
///     Box::pin(async { ping(&client).await.map_err(|e| e.to_string()) }),
/// )];
/// run_health_checks(checks).await
/// ```
pub async fn run_health_checks(
    checks: Vec<(&str, HealthCheckFuture<'_>)>,
) -> (StatusCode, Json<HealthReport>) {
    let names: Vec<_> = checks.iter().map(|(name, _)| *name).collect();
    let futures: Vec<_> = checks.into_iter().map(|(_, check)| check).collect();
    let results = join_all(futures).await;

    let mut details = BTreeMap::new();
    let mut all_healthy = true;

    for (name, result) in names.into_iter().zip(results) {
        let state = match result {
            Ok(()) => DEPENDENCY_UP,
            Err(e) => {
                tracing::error!(dependency = name, error = %e, "Health check failed");
                all_healthy = false;
                DEPENDENCY_DOWN
            }
        };
        details.insert(name.to_string(), state.to_string());
    }

    let report = HealthReport {
        status: if all_healthy { STATUS_OK } else { STATUS_UNHEALTHY }.to_string(),
        details,
    };

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_checks_pass() {
        let checks: Vec<(&str, HealthCheckFuture<'_>)> =
            vec![("MongoDB", Box::pin(async { Ok(()) }))];

        let (status, Json(report)) = run_health_checks(checks).await;

        assert_eq!(status, StatusCode::OK);
        assert!(report.is_healthy());
        assert_eq!(report.details.get("MongoDB").map(String::as_str), Some("UP"));
    }

    #[tokio::test]
    async fn test_failed_check_marks_unhealthy() {
        let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
            ("MongoDB", Box::pin(async { Err("server selection timeout".to_string()) })),
            ("Cache", Box::pin(async { Ok(()) })),
        ];

        let (status, Json(report)) = run_health_checks(checks).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, "unhealthy");
        assert_eq!(report.details["MongoDB"], "DOWN");
        assert_eq!(report.details["Cache"], "UP");
    }

    #[test]
    fn test_report_serializes_expected_shape() {
        let report = HealthReport {
            status: STATUS_OK.to_string(),
            details: BTreeMap::from([("MongoDB".to_string(), DEPENDENCY_UP.to_string())]),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "ok", "details": {"MongoDB": "UP"}})
        );
    }
}
