//! Visibility analysis endpoint.

use std::sync::Arc;

use aivis_core::CompanyProfile;
use aivis_visibility::{run_analysis, AnalysisReport, AnalysisSettings, VisibilityError};
use axum::{extract::State, Extension, Json};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// POST /api/v1/analyses: run a full analysis for the posted company profile.
///
/// Runs synchronously; the response carries the complete report.
pub(super) async fn create_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(profile): Json<CompanyProfile>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let settings = AnalysisSettings::from(state.config.as_ref());

    match run_analysis(Arc::clone(&state.gateway), &settings, &profile).await {
        Ok(report) => {
            tracing::info!(
                request_id = %req_id.0,
                company = %report.company.name,
                insights = report.insights.len(),
                "analysis complete"
            );
            Ok(Json(ApiResponse {
                data: report,
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        Err(VisibilityError::InvalidProfile(e)) => {
            Err(ApiError::new(req_id.0, "validation_error", e.to_string()))
        }
    }
}
