use axum::{extract::rejection::JsonRejection, extract::State, response::IntoResponse, Json};
use budget_engine::generate_bilan;
use models::{BilanReport, BudgetSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use settings_loader::{ThemeId, catalogue, theme};
use std::sync::Arc;

use crate::{error::ApiError, Result};

/// Read-only configuration shared by the handlers. The service keeps no budget state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub default_theme: ThemeId,
}

pub type SharedState = Arc<AppState>;

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "budget-api"
    }))
}

#[derive(Debug, Deserialize)]
pub struct DoubleRequest {
    pub value: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoubleResponse {
    pub result: f64,
}

/// Accepts JSON numbers and numeric strings; everything else is a validation error.
pub fn parse_numeric(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::Validation(format!(
            "value must be numeric, got {}",
            value
        ))),
    }
}

/// POST /double
/// Returns twice the submitted value
pub async fn double(
    payload: std::result::Result<Json<DoubleRequest>, JsonRejection>,
) -> Result<Json<DoubleResponse>> {
    let Json(req) = payload?;
    let value = parse_numeric(&req.value)?;
    let result = value * 2.0;
    if !result.is_finite() {
        return Err(ApiError::Validation("value is out of range".to_string()));
    }
    Ok(Json(DoubleResponse { result }))
}

#[derive(Debug, Deserialize)]
pub struct BilanRequest {
    pub budget: BudgetSnapshot,
    #[serde(default)]
    pub theme: Option<String>,
}

/// POST /api/bilan
/// Aggregates a posted budget and returns totals, slices and chart projections
pub async fn compute_bilan(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<BilanRequest>, JsonRejection>,
) -> Result<Json<BilanReport>> {
    let Json(req) = payload?;
    let theme_id = req
        .theme
        .as_deref()
        .map(ThemeId::parse_or_default)
        .unwrap_or(state.default_theme);
    let palette = theme(theme_id).chart_palette();

    let report = generate_bilan(&req.budget, &palette);
    tracing::info!(
        theme = %theme_id,
        slices = report.slices.len(),
        net_balance = report.net_balance,
        "bilan computed"
    );
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct TokenView {
    pub name: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ThemeView {
    pub id: ThemeId,
    pub is_default: bool,
    pub tokens: Vec<TokenView>,
    pub css: String,
}

/// GET /api/themes
/// Lists the theme catalogue with each theme's CSS variable block
pub async fn list_themes(State(state): State<SharedState>) -> impl IntoResponse {
    let themes: Vec<ThemeView> = catalogue()
        .into_iter()
        .map(|t| ThemeView {
            id: t.id,
            is_default: t.id == state.default_theme,
            css: t.css_variables(),
            tokens: t
                .tokens
                .iter()
                .map(|&(name, value)| TokenView { name, value })
                .collect(),
        })
        .collect();
    Json(themes)
}
