use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{
        AdviseMetadata, AdviseRequest, AdviseResponse, AnalyzeMetadata, AnalyzeRequest,
        AnalyzeResponse, HealthResponse, SecuritiesResponse, TechnicalData,
    },
};
use advisor_core::securities::{resolve_isin, supported_securities};
use advisor_core::Error as CoreError;

const SERVICE_NAME: &str = "Investment Advisor";

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn resolve_ticker(isin: &str) -> ApiResult<&'static str> {
    if isin.trim().is_empty() {
        return Err(ApiError::BadRequest("isin must not be empty".to_string()));
    }
    resolve_isin(isin)
        .ok_or_else(|| ApiError::from(CoreError::UnknownIsin(isin.trim().to_uppercase())))
}

async fn analyze_security(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    tracing::info!("Received analysis request for ISIN {}", payload.isin);
    let ticker = resolve_ticker(&payload.isin)?;

    let snapshot = state.data_service.company_snapshot(ticker).await?;
    let report = state.report_engine.investment_report(&snapshot).await?;

    let asset_name = payload
        .asset_name
        .or_else(|| snapshot.name.clone())
        .unwrap_or_else(|| "N/A".to_string());

    Ok(Json(AnalyzeResponse {
        success: true,
        ticker: ticker.to_string(),
        isin: payload.isin,
        report: report.markdown,
        metadata: AnalyzeMetadata {
            asset_name,
            sector: snapshot.sector.unwrap_or_else(|| "N/A".to_string()),
            fetched_at: snapshot.fetched_at,
            llm_provider: report.provider,
            data_provider: snapshot.data_providers.quotes,
        },
    }))
}

async fn advise_on_trade(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdviseRequest>,
) -> ApiResult<Json<AdviseResponse>> {
    tracing::info!("Received advisory request for ISIN {}", payload.isin);
    let ticker = resolve_ticker(&payload.isin)?;

    let advisor_data = state.data_service.get_advisor_data(ticker).await?;
    let report = state.report_engine.advisory_report(&advisor_data).await?;

    let asset_name = payload
        .asset_name
        .or_else(|| advisor_data.name.clone())
        .unwrap_or_else(|| "N/A".to_string());

    Ok(Json(AdviseResponse {
        success: true,
        ticker: ticker.to_string(),
        isin: payload.isin,
        advisory_report: report.markdown,
        technical_data: TechnicalData {
            rsi: advisor_data.rsi,
            trend: advisor_data.trend,
            support_level: advisor_data.support_level,
            resistance_level: advisor_data.resistance_level,
            current_price: advisor_data.current_price,
            target_price: advisor_data.target_mean_price,
            recommendation: advisor_data.recommendation_key.clone(),
        },
        metadata: AdviseMetadata {
            asset_name,
            sector: advisor_data.sector.unwrap_or_else(|| "N/A".to_string()),
            data_timestamp: advisor_data.data_timestamp,
            analyst_count: advisor_data.number_of_analysts.unwrap_or(0),
            llm_provider: report.provider,
            data_provider: advisor_data.data_providers.quotes,
        },
    }))
}

async fn list_securities() -> Json<SecuritiesResponse> {
    let securities = supported_securities();
    Json(SecuritiesResponse {
        total_count: securities.len(),
        securities,
    })
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/analyze", post(analyze_security))
        .route("/advise", post(advise_on_trade))
        .route("/securities", get(list_securities));

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::main_lib::build_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            market_data: Default::default(),
            llm: Default::default(),
        }
    }

    fn test_router() -> Router {
        let config = test_config();
        let state = build_state(&config).unwrap();
        app_router(state, &config)
    }

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_reports_healthy() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response.into_body()).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], SERVICE_NAME);
    }

    #[tokio::test]
    async fn securities_endpoint_lists_the_table() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/securities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response.into_body()).await;
        assert_eq!(
            json["total_count"].as_u64().unwrap() as usize,
            supported_securities().len()
        );
    }

    #[tokio::test]
    async fn unknown_isin_returns_not_found() {
        let response = test_router()
            .oneshot(
                Request::post("/api/v1/advise")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"isin": "XX0000000000"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response.into_body()).await;
        assert_eq!(json["code"], 404);
    }

    #[tokio::test]
    async fn empty_isin_returns_bad_request() {
        let response = test_router()
            .oneshot(
                Request::post("/api/v1/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"isin": "  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
