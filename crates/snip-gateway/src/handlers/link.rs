use crate::error::{AppError, Result};
use crate::model::{InfoQuery, ShortenRequest, ShortenResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use snip_core::{LinkDetail, ShortCode, ShortenParams};
use tracing::info;
use url::Url;

/// Validates that the URL has a valid format (http or https scheme and a host).
fn validate_url(raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(AppError::BadRequest("URL cannot be empty".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid URL '{raw}': {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::BadRequest(format!(
            "URL scheme must be http or https: {}",
            url.scheme()
        )));
    }

    if !url.has_host() {
        return Err(AppError::BadRequest(format!("URL has no host: {raw}")));
    }

    Ok(())
}

pub async fn shorten_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>)> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;

    validate_url(&request.url)?;
    let expiration_in_minutes = u64::try_from(request.expiration_in_minutes).map_err(|_| {
        AppError::BadRequest(format!(
            "expiration_in_minutes must be >= 0, got {}",
            request.expiration_in_minutes
        ))
    })?;

    let code = state
        .shortener()
        .shorten(ShortenParams::new(request.url, expiration_in_minutes))
        .await?;
    info!(code = %code, "shortened URL");

    let response = ShortenResponse {
        short_url: code.to_url(state.base_url()),
        short_link: code.to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn info_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<InfoQuery>, QueryRejection>,
) -> Result<Json<LinkDetail>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let code = ShortCode::parse(query.short_link).map_err(snip_core::ShortenerError::from)?;

    let detail = state.shortener().info(&code).await?;
    Ok(Json(detail))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Redirect> {
    let code = ShortCode::parse(short_code).map_err(snip_core::ShortenerError::from)?;

    let url = state.shortener().resolve(&code).await?;
    Ok(Redirect::temporary(&url))
}
