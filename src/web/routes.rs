use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::analysis::types::AuthorShare;
use crate::analysis::{PartitionReport, Report, Selection, SentimentValue};

use super::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub user: Option<String>,
}

impl UserQuery {
    fn selection(&self) -> Selection {
        Selection::author(self.user.as_deref().unwrap_or_default())
    }
}

fn parse_value(raw: i8) -> Result<SentimentValue, (StatusCode, String)> {
    SentimentValue::try_from(raw).map_err(|e| (StatusCode::BAD_REQUEST, e))
}

pub async fn participants(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.engine.participants(&state.records))
}

pub async fn report(State(state): State<AppState>, Query(query): Query<UserQuery>) -> Json<Report> {
    let selection = query.selection();
    debug!("Building report for {:?}", selection.author);
    Json(Report::build(&state.engine, &state.records, &selection, state.limits))
}

pub async fn sentiment(
    State(state): State<AppState>,
    Path(value): Path<i8>,
    Query(query): Query<UserQuery>,
) -> Result<Json<PartitionReport>, (StatusCode, String)> {
    let value = parse_value(value)?;
    let selection = query.selection();
    debug!("Building {} partition for {:?}", value, selection.author);
    Ok(Json(PartitionReport::build(
        &state.engine,
        &state.records,
        &selection,
        value,
        state.limits,
    )))
}

pub async fn contribution(
    State(state): State<AppState>,
    Path(value): Path<i8>,
) -> Result<Json<Vec<AuthorShare>>, (StatusCode, String)> {
    let value = parse_value(value)?;
    Ok(Json(state.engine.percentage_contribution(&state.records, value)))
}
