use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::cli::ServeArgs;
use crate::evaluate::{EditGroup, check};
use crate::index::EditIndex;
use crate::storage::{StoragePaths, file_present_nonempty};

#[derive(Clone)]
struct AppState {
    index: Arc<EditIndex>,
    meta: Option<serde_json::Value>,
}

pub async fn run(opts: ServeArgs) -> anyhow::Result<()> {
    let paths = StoragePaths::new(&opts.data_dir, opts.rules.clone());
    tracing::info!(
        "data_dir={} rules={}",
        paths.data_dir.display(),
        paths.rules_path.display()
    );
    if !file_present_nonempty(&paths.rules_path) {
        return Err(anyhow!(
            "Rule table not found at {}. Point --rules at a CCI edits .parquet or .csv file",
            paths.rules_path.display()
        ));
    }

    let index = EditIndex::load(&paths.rules_path)?;

    let meta = if std::fs::metadata(&paths.meta_path)
        .map(|m| m.len() > 0)
        .unwrap_or(false)
    {
        let s = std::fs::read_to_string(&paths.meta_path)?;
        serde_json::from_str(&s).ok()
    } else {
        None
    };

    let state = AppState {
        index: Arc::new(index),
        meta,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/stats", get(api_stats))
        .route("/api/check", get(api_check))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", opts.host, opts.port)
        .parse()
        .context("parse host:port")?;

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    primaries: usize,
    codes: usize,
    meta: Option<serde_json::Value>,
}

async fn api_stats(State(st): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse {
        primaries: st.index.primary_count(),
        codes: st.index.code_count(),
        meta: st.meta,
    })
}

#[derive(Debug, Deserialize)]
struct CheckParams {
    codes: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    total_bundled: usize,
    total_no_edit: usize,
    groups: Vec<EditGroup>,
}

async fn api_check(State(st): State<AppState>, Query(p): Query<CheckParams>) -> impl IntoResponse {
    let report = check(p.codes.as_deref().unwrap_or(""), &st.index);
    Json(CheckResponse {
        total_bundled: report.total_bundled(),
        total_no_edit: report.total_no_edit(),
        groups: report.groups,
    })
}

#[cfg(test)]
mod tests {
    use crate::table::{RawCell, RawTable};

    use super::*;

    #[test]
    fn check_response_serializes_groups_and_totals() {
        let index = EditIndex::build(&RawTable {
            rows: vec![
                vec![
                    RawCell::text("99213"),
                    RawCell::text("99214"),
                    RawCell::text("99215"),
                ],
                vec![RawCell::text(""), RawCell::text("1"), RawCell::text("0")],
            ],
        });

        let report = check("99213 99214 99215", &index);
        let response = CheckResponse {
            total_bundled: report.total_bundled(),
            total_no_edit: report.total_no_edit(),
            groups: report.groups,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["total_bundled"], 1);
        assert_eq!(json["total_no_edit"], 1);
        assert_eq!(json["groups"][0]["primary"], "99213");
        assert_eq!(json["groups"][0]["bundled"][0], "99214");
        assert_eq!(json["groups"][0]["no_edit"][0], "99215");
    }
}
