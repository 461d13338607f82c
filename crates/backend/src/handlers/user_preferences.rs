use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use contracts::system::preferences::{PreferenceResponse, SavePreferencesRequest};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreferenceQuery {
    pub preference: String,
}

/// GET /api/user/pref?preference=toolbar
pub async fn get_preference(
    State(state): State<AppState>,
    Query(query): Query<PreferenceQuery>,
) -> Result<Json<PreferenceResponse>, StatusCode> {
    match state.preferences.get(&state.user, &query.preference).await {
        Ok(data) => Ok(Json(PreferenceResponse::ok(data))),
        Err(e) => {
            tracing::error!("Failed to load preference '{}': {}", query.preference, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/user/pref
pub async fn save_preferences(
    State(state): State<AppState>,
    Json(request): Json<SavePreferencesRequest>,
) -> Result<Json<PreferenceResponse>, StatusCode> {
    for item in &request.preference {
        if let Err(e) = state
            .preferences
            .set(&state.user, &item.option, &item.value)
            .await
        {
            tracing::error!("Failed to save preference '{}': {}", item.option, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    Ok(Json(PreferenceResponse {
        success: true,
        message: "Updated preferences".to_string(),
        data: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{api, test_router};
    use axum::http::StatusCode;
    use contracts::system::toolbar::{ToolbarState, TOOLBAR_PREFERENCE};
    use serde_json::json;

    #[tokio::test]
    async fn test_toolbar_state_survives_roundtrip() {
        let (router, _dir) = test_router(false).await;

        let (status, empty) = api(&router, "GET", "/api/user/pref?preference=toolbar", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty["success"], true);
        assert!(empty["data"].is_null());

        let mut toolbar = ToolbarState::new();
        toolbar.create_new_tab();
        let blob = serde_json::to_string(&toolbar.to_prefs()).unwrap();

        let (status, saved) = api(
            &router,
            "POST",
            "/api/user/pref",
            Some(json!({"preference": [{"option": TOOLBAR_PREFERENCE, "value": blob}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["success"], true);

        let (_, loaded) = api(&router, "GET", "/api/user/pref?preference=toolbar", None).await;
        assert_eq!(loaded["data"]["preference"], TOOLBAR_PREFERENCE);
        let value = loaded["data"]["value"].as_str().unwrap();
        let restored = ToolbarState::from_prefs(serde_json::from_str(value).unwrap());
        assert_eq!(restored.menu_items.len(), toolbar.menu_items.len());
    }

    #[tokio::test]
    async fn test_missing_query_is_rejected() {
        let (router, _dir) = test_router(false).await;
        let (status, _) = api(&router, "GET", "/api/user/pref", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
