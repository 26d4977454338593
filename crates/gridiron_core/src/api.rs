//! JSON façade for hosts that only speak strings.
//!
//! Requests carry `schema_version`; responses are serialized with
//! `serde_json` and failures come back as `Err(String)`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::offseason::{AdvanceDayResult, FranchiseTagCandidate, OffseasonController};

pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FranchiseTagCandidatesRequest {
    pub schema_version: u8,
    pub team_id: u32,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FranchiseTagCandidatesResponse {
    pub schema_version: u8,
    pub team_id: u32,
    pub candidates: Vec<FranchiseTagCandidate>,
}

/// Advance one day and return the [`AdvanceDayResult`] as JSON. Failures
/// are reported inside the result, never as an error string.
pub fn advance_day_json(controller: &mut OffseasonController) -> String {
    let result = controller.advance_day();
    serde_json::to_string(&result).unwrap_or_else(|e| {
        serde_json::json!({
            "success": false,
            "message": format!("Failed to serialize result: {}", e),
        })
        .to_string()
    })
}

pub fn franchise_tag_candidates_json(
    controller: &OffseasonController,
    request_json: &str,
) -> Result<String, String> {
    let request: FranchiseTagCandidatesRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let candidates = controller
        .franchise_tag_candidates(request.team_id)
        .map_err(|e| format!("Failed to evaluate candidates: {}", e))?;
    let response = FranchiseTagCandidatesResponse {
        schema_version: SCHEMA_VERSION,
        team_id: request.team_id,
        candidates,
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize result: {}", e))
}

/// JSON Schema of the `advance_day_json` payload.
pub fn advance_day_schema_json() -> Result<String, String> {
    let schema = schemars::schema_for!(AdvanceDayResult);
    serde_json::to_string_pretty(&schema).map_err(|e| format!("Failed to serialize schema: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynastyConfig;
    use crate::offseason::handlers::fixtures::seeded_league;
    use crate::offseason::handlers::franchise_tag::tests::add_expiring_qb;

    fn controller() -> OffseasonController {
        let config = DynastyConfig::testing();
        let (db, d) = seeded_league(&config, 2025);
        add_expiring_qb(&db, &d.dynasty_id, 7, 2025);
        OffseasonController::new(db, d.dynasty_id, config).unwrap()
    }

    #[test]
    fn test_advance_day_json_shape() {
        let mut c = controller();
        let parsed: serde_json::Value = serde_json::from_str(&advance_day_json(&mut c)).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["games_played"], 0);
        assert_eq!(parsed["current_phase"], "POST_SUPER_BOWL");
        assert!(parsed["new_date"].is_string());
        assert!(parsed["results"].is_array());
        assert!(parsed["new_phase"].is_null());
    }

    #[test]
    fn test_candidates_json() {
        let c = controller();
        let request = r#"{"schema_version":1,"team_id":7}"#;
        let body = franchise_tag_candidates_json(&c, request).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["team_id"], 7);
        let ids: Vec<&str> = parsed["candidates"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["player_id"].as_str())
            .collect();
        assert!(ids.contains(&"qb_elite"));
    }

    #[test]
    fn test_candidates_json_rejects_bad_requests() {
        let c = controller();
        let err = franchise_tag_candidates_json(&c, "not json").unwrap_err();
        assert!(err.contains("Invalid JSON"));
        assert!(franchise_tag_candidates_json(&c, r#"{"schema_version":2,"team_id":7}"#)
            .unwrap_err()
            .contains("Unsupported schema version"));
    }

    #[test]
    fn test_schema_names_every_field() {
        let schema = advance_day_schema_json().unwrap();
        let fields = [
            "new_date",
            "games_played",
            "results",
            "current_phase",
            "phase_changed",
            "new_phase",
            "success",
            "message",
        ];
        for field in fields {
            assert!(schema.contains(field), "{field} missing from schema");
        }
    }
}
