use crate::agents::FunctionCall;
use crate::agents::gemini::FunctionDeclaration;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

pub const CALCULATE_NATAL_CHART: &str = "calculate_natal_chart";
pub const GET_LUNAR_CALENDAR: &str = "get_lunar_calendar";

/// Tools the model may call, keyed by tool name with typed arguments
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "args", rename_all = "snake_case")]
pub enum ToolCall {
    CalculateNatalChart {
        /// ISO birth time
        birth_time: String,
        #[serde(default)]
        latitude: Option<f64>,
        #[serde(default)]
        longitude: Option<f64>,
    },
    GetLunarCalendar {
        /// YYYY-MM-DD
        date: String,
    },
}

/// Why a function call could not be turned into a `ToolCall`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolCallError {
    #[error("Function not found")]
    UnknownTool,
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolCall {
    pub fn from_function_call(call: &FunctionCall) -> Result<Self, ToolCallError> {
        if !matches!(call.name.as_str(), CALCULATE_NATAL_CHART | GET_LUNAR_CALENDAR) {
            return Err(ToolCallError::UnknownTool);
        }
        let args = if call.args.is_null() {
            json!({})
        } else {
            call.args.clone()
        };
        serde_json::from_value(json!({ "name": call.name, "args": args }))
            .map_err(|error| ToolCallError::InvalidArguments(error.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct NatalChartResult {
    sun: &'static str,
    moon: &'static str,
    ziwei_star: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct LunarCalendarResult {
    lunar_date: &'static str,
    status: &'static str,
}

/// Placeholder outcome for a typed call; no astrology is computed
fn execute_tool(tool: &ToolCall) -> JsonValue {
    let result = match tool {
        ToolCall::CalculateNatalChart { .. } => serde_json::to_value(NatalChartResult {
            sun: "解析中...",
            moon: "解析中...",
            ziwei_star: "主星入命宮",
            status: "success",
        }),
        ToolCall::GetLunarCalendar { .. } => serde_json::to_value(LunarCalendarResult {
            lunar_date: "農曆查詢成功",
            status: "success",
        }),
    };
    result.unwrap_or_else(|error| json!({ "error": error.to_string() }))
}

/// Resolves any function call to a result object. Never fails: unknown tools and
/// bad arguments come back as `{"error": ...}` for the model to narrate.
#[must_use]
pub fn resolve(call: &FunctionCall) -> JsonValue {
    match ToolCall::from_function_call(call) {
        Ok(tool) => {
            tracing::debug!(?tool, "resolving tool call");
            execute_tool(&tool)
        }
        Err(error @ ToolCallError::UnknownTool) => {
            tracing::warn!(name = %call.name, "model requested unknown tool");
            json!({ "error": error.to_string() })
        }
        Err(ToolCallError::InvalidArguments(detail)) => {
            tracing::warn!(name = %call.name, %detail, "tool call arguments rejected");
            json!({ "error": format!("Invalid arguments for {}: {}", call.name, detail) })
        }
    }
}

/// Declarations registered on every chat session; fixed for the process lifetime
#[must_use]
pub fn function_declarations() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration {
            name: CALCULATE_NATAL_CHART.to_string(),
            description: "計算精確星盤數據與紫微命盤".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "birth_time": { "type": "STRING", "description": "ISO format birth time" },
                    "latitude": { "type": "NUMBER" },
                    "longitude": { "type": "NUMBER" }
                },
                "required": ["birth_time"]
            }),
        },
        FunctionDeclaration {
            name: GET_LUNAR_CALENDAR.to_string(),
            description: "進行陰陽曆轉換，獲取農曆與節氣資訊".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "date": { "type": "STRING", "description": "YYYY-MM-DD" }
                },
                "required": ["date"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: JsonValue) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_parses_natal_chart_with_optional_coordinates() {
        let parsed = ToolCall::from_function_call(&call(
            CALCULATE_NATAL_CHART,
            json!({"birth_time": "1990-05-01T08:30:00", "latitude": 25.03}),
        ))
        .unwrap();
        assert_eq!(
            parsed,
            ToolCall::CalculateNatalChart {
                birth_time: "1990-05-01T08:30:00".to_string(),
                latitude: Some(25.03),
                longitude: None,
            }
        );
    }

    #[test]
    fn test_missing_required_argument_is_invalid() {
        let error = ToolCall::from_function_call(&call(GET_LUNAR_CALENDAR, json!({}))).unwrap_err();
        assert!(matches!(error, ToolCallError::InvalidArguments(_)));
        assert!(error.to_string().starts_with("Invalid arguments: "));
        assert!(error.to_string().contains("date"));
    }

    #[test]
    fn test_unknown_tool_error_message() {
        let error = ToolCall::from_function_call(&call("summon_dragon", json!({}))).unwrap_err();
        assert_eq!(error, ToolCallError::UnknownTool);
        assert_eq!(error.to_string(), "Function not found");
    }

    #[test]
    fn test_resolves_stub_results() {
        assert_eq!(
            resolve(&call(GET_LUNAR_CALENDAR, json!({"date": "2024-06-01"}))),
            json!({"lunar_date": "農曆查詢成功", "status": "success"})
        );
        assert_eq!(
            resolve(&call(CALCULATE_NATAL_CHART, json!({"birth_time": "1990-05-01T08:30"}))),
            json!({
                "sun": "解析中...",
                "moon": "解析中...",
                "ziwei_star": "主星入命宮",
                "status": "success"
            })
        );
    }

    #[test]
    fn test_unknown_tool_resolves_to_error_object() {
        assert_eq!(
            resolve(&call("summon_dragon", json!({"power": 9000}))),
            json!({"error": "Function not found"})
        );
    }

    #[test]
    fn test_resolution_is_total() {
        let names = [CALCULATE_NATAL_CHART, GET_LUNAR_CALENDAR, "", "unknown", "get_lunar_calendar "];
        let args = [
            JsonValue::Null,
            json!({}),
            json!([]),
            json!("text"),
            json!({"date": 20240601}),
            json!({"birth_time": "x", "latitude": "north"}),
        ];
        for name in names {
            for arg in &args {
                let result = resolve(&call(name, arg.clone()));
                assert!(result.is_object(), "{} {:?} -> {:?}", name, arg, result);
                assert!(
                    result.get("status").is_some() || result.get("error").is_some(),
                    "{} {:?} -> {:?}",
                    name,
                    arg,
                    result
                );
            }
        }
    }

    #[test]
    fn test_declarations_are_fixed() {
        let declarations = function_declarations();
        assert_eq!(declarations, function_declarations());
        let names: Vec<&str> = declarations.iter().map(|decl| decl.name.as_str()).collect();
        assert_eq!(names, [CALCULATE_NATAL_CHART, GET_LUNAR_CALENDAR]);
        assert_eq!(declarations[0].parameters["required"], json!(["birth_time"]));
        assert_eq!(declarations[1].parameters["required"], json!(["date"]));
    }
}
