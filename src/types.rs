#[derive(serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MockUsageReport {
    pub total_tokens: u64,
    pub api_calls: u64,
    pub opus_cost: f64,
    pub sonnet_cost: f64,
    pub haiku_cost: f64,
    pub total_cost: f64,
    pub web_tokens: u64,
    pub terminal_tokens: u64,
    /// Oldest first, ending today.
    pub daily_usage: Vec<DailyUsageEntry>,
    pub usage_limit: u64,
    pub last_updated: String,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageEntry {
    /// `YYYY-MM-DD`
    pub date: String,
    pub tokens: u64,
    pub api_calls: u64,
    pub cost: f64,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    /// Every key is valid as far as the mock is concerned.
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            valid: true,
            message: "API key is valid".to_string(),
        }
    }
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
