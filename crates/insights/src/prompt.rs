//! The typed prompt contract: what goes into the model and what must come back.

use crate::error::InsightsError;
use chrono::{DateTime, Utc};
use core_types::{Trade, TradeType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The slice of a trade the model gets to see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSample<'a> {
    pub instrument: &'a str,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub pnl: Option<Decimal>,
}

impl<'a> From<&'a Trade> for TradeSample<'a> {
    fn from(trade: &'a Trade) -> Self {
        Self {
            instrument: &trade.instrument,
            trade_type: trade.trade_type,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            entry_date: trade.entry_date,
            exit_date: trade.exit_date,
            pnl: trade.pnl,
        }
    }
}

/// One recurring pattern found in the trade history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePattern {
    pub pattern_description: String,
    pub potential_opportunities: String,
    pub risks: String,
}

impl TradePattern {
    fn is_complete(&self) -> bool {
        !self.pattern_description.trim().is_empty()
            && !self.potential_opportunities.trim().is_empty()
            && !self.risks.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct AnalysisOutput {
    patterns: Vec<TradePattern>,
}

/// The JSON string of trades embedded in the prompt.
pub fn build_trade_data(trades: &[Trade]) -> Result<String, InsightsError> {
    let samples: Vec<TradeSample<'_>> = trades.iter().map(TradeSample::from).collect();
    Ok(serde_json::to_string(&samples)?)
}

pub fn build_prompt(trade_data: &str) -> String {
    format!(
        "You are an expert trading pattern analyst. Analyze the following trade data to identify \
recurring patterns, potential opportunities, and risks.

Trade Data: {trade_data}

Identify at least 3 patterns if possible. If there are less than 3, identify as many as possible.

Ensure that patternDescription, potentialOpportunities, and risks are populated for each identified pattern.

Return your analysis in JSON format as an object with a single key \"patterns\" holding an array of \
objects with the keys \"patternDescription\", \"potentialOpportunities\" and \"risks\"."
    )
}

/// Parses the model's answer, tolerating a Markdown code fence around the JSON.
///
/// Patterns with an empty field are dropped.
pub fn parse_patterns(text: &str) -> Result<Vec<TradePattern>, InsightsError> {
    let body = strip_code_fence(text);
    let output: AnalysisOutput =
        serde_json::from_str(body).map_err(|e| InsightsError::Parse(e.to_string()))?;

    let total = output.patterns.len();
    let patterns: Vec<TradePattern> = output
        .patterns
        .into_iter()
        .filter(TradePattern::is_complete)
        .collect();
    if patterns.len() < total {
        tracing::warn!(dropped = total - patterns.len(), "Dropped incomplete patterns from model output.");
    }
    Ok(patterns)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag on the opening fence.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn trade_data_keeps_only_the_prompt_fields() {
        let trade = Trade::new(
            "NVDA",
            TradeType::Long,
            dec!(900.5),
            dec!(10),
            Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap(),
        )
        .with_notes("private thoughts")
        .with_chart_image_url(Some("data:image/png;base64,AAAA".to_string()));

        let data = build_trade_data(&[trade]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();

        assert_eq!(value[0]["instrument"], "NVDA");
        assert_eq!(value[0]["entryPrice"], "900.5");
        assert!(value[0].get("notes").is_none());
        assert!(value[0].get("chartImageUrl").is_none());
        assert!(value[0].get("id").is_none());
    }

    #[test]
    fn prompt_embeds_trade_data() {
        let prompt = build_prompt("[{\"instrument\":\"SPY\"}]");
        assert!(prompt.contains("Trade Data: [{\"instrument\":\"SPY\"}]"));
        assert!(prompt.contains("at least 3 patterns"));
    }

    #[test]
    fn parses_fenced_output_and_drops_incomplete_patterns() {
        let text = "```json\n{\"patterns\": [\
            {\"patternDescription\": \"Morning breakouts win\", \"potentialOpportunities\": \"Size up before 11am\", \"risks\": \"News reversals\"},\
            {\"patternDescription\": \"Half done\", \"potentialOpportunities\": \"\", \"risks\": \"x\"}\
        ]}\n```";
        let patterns = parse_patterns(text).unwrap();

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_description, "Morning breakouts win");
    }

    #[test]
    fn plain_json_parses() {
        let patterns = parse_patterns(r#"{"patterns": []}"#).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn prose_is_a_parse_error() {
        let result = parse_patterns("I could not find any patterns.");
        assert!(matches!(result, Err(InsightsError::Parse(_))));
    }
}
