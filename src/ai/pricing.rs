//! Cost accounting for provider token usage.

use super::TokenUsage;
use serde::Serialize;

// gemini-2.5-flash-image list price: $0.30 per 1M input tokens,
// $30.00 per 1M output (image) tokens.
const INPUT_USD_PER_TOKEN: f64 = 0.30 / 1_000_000.0;
const OUTPUT_USD_PER_TOKEN: f64 = 30.0 / 1_000_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

/// USD cost of one generation call, derived from its token usage.
pub fn cost_for(usage: &TokenUsage) -> CostBreakdown {
    let input_cost_usd = f64::from(usage.prompt_tokens) * INPUT_USD_PER_TOKEN;
    let output_cost_usd = f64::from(usage.candidates_tokens) * OUTPUT_USD_PER_TOKEN;

    CostBreakdown {
        input_cost_usd,
        output_cost_usd,
        total_cost_usd: input_cost_usd + output_cost_usd,
    }
}
