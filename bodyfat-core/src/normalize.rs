use bodyfat_model::estimate::{BodyFatEstimate, Evaluation};
use bodyfat_model::profile::Gender;
use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::round1;

const FALLBACK_PERCENT: f64 = 20.0;
const COMMENT_PREFIX_CHARS: usize = 100;

/// Normalizes a text-path completion into an estimate. This never fails:
/// malformed JSON degrades to scanning the raw text for the first numeric
/// token, 20.0 when there is none. The evaluation label is always
/// classified locally.
pub fn text_estimate(raw: &str, gender: Gender) -> BodyFatEstimate {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            let percent = percent_field(&value).unwrap_or(0.0);
            let comment = value
                .get("comment")
                .and_then(Value::as_str)
                .unwrap_or("Calculation completed.")
                .to_owned();

            BodyFatEstimate {
                body_fat_percent: round1(percent.clamp(0.0, 100.0)),
                comment,
                evaluation: Evaluation::from_percent(percent, gender).to_string(),
            }
        }
        Err(e) => {
            debug!("Completion is not valid JSON ({}), scanning raw text", e);
            let percent = first_number(raw).unwrap_or(FALLBACK_PERCENT);
            let prefix: String = raw.chars().take(COMMENT_PREFIX_CHARS).collect();

            BodyFatEstimate {
                body_fat_percent: round1(percent.clamp(0.0, 100.0)),
                comment: format!("Calculation completed. {}", prefix),
                evaluation: Evaluation::from_percent(percent, gender).to_string(),
            }
        }
    }
}

/// Normalizes an image-path completion. Valid JSON is required here; a parse
/// failure bubbles up so the orchestrator can retry without images. The
/// evaluation string is passed through verbatim, without re-checking it
/// against the numeric thresholds.
pub fn vision_estimate(raw: &str) -> Result<BodyFatEstimate, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;

    let percent = percent_field(&value).unwrap_or(0.0);
    let comment = value
        .get("comment")
        .and_then(Value::as_str)
        .unwrap_or("Calculation completed based on photo and parameters.")
        .to_owned();
    let evaluation = value
        .get("evaluation")
        .and_then(Value::as_str)
        .unwrap_or("Normal")
        .to_owned();

    Ok(BodyFatEstimate {
        body_fat_percent: round1(percent.clamp(0.0, 100.0)),
        comment,
        evaluation,
    })
}

fn percent_field(value: &Value) -> Option<f64> {
    match value.get("body_fat_percent")? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn first_number(text: &str) -> Option<f64> {
    let pattern = Regex::new(r"\d+\.?\d*").ok()?;
    pattern.find(text)?.as_str().parse().ok()
}
