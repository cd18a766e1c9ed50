use std::sync::Arc;

use bodyfat_llm::{ChatClient, ChatMessage, ChatRequest};
use bodyfat_model::estimate::BodyFatEstimate;
use bodyfat_model::profile::AnthropometricProfile;
use log::{info, warn};

use crate::baseline;
use crate::config::VISION_MODEL;
use crate::normalize;
use crate::vision::{self, ImagePayload};

// Estimation requests pin the decoding temperature and seed so repeated
// calls with the same profile stay as reproducible as the capability allows.
const TEMPERATURE: f32 = 0.0;
const SEED: u32 = 42;

/// Model-backed estimation methods, strongest first. The closed-form
/// formula is not listed: it is the unconditional tail of every chain and
/// cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Vision,
    Text,
}

const WITH_IMAGES: &[Strategy] = &[Strategy::Vision, Strategy::Text];
const TEXT_ONLY: &[Strategy] = &[Strategy::Text];

/// Ordered fallback chain of model-backed methods for a request. Without a
/// configured capability the chain is empty and only the formula runs.
pub fn model_plan(has_images: bool) -> &'static [Strategy] {
    if has_images {
        WITH_IMAGES
    } else {
        TEXT_ONLY
    }
}

#[derive(Debug, thiserror::Error)]
enum StrategyError {
    #[error(transparent)]
    Client(#[from] bodyfat_llm::Error),
    #[error("malformed completion: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub struct Estimator {
    client: Option<Arc<dyn ChatClient>>,
    model: String,
}

impl Estimator {
    pub fn new(client: Option<Arc<dyn ChatClient>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Estimates body fat for a profile, degrading through the strategy
    /// chain on every failure. This never fails: the Deurenberg formula is
    /// the terminal strategy and always produces a result.
    pub async fn estimate(
        &self,
        profile: &AnthropometricProfile,
        images: &[ImagePayload],
    ) -> BodyFatEstimate {
        if let Some(client) = &self.client {
            for strategy in model_plan(!images.is_empty()) {
                match self.run(client.as_ref(), *strategy, profile, images).await {
                    Ok(estimate) => {
                        info!("Estimation produced by {:?} strategy", strategy);
                        return estimate;
                    }
                    Err(e) => {
                        warn!("{:?} estimation failed, degrading to next method: {}", strategy, e)
                    }
                }
            }
        }

        info!("Estimating with the closed-form formula");
        baseline::estimate(profile)
    }

    async fn run(
        &self,
        client: &dyn ChatClient,
        strategy: Strategy,
        profile: &AnthropometricProfile,
        images: &[ImagePayload],
    ) -> Result<BodyFatEstimate, StrategyError> {
        match strategy {
            Strategy::Vision => self.estimate_from_images(client, profile, images).await,
            Strategy::Text => self.estimate_from_text(client, profile).await,
        }
    }

    async fn estimate_from_text(
        &self,
        client: &dyn ChatClient,
        profile: &AnthropometricProfile,
    ) -> Result<BodyFatEstimate, StrategyError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(TEXT_SYSTEM_PROMPT),
                ChatMessage::user(text_user_prompt(profile)),
            ],
            temperature: TEMPERATURE,
            seed: Some(SEED),
            json_response: true,
        };

        let content = client.complete(request).await?;
        Ok(normalize::text_estimate(&content, profile.gender()))
    }

    async fn estimate_from_images(
        &self,
        client: &dyn ChatClient,
        profile: &AnthropometricProfile,
        images: &[ImagePayload],
    ) -> Result<BodyFatEstimate, StrategyError> {
        // One round-trip carries all images together.
        let image_urls = images.iter().map(vision::to_data_url).collect();
        let request = ChatRequest {
            model: VISION_MODEL.to_owned(),
            messages: vec![
                ChatMessage::system(VISION_SYSTEM_PROMPT),
                ChatMessage::user_with_images(vision_user_prompt(profile, images.len()), image_urls),
            ],
            temperature: TEMPERATURE,
            seed: Some(SEED),
            json_response: true,
        };

        let content = client.complete(request).await?;
        Ok(normalize::vision_estimate(&content)?)
    }
}

const TEXT_SYSTEM_PROMPT: &str = r#"You are an expert in body composition analysis.
Your task is to estimate body fat percentage based on provided anthropometric data.

You must respond ONLY with a valid JSON object in this exact format:
{
    "body_fat_percent": <number between 0 and 100>,
    "comment": "<brief comment in 1-3 sentences, in English>"
}

Rules:
- body_fat_percent: a single number (float), no additional text
- comment: brief, informative, in English, no medical diagnoses
- Consider gender, age, height, weight, and waist circumference (if provided)
- Use standard body fat estimation formulas (e.g., Deurenberg, Jackson-Pollock) as reference
- Do not provide any text outside the JSON object"#;

fn text_user_prompt(profile: &AnthropometricProfile) -> String {
    let waist_line = profile
        .waist_cm()
        .map(|waist| format!("\n- Waist circumference: {} cm", waist))
        .unwrap_or_default();

    format!(
        "Calculate body fat percentage for:\n\
         - Gender: {}\n\
         - Age: {} years\n\
         - Height: {} cm\n\
         - Weight: {} kg{}\n\n\
         Respond with JSON only.",
        profile.gender(),
        profile.age(),
        profile.height_cm(),
        profile.weight_kg(),
        waist_line,
    )
}

const VISION_SYSTEM_PROMPT: &str = r#"You are an expert in body composition analysis and visual assessment of body fat percentage.
Your task is to estimate body fat percentage by analyzing a photo of a person combined with their anthropometric data.

You must respond ONLY with a valid JSON object in this exact format:
{
    "body_fat_percent": <number between 0 and 100>,
    "comment": "<brief comment in 1-3 sentences, in English, explaining the analysis>",
    "evaluation": "<one of: Very Low, Low (Athletic), Normal, Above Average, High>"
}

CRITICAL RULES FOR ACCURACY:
1. Be CONSERVATIVE and REALISTIC - most people underestimate body fat. Average body fat for men is 18-24%, for women 25-31%
2. Visual assessment is often MORE accurate than formulas - trust what you see in the photo
3. Look for visible fat deposits, muscle definition, body shape and proportions, skin appearance
4. If you see visible fat deposits, the body fat is likely 20% or higher
5. If abs are not visible at all, body fat is typically 18%+ for men, 25%+ for women
6. Combine visual assessment with anthropometric data, but prioritize visual cues
7. Be honest and accurate - do not underestimate

- body_fat_percent: a single number (float), be realistic and accurate
- comment: brief, informative, in English, mention specific visual indicators you observed
- evaluation: based on:
  * For men: <10% = Very Low, 10-15% = Low, 15-20% = Normal, 20-25% = Above Average, >25% = High
  * For women: <16% = Very Low, 16-20% = Low, 20-25% = Normal, 25-32% = Above Average, >32% = High
- Do not provide any text outside the JSON object"#;

fn vision_user_prompt(profile: &AnthropometricProfile, image_count: usize) -> String {
    let photos = if image_count > 1 {
        "these photos"
    } else {
        "this photo"
    };
    let bmi = profile.body_mass_index();
    let anchor = baseline::deurenberg(bmi, profile.age(), profile.gender());
    let waist_line = profile
        .waist_cm()
        .map(|waist| format!("\n- Waist circumference: {} cm", waist))
        .unwrap_or_default();

    format!(
        "Analyze {} and calculate body fat percentage for:\n\
         - Gender: {}\n\
         - Age: {} years\n\
         - Height: {} cm\n\
         - Weight: {} kg\n\
         - BMI: {:.1}{}\n\n\
         STEP 1: Baseline from the Deurenberg formula: approximately {:.1}%\n\
         STEP 2: Visual assessment (THIS IS CRITICAL): examine visible fat deposits, \
         muscle definition, body shape, and fat distribution.\n\
         STEP 3: Combine both, PRIORITIZING the visual assessment over the formula.\n\n\
         IMPORTANT: Be HONEST and REALISTIC. Most people underestimate body fat. \
         If you see fat in the photo, reflect that in your estimate.\n\n\
         Respond with JSON only.",
        photos,
        profile.gender(),
        profile.age(),
        profile.height_cm(),
        profile.weight_kg(),
        bmi,
        waist_line,
        anchor,
    )
}
