use std::sync::Arc;

use bodyfat_llm::{ChatClient, ChatMessage, ChatRequest};
use bodyfat_model::advice::{
    AdviceBundle, AdviceRequest, AdviceSection, CalorieTarget, Goal, MacroBreakdown,
    MacroNutrient, TimelineStep,
};
use bodyfat_model::estimate::Evaluation;
use bodyfat_model::profile::Gender;
use log::{info, warn};
use serde_json::Value;

use crate::timeline;

/// Universal target anchor: every plan is framed as progress toward the
/// athletic 10% reference point, whatever the current evaluation.
pub const TARGET_PERCENT: f64 = 10.0;

// Advice is the one place where some variety is wanted.
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
enum AdviceError {
    #[error(transparent)]
    Client(#[from] bodyfat_llm::Error),
    #[error("malformed completion: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub struct Advisor {
    client: Option<Arc<dyn ChatClient>>,
    model: String,
}

impl Advisor {
    pub fn new(client: Option<Arc<dyn ChatClient>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Produces an advice bundle for the request. Narrative content comes
    /// from the capability when one is configured; the time estimate never
    /// does. Whatever the capability returns, the bundle carries the locally
    /// computed plan. This never fails: any error selects the built-in
    /// template.
    pub async fn advise(&self, request: &AdviceRequest) -> AdviceBundle {
        let timeline = timeline::reduction_plan(
            request.body_fat_percent(),
            TARGET_PERCENT,
            request.gender(),
        );

        let Some(client) = &self.client else {
            info!("No completion capability configured, using built-in advice template");
            return fallback_advice(request, timeline);
        };

        match self.request_advice(client.as_ref(), request, &timeline).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Advice generation failed, using built-in template: {}", e);
                fallback_advice(request, timeline)
            }
        }
    }

    async fn request_advice(
        &self,
        client: &dyn ChatClient,
        request: &AdviceRequest,
        timeline: &[TimelineStep],
    ) -> Result<AdviceBundle, AdviceError> {
        let timeline_json = serde_json::to_string_pretty(timeline)?;
        let chat = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(request, &timeline_json)),
            ],
            temperature: TEMPERATURE,
            seed: None,
            json_response: true,
        };

        let content = client.complete(chat).await?;
        let value: Value = serde_json::from_str(&content)?;

        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Personalized Recommendations")
            .to_owned();
        // A present but undeserializable sections value is a malformed
        // completion and selects the built-in template; an absent field is
        // just an empty list.
        let sections = match value.get("sections") {
            Some(sections) => serde_json::from_value(sections.clone())?,
            None => Vec::new(),
        };

        // The completion may carry its own time_estimate field; it is not
        // read. Planning numbers always come from the local projection.
        Ok(AdviceBundle {
            title,
            sections,
            time_estimate: timeline.to_vec(),
        })
    }
}

const SYSTEM_PROMPT: &str = r#"You are an expert fitness and nutrition coach specializing in body composition management.
Your task is to provide personalized, practical, and actionable advice for managing body fat percentage.

You must respond ONLY with a valid JSON object in this exact format:
{
    "title": "<title in English>",
    "sections": [
        {
            "title": "<section title in English>",
            "content": "<detailed content in English, paragraphs separated by \n>",
            "macros": {
                "calories": {"min": <number>, "max": <number>, "goal": "<Gain/Lose/Maintain>"},
                "protein": {"percent": <number 0-100>, "grams": <number>},
                "carbs": {"percent": <number 0-100>, "grams": <number>},
                "fats": {"percent": <number 0-100>, "grams": <number>}
            }
        }
    ],
    "time_estimate": [
        {"percent": <target body fat %>, "months": <number of months>}
    ]
}

Rules:
- title: appropriate title based on whether the person needs to reduce, maintain, or increase body fat
- sections: 3-5 sections covering nutrition, exercise, lifestyle, and specific recommendations
- any section titled "Nutrition" (or containing "Nutrition") MUST include the "macros" field,
  calculated from the person's weight, age, gender, and body fat goal; for other sections it is optional
- content: concise, practical advice in English, focused on key actionable points
- Be encouraging, realistic, and professional
- Do not provide any text outside the JSON object"#;

fn user_prompt(request: &AdviceRequest, timeline_json: &str) -> String {
    let optimal_range = match request.gender() {
        Gender::Male => "15-20%",
        Gender::Female => "20-25%",
    };
    let direction = if request.body_fat_percent() > TARGET_PERCENT {
        "Reduce"
    } else {
        "Maintain"
    };

    format!(
        "Create personalized advice for a {}, {} years old.\n\n\
         Current situation:\n\
         - Body fat percentage: {}%\n\
         - Evaluation: {}\n\
         - Optimal range for {}: {}\n\n\
         Create concise but comprehensive recommendations that will help:\n\
         1. {} body fat to athletic level (10%)\n\
         2. Improve overall health\n\
         3. Achieve long-term results\n\n\
         Include specific, focused recommendations for nutrition (with the mandatory \
         macros field), exercise, and lifestyle.\n\n\
         IMPORTANT for time_estimate:\n\
         Use EXACTLY this array (calculated using a scientific formula):\n\
         {}\n\n\
         DO NOT modify these values! Copy them exactly as they are into the \
         time_estimate field.\n\n\
         Respond with JSON only.",
        request.gender(),
        request.age(),
        request.body_fat_percent(),
        request.evaluation(),
        request.gender(),
        optimal_range,
        direction,
        timeline_json,
    )
}

fn fallback_advice(request: &AdviceRequest, timeline: Vec<TimelineStep>) -> AdviceBundle {
    let percent = request.body_fat_percent();

    match request.evaluation() {
        Evaluation::AboveAverage | Evaluation::High => AdviceBundle {
            title: "Tips for Reducing Body Fat".to_owned(),
            sections: vec![
                AdviceSection {
                    title: "Nutrition".to_owned(),
                    content: "Create a calorie deficit of 300-500 kcal per day. Increase \
                              protein intake to 1.6-2.2g per kg of body weight. Eat more \
                              vegetables, whole grains, and lean protein."
                        .to_owned(),
                    macros: Some(reduction_macros(percent)),
                },
                AdviceSection {
                    title: "Exercise".to_owned(),
                    content: "Combine strength training 3-4 times per week with cardio 2-3 \
                              times per week. Strength training will help preserve muscle \
                              mass, while cardio will accelerate fat burning."
                        .to_owned(),
                    macros: None,
                },
                lifestyle_section(),
            ],
            time_estimate: timeline,
        },
        Evaluation::Normal => AdviceBundle {
            title: "Recommendations for Achieving Athletic Form".to_owned(),
            sections: vec![
                AdviceSection {
                    title: "Nutrition".to_owned(),
                    content: "Create a small calorie deficit of 200-300 kcal per day. \
                              Increase protein intake to 2-2.5g per kg of body weight. Eat \
                              more vegetables, lean protein, and complex carbohydrates."
                        .to_owned(),
                    macros: Some(athletic_cut_macros(percent)),
                },
                AdviceSection {
                    title: "Exercise".to_owned(),
                    content: "Intense workouts 4-5 times per week. Combine strength \
                              training with high-intensity cardio. Focus on burning fat \
                              while preserving muscle mass."
                        .to_owned(),
                    macros: None,
                },
                AdviceSection {
                    title: "Lifestyle".to_owned(),
                    content: "Sleep 7-9 hours per night. Manage stress. Drink enough \
                              water. Avoid alcohol and processed foods. Be patient - \
                              reducing to 10% takes time."
                        .to_owned(),
                    macros: None,
                },
            ],
            time_estimate: timeline,
        },
        Evaluation::VeryLow | Evaluation::Low => {
            if percent > TARGET_PERCENT {
                AdviceBundle {
                    title: "Recommendations for Achieving Athletic Form".to_owned(),
                    sections: vec![
                        AdviceSection {
                            title: "Nutrition".to_owned(),
                            content: "Maintain a small calorie deficit. Increase protein \
                                      intake. Eat quality food rich in nutrients."
                                .to_owned(),
                            macros: None,
                        },
                        AdviceSection {
                            title: "Exercise".to_owned(),
                            content: "Intense workouts 4-5 times per week. Combine strength \
                                      and cardio training to achieve athletic form."
                                .to_owned(),
                            macros: None,
                        },
                    ],
                    time_estimate: timeline,
                }
            } else {
                AdviceBundle {
                    title: "Recommendations for Maintaining Athletic Form".to_owned(),
                    sections: vec![
                        AdviceSection {
                            title: "Nutrition".to_owned(),
                            content: "Maintain calorie balance. Eat a variety of \
                                      nutrient-rich foods. Control portions."
                                .to_owned(),
                            macros: None,
                        },
                        AdviceSection {
                            title: "Exercise".to_owned(),
                            content: "Regular workouts 3-4 times per week. Combine strength \
                                      and cardio training to maintain form."
                                .to_owned(),
                            macros: None,
                        },
                    ],
                    time_estimate: timeline,
                }
            }
        }
    }
}

fn lifestyle_section() -> AdviceSection {
    AdviceSection {
        title: "Lifestyle".to_owned(),
        content: "Sleep 7-9 hours per night. Manage stress. Drink enough water (30-35 ml \
                  per kg of body weight). Avoid alcohol and processed foods."
            .to_owned(),
        macros: None,
    }
}

// Calorie base scales with the current percentage; the deficit depends on
// the evaluation tier.
fn reduction_macros(percent: f64) -> MacroBreakdown {
    let daily_calories = (percent * 20.0 + 1500.0 - 400.0).max(1500.0);
    MacroBreakdown {
        calories: calorie_target(daily_calories),
        protein: MacroNutrient {
            percent: 30,
            grams: (percent * 1.8 * 2.0).round() as u32,
        },
        carbs: MacroNutrient {
            percent: 40,
            grams: (daily_calories * 0.4 / 4.0).round() as u32,
        },
        fats: MacroNutrient {
            percent: 20,
            grams: (daily_calories * 0.2 / 9.0).round() as u32,
        },
    }
}

fn athletic_cut_macros(percent: f64) -> MacroBreakdown {
    let daily_calories = (percent * 20.0 + 1500.0 - 250.0).max(1800.0);
    MacroBreakdown {
        calories: calorie_target(daily_calories),
        protein: MacroNutrient {
            percent: 30,
            grams: (percent * 2.2 * 2.0).round() as u32,
        },
        carbs: MacroNutrient {
            percent: 45,
            grams: (daily_calories * 0.45 / 4.0).round() as u32,
        },
        fats: MacroNutrient {
            percent: 25,
            grams: (daily_calories * 0.25 / 9.0).round() as u32,
        },
    }
}

fn calorie_target(daily_calories: f64) -> CalorieTarget {
    CalorieTarget {
        min: (daily_calories - 100.0) as u32,
        max: (daily_calories + 100.0) as u32,
        goal: Goal::Lose,
    }
}
