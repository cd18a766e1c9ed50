use std::sync::Arc;

use bodyfat_core::advice::{Advisor, TARGET_PERCENT};
use bodyfat_core::baseline;
use bodyfat_core::estimation::Estimator;
use bodyfat_core::timeline;
use bodyfat_core::vision::ImagePayload;
use bodyfat_llm::{Error, MockChatClient};
use bodyfat_model::advice::{AdviceRequest, Goal};
use bodyfat_model::estimate::Evaluation;
use bodyfat_model::profile::{AnthropometricProfile, Gender};

fn profile() -> AnthropometricProfile {
    AnthropometricProfile::new(Gender::Male, 30, 180.0, 80.0, Some(90.0)).unwrap()
}

#[tokio::test]
async fn unconfigured_estimator_uses_the_formula() {
    let estimator = Estimator::new(None, "gpt-4o-mini");

    let estimate = estimator.estimate(&profile(), &[]).await;

    assert_eq!(estimate, baseline::estimate(&profile()));
}

#[tokio::test]
async fn text_completion_is_normalized_with_local_evaluation() {
    let mut client = MockChatClient::new();
    client
        .expect_complete()
        .withf(|request| {
            request.model == "gpt-4o-mini" && request.seed == Some(42) && request.json_response
        })
        .returning(|_| Ok(r#"{"body_fat_percent": 21.0, "comment": "ok"}"#.to_owned()));

    let estimator = Estimator::new(Some(Arc::new(client)), "gpt-4o-mini");
    let estimate = estimator.estimate(&profile(), &[]).await;

    assert_eq!(estimate.body_fat_percent, 21.0);
    assert_eq!(estimate.comment, "ok");
    assert_eq!(estimate.evaluation, "Above Average");
}

#[tokio::test]
async fn transport_failure_degrades_to_the_formula() {
    let mut client = MockChatClient::new();
    client
        .expect_complete()
        .returning(|_| Err(Error::CommunicationError));

    let estimator = Estimator::new(Some(Arc::new(client)), "gpt-4o-mini");
    let estimate = estimator.estimate(&profile(), &[]).await;

    assert_eq!(estimate, baseline::estimate(&profile()));
}

#[tokio::test]
async fn malformed_vision_completion_falls_back_to_text() {
    let mut client = MockChatClient::new();
    client
        .expect_complete()
        .withf(|request| request.model == "gpt-4o")
        .returning(|_| Ok("not json at all".to_owned()));
    client
        .expect_complete()
        .withf(|request| request.model == "gpt-4o-mini")
        .returning(|_| Ok(r#"{"body_fat_percent": 19.0, "comment": "from text"}"#.to_owned()));

    let estimator = Estimator::new(Some(Arc::new(client)), "gpt-4o-mini");
    let images = [ImagePayload::new(vec![1, 2, 3], "image/jpeg")];
    let estimate = estimator.estimate(&profile(), &images).await;

    assert_eq!(estimate.body_fat_percent, 19.0);
    assert_eq!(estimate.comment, "from text");
}

#[tokio::test]
async fn vision_evaluation_is_passed_through_verbatim() {
    let mut client = MockChatClient::new();
    client.expect_complete().returning(|_| {
        Ok(
            r#"{"body_fat_percent": 27.0, "comment": "lean look", "evaluation": "Low (Athletic)"}"#
                .to_owned(),
        )
    });

    let estimator = Estimator::new(Some(Arc::new(client)), "gpt-4o-mini");
    let images = [ImagePayload::new(vec![1, 2, 3], "image/jpeg")];
    let estimate = estimator.estimate(&profile(), &images).await;

    // Known inconsistency: the label is not re-checked against the number.
    assert_eq!(estimate.body_fat_percent, 27.0);
    assert_eq!(estimate.evaluation, "Low (Athletic)");
}

#[tokio::test]
async fn advisor_overrides_the_model_time_estimate() {
    let mut client = MockChatClient::new();
    client.expect_complete().returning(|_| {
        Ok(r#"{
            "title": "Coach says",
            "sections": [{"title": "Nutrition", "content": "eat well"}],
            "time_estimate": [{"percent": 5.0, "months": 1}]
        }"#
        .to_owned())
    });

    let advisor = Advisor::new(Some(Arc::new(client)), "gpt-4o-mini");
    let request = AdviceRequest::new(28.0, Gender::Male, 35, Evaluation::High).unwrap();
    let bundle = advisor.advise(&request).await;

    assert_eq!(bundle.title, "Coach says");
    assert_eq!(bundle.sections.len(), 1);
    assert_eq!(
        bundle.time_estimate,
        timeline::reduction_plan(28.0, TARGET_PERCENT, Gender::Male)
    );
}

#[tokio::test]
async fn malformed_sections_field_selects_the_template() {
    let mut client = MockChatClient::new();
    client.expect_complete().returning(|_| {
        Ok(r#"{"title": "Coach says", "sections": "not an array"}"#.to_owned())
    });

    let advisor = Advisor::new(Some(Arc::new(client)), "gpt-4o-mini");
    let request = AdviceRequest::new(28.0, Gender::Male, 35, Evaluation::High).unwrap();
    let bundle = advisor.advise(&request).await;

    assert_eq!(bundle.title, "Tips for Reducing Body Fat");
    assert_eq!(bundle.sections.len(), 3);
}

#[tokio::test]
async fn advisor_failure_selects_the_template() {
    let mut client = MockChatClient::new();
    client
        .expect_complete()
        .returning(|_| Err(Error::EmptyCompletion));

    let advisor = Advisor::new(Some(Arc::new(client)), "gpt-4o-mini");
    let request = AdviceRequest::new(28.0, Gender::Male, 35, Evaluation::High).unwrap();
    let bundle = advisor.advise(&request).await;

    assert_eq!(bundle.title, "Tips for Reducing Body Fat");
    let macros = bundle.sections[0].macros.unwrap();
    assert_eq!(macros.calories.goal, Goal::Lose);
    assert_eq!(bundle.time_estimate.last().unwrap().percent, 10.0);
    assert!(bundle.time_estimate.last().unwrap().months > 0);
}

#[tokio::test]
async fn unconfigured_advisor_still_projects_the_timeline() {
    let advisor = Advisor::new(None, "gpt-4o-mini");
    let request = AdviceRequest::new(22.5, Gender::Female, 40, Evaluation::Normal).unwrap();
    let bundle = advisor.advise(&request).await;

    assert_eq!(bundle.title, "Recommendations for Achieving Athletic Form");
    assert_eq!(
        bundle.time_estimate,
        timeline::reduction_plan(22.5, TARGET_PERCENT, Gender::Female)
    );
}
