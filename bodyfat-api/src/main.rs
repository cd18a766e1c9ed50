use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::info;
use serde::Deserialize;

use bodyfat_core::advice::Advisor;
use bodyfat_core::config::Settings;
use bodyfat_core::estimation::Estimator;
use bodyfat_core::vision::ImagePayload;
use bodyfat_llm::ChatClient;
use bodyfat_model::advice::AdviceRequest;
use bodyfat_model::estimate::Evaluation;
use bodyfat_model::profile::{AnthropometricProfile, Gender};

#[derive(Deserialize)]
struct ImageUpload {
    data: String,
    #[serde(default)]
    media_type: String,
}

#[derive(Deserialize)]
struct BodyFatForm {
    gender: Gender,
    age: u32,
    height: f64,
    weight: f64,
    #[serde(default)]
    waist: Option<f64>,
    #[serde(default)]
    images: Vec<ImageUpload>,
}

#[derive(Deserialize)]
struct AdviceForm {
    body_fat_percent: f64,
    gender: Gender,
    age: u32,
    evaluation: Evaluation,
}

#[get("/")]
async fn index() -> impl Responder {
    web::Json(serde_json::json!({ "message": "BodyFat API is running" }))
}

#[post("/api/bodyfat")]
async fn estimate_body_fat(
    estimator: web::Data<Estimator>,
    form: web::Json<BodyFatForm>,
) -> actix_web::Result<impl Responder> {
    let form = form.into_inner();
    let profile =
        AnthropometricProfile::new(form.gender, form.age, form.height, form.weight, form.waist)
            .map_err(actix_web::error::ErrorBadRequest)?;
    let images = form
        .images
        .into_iter()
        .map(|upload| {
            STANDARD
                .decode(upload.data)
                .map(|bytes| ImagePayload::new(bytes, upload.media_type))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(actix_web::error::ErrorBadRequest)?;

    Ok(web::Json(estimator.estimate(&profile, &images).await))
}

#[post("/api/advice")]
async fn get_advice(
    advisor: web::Data<Advisor>,
    form: web::Json<AdviceForm>,
) -> actix_web::Result<impl Responder> {
    let form = form.into_inner();
    let request = AdviceRequest::new(form.body_fat_percent, form.gender, form.age, form.evaluation)
        .map_err(actix_web::error::ErrorBadRequest)?;

    Ok(web::Json(advisor.advise(&request).await))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    log4rs::init_file("log4rs.yml", Default::default()).unwrap();

    let settings = Settings::from_env();
    match &settings.api_key {
        Some(_) => info!("Completion capability configured, text model {}", settings.model),
        None => info!("No API key configured, running in deterministic mode"),
    }

    let client: Option<Arc<dyn ChatClient>> = settings
        .api_key
        .clone()
        .map(|key| Arc::new(bodyfat_llm::create(key)) as Arc<dyn ChatClient>);
    let estimator = web::Data::new(Estimator::new(client.clone(), settings.model.clone()));
    let advisor = web::Data::new(Advisor::new(client, settings.model));

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(estimator.clone())
            .app_data(advisor.clone())
            .service(index)
            .service(estimate_body_fat)
            .service(get_advice)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
