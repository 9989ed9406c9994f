use std::time::Instant;

use actix_web::error::InternalError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpRequest, HttpResponse, Responder};
use attrition_inferences::{InferenceService, PredictionRequest};
use log::{error, info};

use crate::models::{ApiResponse, Health};
use crate::render::{render_page, Outcome};

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

/// Form with the submitted (or default) values and no result.
pub async fn index(query: Option<web::Query<PredictionRequest>>) -> impl Responder {
    let request = query.map(|q| q.into_inner().clamped()).unwrap_or_default();
    html(StatusCode::OK, render_page(&request, None))
}

pub async fn predict(service: web::Data<InferenceService>, form: web::Form<Vec<(String, String)>>) -> impl Responder {
    let start_time = Instant::now();
    let (request, problems) = PredictionRequest::from_fields(form.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let request = request.clamped();

    if !problems.is_empty() {
        let reason = problems.join("; ");
        error!("Rejected form submission: {}", reason);
        return html(StatusCode::BAD_REQUEST, render_page(&request, Some(&Outcome::Rejected(reason))));
    }

    let record = request.to_record();

    let service = service.clone();
    let outcome = match web::block(move || service.predict(&record)).await {
        Ok(Ok(result)) => {
            info!(
                "Prediction: label={:?} stay={:.3} leave={:.3} in {}ms",
                result.label,
                result.stay_probability,
                result.leave_probability,
                start_time.elapsed().as_millis()
            );
            Outcome::Predicted(result)
        }
        Ok(Err(e)) => {
            error!("Prediction failed: {}", e);
            Outcome::Failed(e)
        }
        Err(e) => {
            error!("Blocking prediction task failed: {}", e);
            let page = render_page(&request, Some(&Outcome::Rejected("prediction could not be run".into())));
            return html(StatusCode::INTERNAL_SERVER_ERROR, page);
        }
    };

    let status = match &outcome {
        Outcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    html(status, render_page(&request, Some(&outcome)))
}

/// The body itself could not be read as a form, so no field values survive.
fn form_error(err: actix_web::error::UrlencodedError, _req: &HttpRequest) -> Error {
    let reason = err.to_string();
    error!("Rejected form submission: {}", reason);
    let page = render_page(&PredictionRequest::default(), Some(&Outcome::Rejected(reason)));
    InternalError::from_response(err, html(StatusCode::BAD_REQUEST, page)).into()
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(Health::up()))
}

pub async fn model_info(service: web::Data<InferenceService>) -> impl Responder {
    let start_time = Instant::now();
    HttpResponse::Ok().json(ApiResponse::success(service.describe()).with_elapsed(start_time))
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Endpoint not found"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(form_error))
        .route("/", web::get().to(index))
        .route("/predict", web::post().to(predict))
        .route("/api/health", web::get().to(health_check))
        .route("/api/model-info", web::get().to(model_info));
}
