use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{EngineConfig, ServerConfig};
use crate::error::PlannerError;
use crate::request::{ExamScheduleRequest, SeatingRequest};
use crate::schedule::{generate_arrangement, generate_exam_schedule};

pub struct AppState {
    pub engine: EngineConfig,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    hints: Vec<&'static str>,
}

fn planner_error(err: &PlannerError) -> HttpResponse {
    warn!(error = %err, "request rejected");
    HttpResponse::BadRequest().json(ErrorResponse {
        error: err.to_string(),
        hints: err.remediation_hints(),
    })
}

fn internal_error(err: impl std::fmt::Display) -> HttpResponse {
    error!(error = %err, "planner task failed");
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: format!("internal error: {}", err),
        hints: Vec::new(),
    })
}

// Seating for every rostered candidate
async fn create_seating(
    req: web::Json<SeatingRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let request = req.into_inner();
    let engine = state.engine.clone();
    info!(classes = request.classes.len(), halls = request.halls.len(), "seating request");

    // The allocator is CPU bound; keep it off the async workers
    let outcome = web::block(move || {
        let mut rng = engine.rng();
        generate_arrangement(&request.classes, &request.halls, &engine, &mut rng)
    })
    .await;

    Ok(match outcome {
        Ok(Ok(plan)) => HttpResponse::Ok().json(plan),
        Ok(Err(e)) => planner_error(&e),
        Err(e) => internal_error(e),
    })
}

// Full timetable with seating and invigilators
async fn create_exam_schedule(
    req: web::Json<ExamScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let request = req.into_inner();
    let engine = state.engine.clone();
    info!(
        classes = request.classes.len(),
        halls = request.halls.len(),
        teachers = request.teachers.len(),
        "exam schedule request"
    );

    let outcome = web::block(move || {
        let mut rng = engine.rng();
        generate_exam_schedule(&request, &engine, &mut rng)
    })
    .await;

    Ok(match outcome {
        Ok(Ok(schedule)) => HttpResponse::Ok().json(schedule),
        Ok(Err(e)) => planner_error(&e),
        Err(e) => internal_error(e),
    })
}

async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "healthy"})))
}

/// Routes shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/seating", web::post().to(create_seating))
        .route("/api/exam-schedule", web::post().to(create_exam_schedule))
        .route("/api/health", web::get().to(health));
}

pub async fn start_server(server: ServerConfig, engine: EngineConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { engine });
    info!(bind = %server.bind, port = server.port, "starting web server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((server.bind.as_str(), server.port))?
    .run()
    .await
}
