use std::path::Path;

use exam_seating::config::{EngineConfig, ServerConfig};
use exam_seating::export::export_seating_to_csv;
use exam_seating::parser::{load_halls, load_rosters, load_teachers};
use exam_seating::request::ExamScheduleRequest;
use exam_seating::schedule::{generate_arrangement, generate_exam_schedule};
use exam_seating::{logging, web};
use tracing::info;

const USAGE: &str = "usage:
  exam-seating seat <classes.csv> <halls.csv> [out.csv]
  exam-seating schedule <request.json> [teachers.csv]
  exam-seating web [port]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let engine = EngineConfig::from_env()?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("web") => {
            let server = ServerConfig::from_args(args.get(2).map(String::as_str));
            println!("Access the planner at http://localhost:{}", server.port);
            web::start_server(server, engine).await?;
        }
        Some("seat") if args.len() >= 4 => {
            let classes = load_rosters(&args[2])?;
            let halls = load_halls(&args[3])?;
            info!(classes = classes.len(), halls = halls.len(), "inputs loaded");

            let mut rng = engine.rng();
            let plan = generate_arrangement(&classes, &halls, &engine, &mut rng)?;

            match args.get(4) {
                Some(out) => {
                    let rows = export_seating_to_csv(&plan, Path::new(out))?;
                    println!(
                        "Wrote {} seats across {} halls to {}",
                        rows, plan.summary.halls_used, out
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
        }
        Some("schedule") if args.len() >= 3 => {
            let raw = std::fs::read_to_string(&args[2])?;
            let mut request: ExamScheduleRequest = serde_json::from_str(&raw)?;
            if let Some(path) = args.get(3) {
                request.teachers = load_teachers(path)?;
                info!(teachers = request.teachers.len(), "teachers loaded from {}", path);
            }

            let mut rng = engine.rng();
            let schedule = generate_exam_schedule(&request, &engine, &mut rng)?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
