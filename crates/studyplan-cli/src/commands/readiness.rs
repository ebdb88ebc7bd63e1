use std::path::PathBuf;

use chrono::Utc;

use super::Workspace;

pub fn run(json: bool, data: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::load(data)?;
    let report = ws.planner.readiness_report(&ws.dataset, Utc::now());

    if json {
        let rows: Vec<serde_json::Value> = report
            .iter()
            .map(|r| match &r.result {
                Ok(score) => serde_json::json!({
                    "course_id": r.course_id,
                    "course_name": r.course_name,
                    "readiness": score,
                }),
                Err(e) => serde_json::json!({
                    "course_id": r.course_id,
                    "course_name": r.course_name,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("no courses");
        return Ok(());
    }
    for r in &report {
        match &r.result {
            Ok(s) => println!(
                "{:<24} {:>3}  (coverage {}, accuracy {}, recency {}, pacing {})",
                r.course_name, s.total, s.coverage, s.accuracy, s.recency, s.pacing
            ),
            Err(e) => println!("{:<24}   -  ({e})", r.course_name),
        }
    }
    Ok(())
}
