use std::path::PathBuf;

use chrono::Utc;

use super::Workspace;

pub fn run(json: bool, data: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::load(data)?;
    let scored = ws.planner.score(&ws.dataset, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&scored)?);
        return Ok(());
    }

    if scored.is_empty() {
        println!("no open tasks");
        return Ok(());
    }
    println!(
        "{:>6}  {:>6} {:>6} {:>6} {:>6}  {:<15} TITLE",
        "TOTAL", "URG", "IMP", "WEAK", "REC", "TYPE"
    );
    for s in &scored {
        println!(
            "{:>6.2}  {:>6.2} {:>6.2} {:>6.2} {:>6.2}  {:<15} {}",
            s.total,
            s.urgency,
            s.importance,
            s.weakness_bonus,
            s.recency_bonus,
            s.task_type().as_str(),
            s.task.title
        );
    }
    Ok(())
}
