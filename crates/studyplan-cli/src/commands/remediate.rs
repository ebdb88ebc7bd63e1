use std::path::PathBuf;

use chrono::Utc;

use super::Workspace;

pub fn run(apply: bool, data: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::load(data)?;
    let now = Utc::now();

    if !apply {
        let candidates = ws.planner.remediation_candidates(&ws.dataset, now);
        if candidates.is_empty() {
            println!("no units need remediation");
        }
        for c in &candidates {
            println!("{}: {} recent mistakes ({})", c.unit_id, c.error_count, c.unit_name);
        }
        return Ok(());
    }

    let created = ws.planner.apply_remediation(&mut ws.dataset, now);
    ws.save()?;
    println!("created {} review task(s)", created.len());
    for task in &created {
        println!("  {}  {} ({} min)", task.id, task.title, task.estimated_minutes);
    }
    Ok(())
}
