use std::path::PathBuf;

use chrono::Utc;

use super::Workspace;

pub fn run(
    update: Option<String>,
    refresh: bool,
    data: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = Workspace::load(data)?;

    if let Some(unit_id) = update {
        let mastery = ws.planner.record_study(&mut ws.dataset, &unit_id, Utc::now())?;
        ws.save()?;
        println!("{unit_id}: mastery {mastery}");
        return Ok(());
    }

    if refresh {
        let changed = ws.planner.refresh_mastery(&mut ws.dataset);
        ws.save()?;
        println!("refreshed mastery ({changed} unit(s) changed)");
        return Ok(());
    }

    let units = ws.planner.current_units(&ws.dataset);
    if units.is_empty() {
        println!("no study units");
        return Ok(());
    }
    for unit in &units {
        let studied = unit
            .last_studied_at
            .map(|t| t.date_naive().to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<12} {:>3}  #{} {}  (last studied {studied})",
            unit.id, unit.mastery, unit.number, unit.name
        );
    }
    Ok(())
}
