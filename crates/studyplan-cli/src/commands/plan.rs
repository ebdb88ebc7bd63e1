use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use studyplan_core::{DailyPlan, PlanHistory, PlanSnapshot};

use super::Workspace;

#[derive(Args)]
pub struct PlanArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Record the plan in history
    #[arg(long)]
    save: bool,
    /// Daily minutes target (defaults to planner.daily_minutes_target)
    #[arg(long)]
    minutes: Option<u32>,
}

pub fn run(args: PlanArgs, data: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::load(data)?;
    let outcome = ws.planner.build_plan(&ws.dataset, args.minutes, Utc::now());

    let snapshot_id = if args.save {
        let snapshot = PlanSnapshot::from_plan(&outcome.plan);
        PlanHistory::open()?.record(&snapshot)?;
        Some(snapshot.id)
    } else {
        None
    };

    if args.json {
        let out = serde_json::json!({
            "plan": outcome.plan,
            "warnings": outcome.diagnostics.warnings,
            "snapshot_id": snapshot_id,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_plan(&outcome.plan);
    for warning in &outcome.diagnostics.warnings {
        println!("note: {warning}");
    }
    if let Some(id) = snapshot_id {
        println!("saved plan {id}");
    }
    Ok(())
}

fn print_plan(plan: &DailyPlan) {
    println!(
        "Plan for {} ({} / {} min)",
        plan.generated_at.date_naive(),
        plan.total_minutes,
        plan.target_minutes()
    );
    for lane in plan.lanes() {
        println!();
        println!("{:<15} {:>4} / {} min", lane.kind.as_str(), lane.total_minutes, lane.target_minutes);
        if lane.is_empty() {
            println!("  (empty)");
        }
        for scored in &lane.tasks {
            println!(
                "  {:>6.2}  {:>4} min  {}",
                scored.total, scored.task.estimated_minutes, scored.task.title
            );
        }
    }
}
