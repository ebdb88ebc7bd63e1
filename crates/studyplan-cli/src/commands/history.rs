use clap::Subcommand;
use studyplan_core::storage::PlanRecord;
use studyplan_core::PlanHistory;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recent plans
    List {
        /// Number of plans to show
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one saved plan
    Show {
        /// Plan id
        id: String,
    },
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = PlanHistory::open()?;
    match action {
        HistoryAction::List { limit, json } => {
            let records = history.recent(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("no saved plans");
            } else {
                for record in &records {
                    print_summary(record);
                }
            }
        }
        HistoryAction::Show { id } => match history.get(&id)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record.snapshot)?),
            None => return Err(format!("plan not found: {id}").into()),
        },
    }
    Ok(())
}

fn print_summary(record: &PlanRecord) {
    println!(
        "{}  {}  {} task(s), {} min",
        record.id,
        record.generated_at.format("%Y-%m-%d %H:%M"),
        record.task_count,
        record.total_minutes
    );
}
