use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use kennel_core::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kennel")]
#[command(about = "Kennel lifecycle predictions: heats, litters, vaccinations, puppies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Compute predictions as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Heat, due date and vaccination predictions for one dog (or all dogs)
    Status {
        /// Dog id; omit to show every dog
        dog_id: Option<String>,
    },

    /// Puppies grouped by developmental age group
    Puppies,

    /// Next dose for every medication
    Meds {
        /// Fail on frequency codes outside the known set instead of assuming 30 days
        #[arg(long)]
        strict: bool,
    },

    /// Health observations that need attention
    Alerts,

    /// Upcoming predicted events, optionally exported as CSV
    Schedule {
        /// Days ahead to include (default from config)
        #[arg(long)]
        horizon_days: Option<u32>,

        /// Write the schedule to this CSV file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Add or replace a record (dog, puppy, medication, health)
    Add {
        /// Record kind
        kind: String,

        /// Record as a JSON object
        record: String,
    },

    /// Show and validate the puppy age-group table
    AgeGroups,
}

fn main() -> Result<()> {
    // Initialize logging
    kennel_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    // The one place "today" is read; everything below takes it explicitly.
    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::debug!("Using data dir {:?}, as of {}", data_dir, as_of);
    let mut store = JsonlStore::open(&data_dir);

    match cli.command {
        Commands::Status { dog_id } => cmd_status(&store, dog_id, as_of, cli.json),
        Commands::Puppies => cmd_puppies(&store, &config, as_of, cli.json),
        Commands::Meds { strict } => cmd_meds(&store, strict, as_of, cli.json),
        Commands::Alerts => cmd_alerts(&store, as_of, cli.json),
        Commands::Schedule { horizon_days, out } => {
            let horizon = horizon_days.unwrap_or(config.schedule.horizon_days);
            cmd_schedule(&store, horizon, out, as_of, cli.json)
        }
        Commands::Add { kind, record } => cmd_add(&mut store, &kind, &record),
        Commands::AgeGroups => cmd_age_groups(&config, cli.json),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "unknown".into())
}

fn fmt_days(days: Option<i64>) -> String {
    match days {
        Some(0) => "today".into(),
        Some(n) if n > 0 => format!("in {} days", n),
        Some(n) => format!("{} days ago", -n),
        None => String::new(),
    }
}

fn cmd_status(
    store: &JsonlStore,
    dog_id: Option<String>,
    as_of: NaiveDate,
    json: bool,
) -> Result<()> {
    let records = match dog_id {
        Some(id) => match store.fetch(RecordKind::Dog, &id)? {
            Some(record) => vec![record],
            None => return Err(Error::Store(format!("No dog with id '{}'", id))),
        },
        None => store.list(RecordKind::Dog)?,
    };

    let summaries: Vec<_> = records
        .iter()
        .map(|record| summarize_dog(record, as_of))
        .collect();

    if json {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("No dogs recorded.");
        return Ok(());
    }

    for summary in &summaries {
        display_dog(summary);
    }
    Ok(())
}

fn display_dog(summary: &DogLifecycleSummary) {
    println!(
        "\n{} ({})",
        summary.name.as_deref().unwrap_or("Unnamed"),
        summary.dog_id
    );
    println!("─────────────────────────────────────────");

    match &summary.heat_window {
        Some(window) => println!(
            "  Next heat:        {} {} (no vaccinations {} to {})",
            window.next_heat_start,
            fmt_days(summary.days_until_heat),
            window.conflict_window_start,
            window.conflict_window_end
        ),
        None => println!("  Next heat:        unknown (no last heat date)"),
    }

    if summary.reproductive.is_pregnant {
        match &summary.gestation {
            Some(gestation) => println!(
                "  Due date:         {} {} (earliest {})",
                gestation.due_date,
                fmt_days(summary.days_until_due),
                gestation.earliest_due_date
            ),
            None => println!("  Due date:         unknown (no tie date)"),
        }
    }

    let overdue = if summary.vaccination_overdue { "  OVERDUE" } else { "" };
    println!(
        "  Next vaccination: {} {}{}",
        fmt_date(summary.next_vaccination),
        fmt_days(summary.days_until_vaccination),
        overdue
    );

    if let Some(conflict) = &summary.conflict {
        println!(
            "  ⚠ Vaccination on {} falls within 30 days of predicted heat on {}",
            conflict.predicted_a, conflict.predicted_b
        );
    }
}

fn cmd_puppies(store: &JsonlStore, config: &Config, as_of: NaiveDate, json: bool) -> Result<()> {
    let table = config.age_group_table()?;
    let records = store.list(RecordKind::Puppy)?;
    let (buckets, unplaced) = group_puppies_by_age(&records, as_of, &table);

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            groups: &'a [AgeGroupBucket],
            unplaced: &'a [PuppyAgeSummary],
        }
        return print_json(&Output {
            groups: &buckets,
            unplaced: &unplaced,
        });
    }

    if buckets.is_empty() && unplaced.is_empty() {
        println!("No puppies recorded.");
        return Ok(());
    }

    for bucket in &buckets {
        println!("\n{} ({} puppies)", bucket.group.name, bucket.puppies.len());
        for puppy in &bucket.puppies {
            println!(
                "  • {}: {} days ({} weeks)",
                puppy.name.as_deref().unwrap_or(&puppy.puppy_id),
                puppy.age_in_days.unwrap_or_default(),
                puppy.age_in_weeks.unwrap_or_default()
            );
        }
    }

    if !unplaced.is_empty() {
        println!("\nNo usable birth date ({} puppies)", unplaced.len());
        for puppy in &unplaced {
            println!("  • {}", puppy.name.as_deref().unwrap_or(&puppy.puppy_id));
        }
    }
    Ok(())
}

fn cmd_meds(store: &JsonlStore, strict: bool, as_of: NaiveDate, json: bool) -> Result<()> {
    let records = store.list(RecordKind::Medication)?;
    let mut schedules = Vec::with_capacity(records.len());
    for record in &records {
        let schedule = summarize_medication(record, as_of);
        if strict {
            compute_next_medication_dose_strict(&schedule.record)?;
        }
        schedules.push(schedule);
    }

    if json {
        return print_json(&schedules);
    }

    if schedules.is_empty() {
        println!("No medications recorded.");
        return Ok(());
    }

    for schedule in &schedules {
        let status = if schedule.overdue { "  OVERDUE" } else { "" };
        println!(
            "  {} ({}): next dose {}{}",
            schedule.name.as_deref().unwrap_or(&schedule.medication_id),
            schedule.record.frequency,
            fmt_date(schedule.next_due),
            status
        );
    }
    Ok(())
}

fn cmd_alerts(store: &JsonlStore, as_of: NaiveDate, json: bool) -> Result<()> {
    let alerts = health_alerts(&store.list(RecordKind::HealthIndicator)?);
    let conflicts: Vec<_> = store
        .list(RecordKind::Dog)?
        .iter()
        .map(|record| summarize_dog(record, as_of))
        .filter(|summary| summary.conflict.is_some())
        .collect();

    if json {
        #[derive(Serialize)]
        struct Output<'a> {
            health: &'a [HealthAlert],
            conflicts: &'a [DogLifecycleSummary],
        }
        return print_json(&Output {
            health: &alerts,
            conflicts: &conflicts,
        });
    }

    if alerts.is_empty() && conflicts.is_empty() {
        println!("✓ No alerts");
        return Ok(());
    }

    for alert in &alerts {
        let reasons: Vec<String> = alert.concerns.iter().map(|c| c.to_string()).collect();
        println!(
            "  ⚠ {} {}: {}",
            fmt_date(alert.indicator.date),
            alert.dog_id.as_deref().unwrap_or(&alert.record_id),
            reasons.join(", ")
        );
    }
    for summary in &conflicts {
        if let Some(conflict) = &summary.conflict {
            println!(
                "  ⚠ {}: vaccination {} conflicts with heat {}",
                summary.name.as_deref().unwrap_or(&summary.dog_id),
                conflict.predicted_a,
                conflict.predicted_b
            );
        }
    }
    Ok(())
}

fn cmd_schedule(
    store: &JsonlStore,
    horizon_days: u32,
    out: Option<PathBuf>,
    as_of: NaiveDate,
    json: bool,
) -> Result<()> {
    let events = build_schedule(store, as_of, horizon_days)?;

    if let Some(path) = out {
        write_schedule_csv(&events, &path)?;
        println!("✓ Wrote {} events to {}", events.len(), path.display());
        return Ok(());
    }

    if json {
        return print_json(&events);
    }

    if events.is_empty() {
        println!("Nothing scheduled in the next {} days.", horizon_days);
        return Ok(());
    }

    for event in &events {
        println!(
            "  {}  {:<16} {:<20} {}",
            event.date,
            format!("{:?}", event.kind),
            event.subject_name.as_deref().unwrap_or(&event.subject_id),
            event.detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn cmd_add(store: &mut JsonlStore, kind: &str, raw: &str) -> Result<()> {
    let kind: RecordKind = kind.parse()?;
    let record: RawRecord = serde_json::from_str(raw)?;
    let id = store.insert(kind, record)?;
    println!("✓ Stored {:?} record {}", kind, id);
    Ok(())
}

fn cmd_age_groups(config: &Config, json: bool) -> Result<()> {
    let table = config.age_group_table()?;

    if json {
        return print_json(&table);
    }

    for group in table.ordered() {
        let range = match group.end_day {
            Some(end) => format!("days {}-{}", group.start_day, end),
            None => format!("days {}+", group.start_day),
        };
        println!("  {:<22} {:<12} {}", group.id, range, group.name);
    }
    println!("\n✓ Table covers every age with no gaps or overlaps");
    Ok(())
}
