//! Subcommand implementations.
//!
//! Each command opens a session against the named file, performs one
//! discrete action, and saves. Validation failures are reported in one
//! batch and never abort the parts that passed.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, bail};

use clinchart_core::{
    EventForm, FieldInput, Session, ViewSynchronizer, format_timestamp, parse_timestamp,
};
use clinchart_model::{ChartConfig, EVENT_KIND, Field, ValueRule};

use crate::cli::{AddArgs, ConvertArgs, EditArgs, FileArg, RemoveArgs};
use crate::summary::{print_view_ranges, records_table, series_table};

/// Load the capability table: the given JSON file, or the built-in table.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ChartConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))
        }
        None => Ok(ChartConfig::builtin()),
    }
}

fn open_session(config: ChartConfig, file: &Path) -> anyhow::Result<Session> {
    let mut session = Session::new(config);
    session
        .open(file)
        .with_context(|| format!("failed to open {}", file.display()))?;
    Ok(session)
}

pub fn run_init(config: ChartConfig, args: &FileArg) -> anyhow::Result<()> {
    if args.file.exists() {
        bail!("{} already exists", args.file.display());
    }
    let mut session = Session::new(config);
    session.create(&args.file)?;
    println!("created {}", args.file.display());
    Ok(())
}

pub fn run_show(config: ChartConfig, args: &FileArg) -> anyhow::Result<()> {
    let session = open_session(config, &args.file)?;
    let mut sync = ViewSynchronizer::new(session.config());
    sync.refresh(session.store(), session.config());

    println!("{}", records_table(session.store()));
    println!("{}", series_table(&sync, session.config()));
    print_view_ranges(&sync.default_view(session.store(), session.config()));
    Ok(())
}

/// Check every row against the capability table. Returns true when issues
/// were found.
pub fn run_check(config: ChartConfig, args: &FileArg) -> anyhow::Result<bool> {
    let session = open_session(config, &args.file)?;
    let config = session.config();

    let mut issues: Vec<String> = Vec::new();
    for (row, record) in session.store().records().iter().enumerate() {
        if record.kind == EVENT_KIND {
            if !record.value.trim().is_empty()
                && !config.event_kinds.iter().any(|k| k == record.value.trim())
            {
                issues.push(format!(
                    "row {row}: event value '{}' is not in the configured enumeration",
                    record.value
                ));
            }
            continue;
        }
        let Some(spec) = config.capability(&record.kind) else {
            issues.push(format!("row {row}: unknown type '{}'", record.kind));
            continue;
        };
        if let ValueRule::Numeric { min, max, .. } = spec.rule {
            match record.numeric_value() {
                Some(value) if value >= min && value <= max => {}
                Some(value) => issues.push(format!(
                    "row {row}: {} value {value} outside [{min}, {max}]",
                    record.kind
                )),
                None => issues.push(format!(
                    "row {row}: {} value '{}' is not numeric",
                    record.kind, record.value
                )),
            }
        }
    }

    if issues.is_empty() {
        println!("{}: {} rows, no issues", args.file.display(), session.store().len());
        Ok(false)
    } else {
        for issue in &issues {
            println!("{issue}");
        }
        println!("{} issue(s) found", issues.len());
        Ok(true)
    }
}

pub fn run_add(config: ChartConfig, args: &AddArgs) -> anyhow::Result<()> {
    let mut session = open_session(config, &args.file)?;

    let mut form = EventForm::new(parse_timestamp(&args.date)?);
    form.event = args.event.clone();
    form.comment = args.comment.clone();
    for raw in &args.fields {
        let (kind, value) = split_pair(raw, "--field")?;
        form.fields.push(FieldInput {
            kind: kind.to_string(),
            raw: value.to_string(),
            repeat: None,
        });
    }
    for raw in &args.repeats {
        let (kind, count) = split_pair(raw, "--repeat")?;
        let count: u32 = count
            .parse()
            .with_context(|| format!("--repeat {raw}: '{count}' is not a count"))?;
        let field = form
            .fields
            .iter_mut()
            .find(|f| f.kind == kind)
            .with_context(|| format!("--repeat {raw}: no --field for '{kind}'"))?;
        field.repeat = Some(count);
    }

    let outcome = session.submit_form(&form)?;
    session.save()?;

    println!("added {} record(s)", outcome.records.len());
    if outcome.has_rejections() {
        // One batched report for the whole form, not one line per field.
        println!("rejected fields: {}", outcome.rejected.join(", "));
    }
    Ok(())
}

pub fn run_remove(config: ChartConfig, args: &RemoveArgs) -> anyhow::Result<()> {
    let mut session = open_session(config, &args.file)?;
    let removed = session.store_mut().delete_at(&args.rows)?;
    session.save()?;

    for record in &removed {
        println!(
            "removed {} {} {}",
            format_timestamp(record.timestamp),
            record.kind,
            record.value
        );
    }
    Ok(())
}

pub fn run_edit(config: ChartConfig, args: &EditArgs) -> anyhow::Result<()> {
    let mut session = open_session(config, &args.file)?;
    let field = Field::from_str(&args.column)?;
    let edit = session.store_mut().edit_cell(args.row, field, &args.value)?;
    session.save()?;

    if edit.resorted && edit.row != args.row {
        println!("row {} moved to {}", args.row, edit.row);
    } else {
        println!("row {} updated", edit.row);
    }
    Ok(())
}

pub fn run_convert(config: ChartConfig, args: &ConvertArgs) -> anyhow::Result<()> {
    let mut session = open_session(config, &args.file)?;
    let rows = session.store().len();
    session
        .save_as(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "converted {} ({rows} record(s)) -> {}",
        args.file.display(),
        args.output.display()
    );
    Ok(())
}

fn split_pair<'a>(raw: &'a str, flag: &str) -> anyhow::Result<(&'a str, &'a str)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v))
        .with_context(|| format!("{flag} expects KIND=VALUE, got '{raw}'"))
}
