use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Confirm;
use tabled::{
    Table, Tabled,
    settings::{
        Alignment, Modify, Style, Width,
        object::{Columns, Rows},
    },
};
use terminal_size::{Width as TermWidth, terminal_size};
use tokio::sync::mpsc;

use crate::{
    delta::DdlPlan,
    services::{Confirmer, Question},
    types::{DiffResult, TableVerification},
    utils::ProgressReporter,
};

/// Spinner whose message follows whatever the services report.
pub fn new_spinner() -> (ProgressBar, ProgressReporter) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let spinner_clone = spinner.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            spinner_clone.set_message(msg);
        }
    });

    (spinner, ProgressReporter::new(Some(tx)))
}

/// Asks on the terminal, hiding the spinner while the prompt is up.
pub struct InquireConfirmer {
    spinner: ProgressBar,
}

impl InquireConfirmer {
    pub fn new(spinner: ProgressBar) -> Self {
        Self { spinner }
    }
}

impl Confirmer for InquireConfirmer {
    fn confirm(&self, question: &Question) -> Result<bool> {
        let answer = self.spinner.suspend(|| {
            Confirm::new(&question.prompt())
                .with_default(question.default_answer())
                .prompt()
        })?;
        Ok(answer)
    }
}

fn terminal_width() -> usize {
    if let Some((TermWidth(w), _)) = terminal_size() {
        w as usize
    } else {
        80
    }
}

#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "Table")]
    table: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Action")]
    action: String,
}

pub fn print_diff(diff: &DiffResult) {
    println!("{}", "=== Diff ===".blue());

    let mut rows = Vec::new();
    for table in &diff.new {
        rows.push(DiffRow {
            table: table.green().to_string(),
            status: "NEW".green().bold().to_string(),
            action: "create".to_string(),
        });
    }
    for table in &diff.existing {
        rows.push(DiffRow {
            table: table.blue().to_string(),
            status: "EXISTING".blue().bold().to_string(),
            action: "add missing columns".to_string(),
        });
    }
    for table in &diff.orphaned {
        rows.push(DiffRow {
            table: table.yellow().to_string(),
            status: "ORPHANED".yellow().bold().to_string(),
            action: "none".bright_black().to_string(),
        });
    }

    if rows.is_empty() {
        println!("✅ No tables on either side");
        return;
    }

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
        .to_string();
    println!("{}", table);
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    index: String,

    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Table")]
    table: String,

    #[tabled(rename = "Statement")]
    sql: String,
}

pub fn print_plan(plan: &DdlPlan) {
    println!("{}", "=== DDL plan ===".blue());

    for warning in &plan.warnings {
        println!("⚠️ {}", warning.yellow());
    }
    if plan.is_empty() {
        println!("✅ Nothing to apply");
        return;
    }

    let rows: Vec<PlanRow> = plan
        .statements
        .iter()
        .enumerate()
        .map(|(i, s)| PlanRow {
            index: (i + 1).to_string().bright_black().to_string(),
            kind: s.kind.to_string().cyan().to_string(),
            table: s.table.clone(),
            sql: s.sql.clone(),
        })
        .collect();

    let width = terminal_width();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
        .with(Modify::new(Columns::one(3)).with(Width::wrap(width.saturating_sub(50).max(40))))
        .to_string();
    println!("{}", table);
}

#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    name: String,

    #[tabled(rename = "Type")]
    sql_type: String,

    #[tabled(rename = "Nullable")]
    nullable: String,

    #[tabled(rename = "Default")]
    default: String,

    #[tabled(rename = "Key")]
    key: String,
}

pub fn print_verification(results: &[TableVerification]) {
    println!("{}", "=== Verification ===".blue());

    for result in results {
        let status = if result.is_clean() {
            "OK".green().bold()
        } else {
            "MISMATCH".red().bold()
        };
        println!("\n{} {}", result.table.bold(), status);

        if !result.exists {
            println!("  ❌ table does not exist");
            continue;
        }

        let rows: Vec<ColumnRow> = result
            .columns
            .iter()
            .map(|c| ColumnRow {
                name: c.name.clone(),
                sql_type: c.sql_type.to_string(),
                nullable: if c.nullable { "YES" } else { "NO" }.to_string(),
                default: c.default.clone().unwrap_or_default(),
                key: key_label(result, &c.name),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
            .with(Modify::new(Columns::one(3)).with(Width::truncate(40).suffix("...")))
            .to_string();
        println!("{}", table);

        for mismatch in &result.mismatches {
            println!("  ⚠️ {}", mismatch.to_string().yellow());
        }
    }
}

fn key_label(result: &TableVerification, column: &str) -> String {
    let mut labels = Vec::new();
    if result.primary_key.iter().any(|k| k == column) {
        labels.push("PK".to_string());
    }
    for fk in result.foreign_keys.iter().filter(|f| f.columns.iter().any(|c| c == column)) {
        labels.push(format!("FK → {}", fk.referenced_table));
    }
    for index in result.indexes.iter().filter(|i| i.columns.iter().any(|c| c == column)) {
        labels.push(if index.unique { "UQ" } else { "IDX" }.to_string());
    }
    labels.join(", ")
}
