use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Args;
use tracing::debug;

use payscrub_import::{
    load_table, ImportError, MappingRule, PayeeMapper, ProcessOptions, RuleSet,
    TransactionProcessor,
};

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Transaction file to read (CSV or spreadsheet)
    pub input: PathBuf,
    /// YAML rule file
    pub mappings: PathBuf,
    /// Where to write the processed CSV
    pub output: PathBuf,
    /// Name of the payee column
    #[arg(long, default_value = "payee")]
    pub payee_column: String,
    /// Name of the date column (reserved)
    #[arg(long)]
    pub date_column: Option<String>,
    /// Name of the amount column (reserved)
    #[arg(long)]
    pub amount_column: Option<String>,
    /// Leading rows to discard before the header
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,
    /// Keep fully-empty rows and columns
    #[arg(long)]
    pub no_clean_data: bool,
}

pub fn process(args: ProcessArgs) -> anyhow::Result<()> {
    let processor = TransactionProcessor::from_rule_file(&args.mappings)?;
    let options = ProcessOptions {
        payee_column: args.payee_column,
        date_column: args.date_column,
        amount_column: args.amount_column,
        skip_rows: args.skip_rows,
        clean_data: !args.no_clean_data,
    };
    processor.process_file(&args.input, &args.output, &options)?;
    println!(
        "Processed {} -> {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

#[derive(Debug, Args)]
pub struct DeriveArgs {
    /// Transaction file to scan for payee values
    pub input: PathBuf,
    /// Where to write the merged rule file
    pub output: PathBuf,
    /// Existing rule file to merge with
    #[arg(long)]
    pub mappings: Option<PathBuf>,
    /// Name of the payee column
    #[arg(long, default_value = "payee")]
    pub payee_column: String,
    /// Leading rows to discard before the header
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,
}

pub fn derive(args: DeriveArgs) -> anyhow::Result<()> {
    let existing = match &args.mappings {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading rule file {}", path.display()))?;
            RuleSet::from_yaml(&content)?
        }
        None => RuleSet::default(),
    };
    let mapper = PayeeMapper::new(existing.mappings.clone())?;

    let unmapped = unmapped_payees(&args, &mapper)?;
    if unmapped.is_empty() {
        println!("Every payee in {} is already mapped.", args.input.display());
        save_merged(&args.output, &existing, Vec::new())?;
        return Ok(());
    }

    // The handler thread and the prompt loop share the accumulated rules, so
    // an interrupt can flush whatever has been collected so far.
    let collected: Arc<Mutex<Vec<MappingRule>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let collected = Arc::clone(&collected);
        let existing = existing.clone();
        let output = args.output.clone();
        ctrlc::set_handler(move || {
            let rules = collected.lock().unwrap().clone();
            match save_merged(&output, &existing, rules) {
                Ok(()) => eprintln!("\nInterrupted; saved {}", output.display()),
                Err(e) => eprintln!("\nInterrupted; failed to save rules: {e:#}"),
            }
            std::process::exit(130);
        })
        .context("installing interrupt handler")?;
    }

    println!(
        "{} unmapped payees in {}. Enter a replacement, or leave blank to skip.",
        unmapped.len(),
        args.input.display()
    );
    let mut lines = io::stdin().lock().lines();
    for payee in &unmapped {
        print!("{payee} -> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            debug!("stdin closed, ending session");
            break;
        };
        let replacement = line?.trim().to_string();
        if replacement.is_empty() {
            continue;
        }
        collected.lock().unwrap().push(MappingRule {
            // Escaped, so the derived rule matches this payee literally.
            pattern: regex::escape(payee),
            replacement,
            description: None,
        });
    }

    let new_rules = collected.lock().unwrap().clone();
    let added = new_rules.len();
    save_merged(&args.output, &existing, new_rules)?;
    println!(
        "Saved {} ({} existing + {} new rules)",
        args.output.display(),
        existing.mappings.len(),
        added
    );
    Ok(())
}

/// Unique payee values the existing rules leave unchanged, in stable order.
fn unmapped_payees(args: &DeriveArgs, mapper: &PayeeMapper) -> anyhow::Result<Vec<String>> {
    let table = load_table(&args.input, args.skip_rows)?;
    let idx = table.column_index(&args.payee_column).ok_or_else(|| {
        // Unlike `process`, deriving rules from a file without the payee
        // column has nothing to work with.
        ImportError::unreadable(
            &args.input,
            format!("column `{}` not found", args.payee_column),
        )
    })?;

    let mut values = BTreeSet::new();
    for row in table.rows() {
        let cell = &row[idx];
        if !cell.is_missing() {
            values.insert(cell.to_string());
        }
    }
    Ok(values
        .into_iter()
        .filter(|payee| mapper.map_payee(payee) == payee.trim())
        .collect())
}

fn save_merged(path: &Path, existing: &RuleSet, new_rules: Vec<MappingRule>) -> anyhow::Result<()> {
    let mut merged = existing.clone();
    merged.mappings.extend(new_rules);
    let yaml = merged.to_yaml()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))
}
