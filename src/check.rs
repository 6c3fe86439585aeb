use anyhow::anyhow;

use crate::cli::CheckArgs;
use crate::evaluate::{evaluate, split_codes};
use crate::index::EditIndex;
use crate::normalize::normalize_code_str;
use crate::storage::{StoragePaths, file_present_nonempty};

pub fn run(opts: CheckArgs) -> anyhow::Result<()> {
    let paths = StoragePaths::new(&opts.data_dir, opts.rules.clone());
    tracing::info!(
        "data_dir={} rules={}",
        paths.data_dir.display(),
        paths.rules_path.display()
    );
    if !file_present_nonempty(&paths.rules_path) {
        return Err(anyhow!(
            "Rule table not found at {}. Point --rules at a CCI edits .parquet or .csv file",
            paths.rules_path.display()
        ));
    }

    let index = EditIndex::load(&paths.rules_path)?;

    let tokens = split_codes(&opts.codes.join(" "));
    let report = evaluate(&tokens, &index);

    if report.is_empty() {
        let unknown: Vec<String> = tokens
            .iter()
            .filter_map(|c| normalize_code_str(c))
            .filter(|c| !index.contains_code(c))
            .collect();
        if !unknown.is_empty() {
            tracing::info!(
                "{} entered code(s) do not appear in the rule table: {}",
                unknown.len(),
                unknown.join(", ")
            );
        }
        println!("No results found for the entered codes.");
        return Ok(());
    }

    println!(
        "Summary: {} bundled | {} no-edit",
        report.total_bundled(),
        report.total_no_edit()
    );
    for group in &report.groups {
        println!("Results for {}:", group.primary);
        if !group.bundled.is_empty() {
            println!(
                "  {} is bundled with: {}",
                group.primary,
                group.bundled.join(", ")
            );
        }
        if !group.no_edit.is_empty() {
            println!(
                "  {} has no edit with: {}",
                group.primary,
                group.no_edit.join(", ")
            );
        }
    }
    Ok(())
}
