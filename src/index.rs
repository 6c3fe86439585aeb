use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use crate::normalize::{normalize_code, parse_flag};
use crate::table::{RawTable, read_rule_table};

/// Directed edit map: primary code -> secondary code -> raw flag.
///
/// Built once from the rule table and read-only afterwards. Flags are kept
/// as parsed (-1 for anything non-numeric); only 0 and 1 carry meaning at
/// evaluation time.
#[derive(Debug, Default)]
pub struct EditIndex {
    primaries: HashMap<String, HashMap<String, i64>>,
    all_codes: HashSet<String>,
}

impl EditIndex {
    /// Read the rule table at `path` and build the index.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let t0 = Instant::now();
        let table = read_rule_table(path)?;
        let index = Self::build(&table);
        tracing::info!(
            "Rule index ready in {:.1}s from {}: {} primaries, {} known codes",
            t0.elapsed().as_secs_f64(),
            path.display(),
            index.primary_count(),
            index.code_count()
        );
        Ok(index)
    }

    /// Build the index from a row-major rule table.
    ///
    /// Rows are consumed in consecutive pairs: a code row (primary in
    /// column 0, secondaries in 1..) followed by its flag row (flags in
    /// the same positions). A pair whose primary normalizes to absent is
    /// skipped whole, so its flag row is never misread as a code row. A
    /// trailing unpaired row is ignored.
    pub fn build(table: &RawTable) -> Self {
        let mut primaries: HashMap<String, HashMap<String, i64>> = HashMap::new();
        let mut all_codes = HashSet::new();
        let mut skipped_pairs: u64 = 0;

        for pair in table.rows.chunks_exact(2) {
            let (code_row, flag_row) = (&pair[0], &pair[1]);
            let Some(primary) = code_row.first().and_then(normalize_code) else {
                skipped_pairs += 1;
                continue;
            };

            let secondaries = code_row.get(1..).unwrap_or_default();
            let flags = flag_row.get(1..).unwrap_or_default();

            // zip truncates to the shorter side when the two rows disagree
            // on width; the orphaned cells are dropped.
            let mut sec_map = HashMap::new();
            for (sec_cell, flag_cell) in secondaries.iter().zip(flags.iter()) {
                let Some(secondary) = normalize_code(sec_cell) else {
                    continue;
                };
                all_codes.insert(secondary.clone());
                sec_map.insert(secondary, parse_flag(flag_cell));
            }

            all_codes.insert(primary.clone());
            primaries.insert(primary, sec_map);
        }

        if skipped_pairs > 0 {
            tracing::info!("Skipped {} row pairs with an absent primary code", skipped_pairs);
        }

        Self {
            primaries,
            all_codes,
        }
    }

    /// Flag stored for (primary, secondary), in that direction only.
    pub fn flag(&self, primary: &str, secondary: &str) -> Option<i64> {
        self.primaries.get(primary)?.get(secondary).copied()
    }

    /// Whether the code appears anywhere in the rule table.
    pub fn contains_code(&self, code: &str) -> bool {
        self.all_codes.contains(code)
    }

    pub fn primary_count(&self) -> usize {
        self.primaries.len()
    }

    pub fn code_count(&self) -> usize {
        self.all_codes.len()
    }
}
