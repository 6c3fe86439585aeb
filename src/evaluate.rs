use serde::Serialize;

use crate::index::EditIndex;
use crate::normalize::normalize_code_str;

/// Meaning of a stored flag at evaluation time. Only 0 and 1 are
/// definitive; everything else (including -1) contributes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditFlag {
    Bundled,
    NoEdit,
    Unknown,
}

impl EditFlag {
    pub fn classify(flag: i64) -> Self {
        match flag {
            1 => EditFlag::Bundled,
            0 => EditFlag::NoEdit,
            _ => EditFlag::Unknown,
        }
    }
}

/// Pairwise results grouped under the code that matched as primary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditGroup {
    pub primary: String,
    pub bundled: Vec<String>,
    pub no_edit: Vec<String>,
}

/// Grouped result of one query, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditReport {
    pub groups: Vec<EditGroup>,
}

impl EditReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_bundled(&self) -> usize {
        self.groups.iter().map(|g| g.bundled.len()).sum()
    }

    pub fn total_no_edit(&self) -> usize {
        self.groups.iter().map(|g| g.no_edit.len()).sum()
    }

    fn group_mut(&mut self, primary: &str) -> &mut EditGroup {
        let idx = match self.groups.iter().position(|g| g.primary == primary) {
            Some(idx) => idx,
            None => {
                self.groups.push(EditGroup {
                    primary: primary.to_string(),
                    bundled: Vec::new(),
                    no_edit: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }
}

/// Split free-form query text into raw code tokens on whitespace and
/// commas, dropping empty tokens.
pub fn split_codes(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Evaluate every unordered pair of the given codes against the index.
///
/// For each pair the (a, b) ordering is probed before (b, a); the first
/// ordering present in the index wins even when its flag is unknown, and a
/// pair absent in both orderings contributes nothing.
pub fn evaluate(codes: &[String], index: &EditIndex) -> EditReport {
    let codes: Vec<String> = codes
        .iter()
        .filter_map(|c| normalize_code_str(c))
        .collect();

    let mut report = EditReport::default();
    for i in 0..codes.len() {
        for j in (i + 1)..codes.len() {
            let (a, b) = (&codes[i], &codes[j]);

            for (primary, secondary) in [(a, b), (b, a)] {
                let Some(flag) = index.flag(primary, secondary) else {
                    continue;
                };
                match EditFlag::classify(flag) {
                    EditFlag::Bundled => {
                        let group = report.group_mut(primary);
                        if !group.bundled.contains(secondary) {
                            group.bundled.push(secondary.clone());
                        }
                    }
                    EditFlag::NoEdit => {
                        let group = report.group_mut(primary);
                        if !group.no_edit.contains(secondary) {
                            group.no_edit.push(secondary.clone());
                        }
                    }
                    EditFlag::Unknown => {}
                }
                break;
            }
        }
    }
    report
}

/// Tokenize free-form text and evaluate it in one step.
pub fn check(text: &str, index: &EditIndex) -> EditReport {
    evaluate(&split_codes(text), index)
}
