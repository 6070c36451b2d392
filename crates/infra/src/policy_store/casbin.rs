//! Casbin-style policy records.
//!
//! CSV form, one record per line:
//!
//! ```text
//! # comment
//! p, editor, news:*, subscribe
//! g, 1, editor
//! ```

use relaygate_auth::{PolicyError, PolicyRule, PolicySet, RoleAssignment};

/// One raw policy record: a type tag and its positional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    pub ptype: String,
    pub values: Vec<String>,
}

impl PolicyRecord {
    pub fn new(ptype: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            ptype: ptype.into(),
            values,
        }
    }
}

/// Fold records into a policy set.
///
/// Each item pairs a label for error messages (line number, table row) with
/// the record. Trailing empty values are ignored, so a database row with
/// unused `v3..v5` columns still reads as a three-value rule.
pub fn records_to_policy<I>(records: I) -> Result<PolicySet, PolicyError>
where
    I: IntoIterator<Item = (String, PolicyRecord)>,
{
    let mut set = PolicySet::default();

    for (origin, record) in records {
        let mut values: Vec<&str> = record.values.iter().map(|v| v.trim()).collect();
        while values.last().is_some_and(|v| v.is_empty()) {
            values.pop();
        }

        match (record.ptype.trim(), values.as_slice()) {
            ("p", [subject, resource, action]) => {
                set.rules.push(PolicyRule::new(*subject, *resource, *action));
            }
            ("g", [subject, role]) => {
                set.assignments.push(RoleAssignment::new(*subject, *role));
            }
            ("p", other) => {
                return Err(PolicyError::InvalidRule(format!(
                    "{origin}: `p` record needs 3 values, got {}",
                    other.len()
                )));
            }
            ("g", other) => {
                return Err(PolicyError::InvalidRule(format!(
                    "{origin}: `g` record needs 2 values, got {}",
                    other.len()
                )));
            }
            (ptype, _) => {
                return Err(PolicyError::InvalidRule(format!(
                    "{origin}: unknown record type {ptype:?}"
                )));
            }
        }
    }

    Ok(set)
}

/// Parse casbin CSV policy text. Blank lines and `#` comments are skipped.
pub fn parse_policy_csv(text: &str) -> Result<PolicySet, PolicyError> {
    let records = text
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let mut fields = line.split(',').map(|f| f.trim().to_string());
            let ptype = fields.next().unwrap_or_default();
            Some((format!("line {}", index + 1), PolicyRecord::new(ptype, fields.collect())))
        });

    records_to_policy(records)
}
