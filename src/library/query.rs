use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::models::PocRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Verifiable,
    Manual,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "verifiable" => Ok(Self::Verifiable),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown category '{}' (all, verifiable, manual)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Name,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown sort key '{}' (newest, oldest, name)", other)),
        }
    }
}

/// Active library predicates. All of them combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryFilter {
    pub category: Category,
    /// Case-insensitive substring over name, type and description.
    pub keyword: String,
    /// Exact vuln_type match when set.
    pub vuln_type: Option<String>,
}

/// Aggregate counts over the full cached set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStatistics {
    pub total: usize,
    pub verifiable_count: usize,
    pub manual_count: usize,
    pub distinct_vuln_type_count: usize,
}

pub fn filter<'a>(records: &'a [PocRecord], predicate: &LibraryFilter) -> Vec<&'a PocRecord> {
    let keyword = predicate.keyword.trim().to_lowercase();
    let vuln_type = predicate.vuln_type.as_deref().filter(|t| !t.is_empty());

    records
        .iter()
        .filter(|r| match predicate.category {
            Category::All => true,
            Category::Verifiable => r.verifiable,
            Category::Manual => !r.verifiable,
        })
        .filter(|r| keyword.is_empty() || matches_keyword(r, &keyword))
        .filter(|r| vuln_type.map_or(true, |t| r.vuln_type == t))
        .collect()
}

fn matches_keyword(record: &PocRecord, lowered: &str) -> bool {
    [&record.vuln_name, &record.vuln_type, &record.vuln_description]
        .iter()
        .any(|field| field.to_lowercase().contains(lowered))
}

/// Stable in-place sort; ties keep their incoming order.
pub fn sort(records: &mut [&PocRecord], key: SortKey) {
    match key {
        SortKey::Newest => records.sort_by(|a, b| b.create_time.cmp(&a.create_time)),
        SortKey::Oldest => records.sort_by(|a, b| a.create_time.cmp(&b.create_time)),
        SortKey::Name => {
            // Unicode Collation Algorithm, CLDR root order.
            let mut collator = Collator::default();
            records.sort_by(|a, b| collator.collate(a.vuln_name.as_str(), b.vuln_name.as_str()));
        }
    }
}

/// Statistics never see the active filter; pass the full set.
pub fn statistics(records: &[PocRecord]) -> LibraryStatistics {
    let verifiable_count = records.iter().filter(|r| r.verifiable).count();
    let distinct: HashSet<&str> = records.iter().map(|r| r.vuln_type.as_str()).collect();
    LibraryStatistics {
        total: records.len(),
        verifiable_count,
        manual_count: records.len() - verifiable_count,
        distinct_vuln_type_count: distinct.len(),
    }
}

/// Sorted distinct vuln types, for a type selector.
pub fn vuln_types(records: &[PocRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.vuln_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, TimeZone, Utc};

    use crate::models::{PocRecord, PocType};

    pub fn record(id: u64, name: &str, vuln_type: &str, verifiable: bool, age_days: i64) -> PocRecord {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        PocRecord {
            id,
            vuln_name: name.to_string(),
            vuln_type: vuln_type.to_string(),
            poc_type: if verifiable { PocType::Scripted } else { PocType::Manual },
            verifiable,
            vuln_description: format!("{} description", name),
            create_time: base - Duration::days(age_days),
            last_used: None,
            manual_steps: None,
        }
    }

    /// Ten records, six verifiable, four manual.
    pub fn ten_records() -> Vec<PocRecord> {
        vec![
            record(1, "Login SQLi", "sqli", true, 1),
            record(2, "Search XSS", "xss", true, 2),
            record(3, "Avatar upload", "upload", true, 3),
            record(4, "Fetch SSRF", "ssrf", true, 4),
            record(5, "Order IDOR", "idor", false, 5),
            record(6, "Blind SQLi", "sqli", true, 6),
            record(7, "Stored XSS", "xss", true, 7),
            record(8, "Badge clone", "physical", false, 8),
            record(9, "Session fixation", "auth", false, 9),
            record(10, "Race coupon", "logic", false, 10),
        ]
    }
}
