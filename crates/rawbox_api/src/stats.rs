use std::collections::BTreeMap;

use crate::payload::AccessRecord;

/// Cap on the hot-file and hot-IP lists.
pub const TOP_ENTRY_LIMIT: usize = 10;

/// Aggregate view over access records. Every number is computed from the
/// records handed to the summarizer; an empty input yields zeros, never
/// placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub total_requests: u64,
    /// Percentage in `[0, 100]`, over the records that carry a status so
    /// that lenient parsing does not skew the ratio.
    pub success_rate: f64,
    pub unique_ips: u64,
    pub hot_files: Vec<HotFile>,
    pub hot_ips: Vec<HotIp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotFile {
    pub path: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotIp {
    pub ip: String,
    pub count: u64,
}

/// Derives aggregate statistics from raw access records.
///
/// Summarization is opt-in: a client without a summarizer refuses stats
/// requests instead of inventing numbers.
pub trait LogSummarizer: Send + Sync {
    fn summarize(&self, records: &[AccessRecord]) -> StatsSummary;
}

/// Default summarizer: plain counting over the record fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogSummarizer;

impl LogSummarizer for AccessLogSummarizer {
    fn summarize(&self, records: &[AccessRecord]) -> StatsSummary {
        let mut with_status = 0u64;
        let mut successes = 0u64;
        let mut ip_counts: BTreeMap<&str, u64> = BTreeMap::new();
        let mut file_counts: BTreeMap<&str, u64> = BTreeMap::new();

        for record in records {
            if let Some(status) = record.status {
                with_status += 1;
                if (200..400).contains(&status) {
                    successes += 1;
                }
            }
            if let Some(ip) = record.ip.as_deref() {
                *ip_counts.entry(ip).or_default() += 1;
            }
            if let Some(path) = record.path.as_deref() {
                *file_counts.entry(path).or_default() += 1;
            }
        }

        let success_rate = if with_status == 0 {
            0.0
        } else {
            successes as f64 * 100.0 / with_status as f64
        };
        let unique_ips = ip_counts.len() as u64;

        StatsSummary {
            total_requests: records.len() as u64,
            success_rate,
            unique_ips,
            hot_files: top_entries(file_counts)
                .into_iter()
                .map(|(path, count)| HotFile { path, count })
                .collect(),
            hot_ips: top_entries(ip_counts)
                .into_iter()
                .map(|(ip, count)| HotIp { ip, count })
                .collect(),
        }
    }
}

/// Highest counts first; ties break on the key so the output is stable.
fn top_entries(counts: BTreeMap<&str, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(&str, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(TOP_ENTRY_LIMIT);

    entries
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect()
}
