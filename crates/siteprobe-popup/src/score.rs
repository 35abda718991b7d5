use siteprobe_protocols::AnalysisRecord;

/// Heuristic 0-100 score shown next to a report.
///
/// Starts at 50: +30 for HTTPS or -20 without it, -10 per vulnerability and
/// +2 per technology up to +20.
pub fn security_score(record: &AnalysisRecord) -> u8 {
    let mut score: i64 = 50;
    score += if record.is_secure { 30 } else { -20 };
    score -= 10 * record.vulnerabilities.len() as i64;
    score += (2 * record.technologies.len() as i64).min(20);
    score.clamp(0, 100) as u8
}
