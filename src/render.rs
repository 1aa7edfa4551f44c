//! Report Rendering
//!
//! Plain-text TEAM 'B' layout for terminals and print.

use chrono::{DateTime, NaiveDate};
use std::fmt::Write;

use crate::report::{DevelopmentItem, IntelligenceReport};

const RULE_WIDTH: usize = 72;

/// One line for the archive listing.
pub fn archive_line(report: &IntelligenceReport) -> String {
    format!(
        "TEAM B / {} | {} | {}",
        report.short_id(),
        report.time,
        report.headline().unwrap_or("Report Entry")
    )
}

/// Full report body.
pub fn render_report(report: &IntelligenceReport) -> String {
    let mut out = String::new();
    let rule = "═".repeat(RULE_WIDTH);

    let _ = writeln!(out, "Report ID: {}", report.short_id());
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "NIGERIA POLICE FORCE");
    let _ = writeln!(out, "NATIONAL CYBERCRIME CENTER (NPF-NCCC)");
    let _ = writeln!(out, "{} - {}", date_part(&report.report_date), report.time);
    let _ = writeln!(out, "TEAM 'B' REPORT WRITTEN TODAY BEING ON {}", long_date(&report.report_date));
    let _ = writeln!(out, "{}", rule);

    section(&mut out, 1, "Executive Summary");
    numbered(&mut out, &report.executive_summary);

    section(&mut out, 2, "General Outlook");
    let _ = writeln!(out, "    {}", report.general_outlook);

    section(&mut out, 3, "New Development");
    let _ = writeln!(
        out,
        "Monitoring of Nigeria's social media space revealed the following trending issues:"
    );
    for (idx, item) in report.new_developments.iter().enumerate() {
        development(&mut out, idx, item);
    }

    section(&mut out, 4, "Assessment");
    numbered(&mut out, &report.assessment);

    section(&mut out, 5, "Recommendations");
    numbered(&mut out, &report.recommendations);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.sign_off);
    out
}

fn section(out: &mut String, number: usize, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}. {}", number, title.to_uppercase());
}

fn numbered(out: &mut String, lines: &[String]) {
    for (idx, line) in lines.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", idx + 1, line);
    }
}

fn development(out: &mut String, idx: usize, item: &DevelopmentItem) {
    let letter = (b'a' + (idx % 26) as u8) as char;
    let _ = writeln!(out);
    let _ = writeln!(out, "  ({}) {}", letter, item.title);
    let _ = writeln!(out, "      {}", item.description);
    if !item.matched_keywords.is_empty() {
        let tags: Vec<String> = item.matched_keywords.iter().map(|k| hashtag(k)).collect();
        let _ = writeln!(out, "      {}", tags.join(" "));
    }
    let s = &item.sentiment;
    let _ = writeln!(
        out,
        "      Sentiment: positive {} | neutral {} | negative {}",
        s.positive, s.neutral, s.negative
    );
    let _ = writeln!(
        out,
        "      Volume: {} | Trend score: {} | Platforms: {}",
        thousands(item.engagement.volume),
        item.engagement.trend_score,
        item.platforms.join(", ").to_uppercase()
    );
}

/// `Police brutality Nigeria` -> `#POLICEBRUTALITYNIGERIA`
pub fn hashtag(keyword: &str) -> String {
    let compact: String = keyword.split_whitespace().collect();
    format!("#{}", compact.to_uppercase())
}

/// `1234567` -> `1,234,567`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

fn date_part(raw: &str) -> String {
    raw.split('T').next().unwrap_or(raw).to_string()
}

fn long_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%A, %-d %B %Y").to_string().to_uppercase(),
        None => raw.to_uppercase(),
    }
}
