//! Human-readable rendering of reader results

use chrono::{DateTime, Local, Utc};
use scam_detector_core::{CallRecord, MessageRecord, SuspicionReason};

const BODY_PREVIEW_CHARS: usize = 48;

/// Format milliseconds since epoch in local time
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

fn format_duration(seconds: i64) -> String {
    if seconds >= 3600 {
        format!("{}h{:02}m{:02}s", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
    } else if seconds >= 60 {
        format!("{}m{:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

fn preview(body: &str) -> String {
    let single_line = body.replace(['\n', '\r'], " ");
    if single_line.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = single_line.chars().take(BODY_PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Render call records as a table
pub fn call_table(records: &[CallRecord]) -> String {
    let mut out = format!(
        "{:<19}  {:<18}  {:<20}  {:<8}  {:>9}  {}\n",
        "DATE", "NUMBER", "NAME", "TYPE", "DURATION", "SCAM?"
    );

    for record in records {
        out.push_str(&format!(
            "{:<19}  {:<18}  {:<20}  {:<8}  {:>9}  {}\n",
            format_timestamp(record.call_date),
            or_dash(&record.phone_number),
            or_dash(&record.caller_name),
            record.call_type.as_str(),
            format_duration(record.duration),
            yes_no(record.is_scam_suspected)
        ));
    }

    let suspected = records.iter().filter(|r| r.is_scam_suspected).count();
    out.push_str(&format!("\n{} calls, {} suspected\n", records.len(), suspected));
    out
}

/// Render inbox messages as a table
pub fn message_table(records: &[MessageRecord]) -> String {
    let annotated = records.iter().any(|r| r.is_scam_suspected.is_some());

    let mut out = format!("{:<19}  {:<18}  {:<48}", "DATE", "SENDER", "BODY");
    if annotated {
        out.push_str("  SCAM?");
    }
    out.push('\n');

    for record in records {
        out.push_str(&format!(
            "{:<19}  {:<18}  {:<48}",
            format_timestamp(record.timestamp),
            record.sender,
            preview(&record.body)
        ));
        if let Some(suspected) = record.is_scam_suspected {
            out.push_str("  ");
            out.push_str(yes_no(suspected));
        }
        out.push('\n');
    }

    out.push_str(&format!("\n{} messages\n", records.len()));
    out
}

/// Render a single classifier verdict
pub fn verdict_line(identifier: &str, reason: Option<SuspicionReason>) -> String {
    match reason {
        Some(reason) => format!("{:<24} SUSPICIOUS ({})", identifier, reason.as_str()),
        None => format!("{:<24} ok", identifier),
    }
}
