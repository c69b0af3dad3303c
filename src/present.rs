//! Plain-text rendering of review data.
//!
//! Nothing here decides anything: ordering, classification and
//! expansion all come from the analysis and review modules.

use chrono::{Datelike, FixedOffset, Timelike, Weekday};

use crate::analysis::{classify, Comparison, DocumentSummary};
use crate::collaborator::DocumentContent;
use crate::records::{document_names, parse_session_timestamp, Session, SimilarityRecord};
use crate::review::{ContentModal, DetailModal, Notification, NotificationKind, ReviewState};

pub const EMPTY_HISTORY: &str = "Belum ada riwayat pemeriksaan";
pub const INVALID_DATE: &str = "Invalid Date";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// Format a session id as a local date and 12-hour time, e.g.
/// `Senin, 05 Feb 2024 02.30 PM`.
pub fn format_session_time(session_id: &str, offset: FixedOffset) -> String {
    let Some(utc) = parse_session_timestamp(session_id) else {
        return INVALID_DATE.to_string();
    };
    let local = utc.with_timezone(&offset);
    let (is_pm, hour) = local.hour12();

    format!(
        "{}, {:02} {} {} {:02}.{:02} {}",
        weekday_name(local.weekday()),
        local.day(),
        MONTHS[local.month0() as usize],
        local.year(),
        hour,
        local.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn label(value: f64) -> &'static str {
    classify(value).map(|c| c.label).unwrap_or("?")
}

pub fn session_header(session: &Session, expanded: bool, offset: FixedOffset) -> String {
    format!(
        "{} {}  ({} Dokumen)",
        if expanded { "▾" } else { "▸" },
        format_session_time(&session.session_id, offset),
        session.document_names().len()
    )
}

pub fn summary_row(summary: &DocumentSummary) -> String {
    format!(
        "    {}  {}  [{}]",
        summary.file_name,
        percent(summary.average_similarity),
        label(summary.average_similarity)
    )
}

pub fn comparison_row(position: usize, comparison: &Comparison) -> String {
    format!(
        "  {:>2}. {}  {}  [{}]  record {} (doc1: {}, doc2: {})",
        position + 1,
        comparison.compared_to,
        percent(comparison.similarity),
        label(comparison.similarity),
        comparison.record_id,
        comparison.doc1_name,
        comparison.doc2_name
    )
}

/// Session list, with the expanded session's summaries inline.
pub fn render_history(state: &ReviewState, offset: FixedOffset) -> String {
    let index = state.index();
    if index.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    let mut output = String::from("Riwayat Pemeriksaan\n\n");
    for session in index.list_sessions() {
        let expanded = index
            .expanded()
            .filter(|e| e.session_id == session.session_id);
        output.push_str(&session_header(session, expanded.is_some(), offset));
        output.push_str(&format!("  [{}]\n", session.session_id));

        if let Some(expanded) = expanded {
            for summary in &expanded.summaries {
                output.push_str(&summary_row(summary));
                output.push('\n');
            }
            for issue in &expanded.issues {
                output.push_str(&format!("    ! Data tidak wajar: {}\n", issue));
            }
        }
    }
    output
}

/// Comparison detail for one document.
pub fn render_detail(summary: &DocumentSummary) -> String {
    let mut output = format!(
        "Detail Perbandingan\n{}\n\nDokumen Pembanding / Persentase\n",
        summary.file_name
    );
    for (position, comparison) in summary.comparisons.iter().enumerate() {
        output.push_str(&comparison_row(position, comparison));
        output.push('\n');
    }
    output
}

pub fn render_document(content: &DocumentContent) -> String {
    format!("{}\n\n{}\n", content.name, content.text)
}

/// Frontmost modal, if any.
pub fn render_modals(state: &ReviewState) -> Option<String> {
    match (state.content(), state.detail()) {
        (ContentModal::Open { content, .. }, _) => Some(render_document(content)),
        (ContentModal::Loading(key), _) => Some(format!(
            "Memuat dokumen {} ({})...",
            key.record_id, key.side
        )),
        (ContentModal::Error { message, .. }, _) => {
            Some(format!("Gagal memuat dokumen: {}", message))
        }
        (ContentModal::Closed, DetailModal::Open(summary)) => Some(render_detail(summary)),
        (ContentModal::Closed, DetailModal::Closed) => None,
    }
}

pub fn render_notification(notification: &Notification) -> String {
    let marker = match notification.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error => "✗",
    };
    format!("{} {}: {}", marker, notification.title, notification.message)
}

/// Result list of a just-completed check.
pub fn render_check_results(records: &[SimilarityRecord]) -> String {
    let mut output = format!(
        "Hasil Cek Plagiasi ({} dokumen)\n\n",
        document_names(records).len()
    );
    for record in records {
        output.push_str(&format!(
            "{} vs {}: {} {}\n",
            record.doc1_name,
            record.doc2_name,
            percent(record.similarity),
            label(record.similarity)
        ));
    }
    output
}
