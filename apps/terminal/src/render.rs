use std::fmt::Write as _;

use client_core::{ControllerView, FetchPhase};
use shared::domain::{DraftField, Record};

pub fn render_view(view: &ControllerView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== movies ==");

    let mut status = Vec::new();
    if view.is_loading {
        status.push("loading...".to_string());
    }
    if view.is_mutating {
        status.push("saving...".to_string());
    }
    if view.is_retrying {
        status.push(format!(
            "retrying (attempt {}; 'cancel' to stop)",
            view.retry_attempts + 1
        ));
    }
    if view.phase == FetchPhase::Failed {
        status.push("gave up; 'refresh' to try again".to_string());
    }
    if !status.is_empty() {
        let _ = writeln!(out, "[{}]", status.join(" | "));
    }

    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}");
    }

    if view.shows_empty_notice() {
        let _ = writeln!(out, "No movies found");
    }

    if let Some(records) = view.records.as_ref().filter(|records| !records.is_empty()) {
        for record in records {
            render_record(&mut out, record);
        }
    }

    if !view.draft.is_blank() {
        let _ = writeln!(out, "-- draft --");
        for field in DraftField::ALL {
            let _ = writeln!(out, "  {field}: {}", view.draft.get(field));
        }
    }

    out
}

fn render_record(out: &mut String, record: &Record) {
    let _ = writeln!(out, "* {} [{}]", record.title, record.id);
    if !record.release_date.is_empty() {
        let _ = writeln!(out, "  released {}", record.release_date);
    }
    for line in record.opening_text.lines() {
        let _ = writeln!(out, "    {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{Draft, RecordId};

    fn idle_view(records: Option<Vec<Record>>) -> ControllerView {
        ControllerView {
            records,
            error: None,
            phase: FetchPhase::Idle,
            is_loading: false,
            is_retrying: false,
            is_mutating: false,
            draft: Draft::default(),
            retry_attempts: 0,
        }
    }

    #[test]
    fn renders_records_with_multi_line_opening_text() {
        let view = idle_view(Some(vec![Record {
            id: RecordId::from("-Na1"),
            title: "A New Hope".into(),
            opening_text: "It is a period\r\nof civil war.".into(),
            release_date: "1977-05-25".into(),
        }]));

        let rendered = render_view(&view);

        assert!(rendered.contains("* A New Hope [-Na1]"));
        assert!(rendered.contains("  released 1977-05-25"));
        assert!(rendered.contains("    It is a period\n    of civil war.\n"));
        assert!(!rendered.contains("No movies found"));
    }

    #[test]
    fn renders_empty_notice_only_after_a_load() {
        assert!(render_view(&idle_view(Some(Vec::new()))).contains("No movies found"));
        assert!(!render_view(&idle_view(None)).contains("No movies found"));
    }

    #[test]
    fn renders_retry_status_and_error() {
        let mut view = idle_view(None);
        view.phase = FetchPhase::Retrying;
        view.is_retrying = true;
        view.retry_attempts = 2;
        view.error = Some("Something went wrong... Retrying".into());

        let rendered = render_view(&view);

        assert!(rendered.contains("retrying (attempt 3; 'cancel' to stop)"));
        assert!(rendered.contains("error: Something went wrong... Retrying"));
    }

    #[test]
    fn renders_draft_when_started() {
        let mut view = idle_view(None);
        view.draft.title = "X".into();

        let rendered = render_view(&view);

        assert!(rendered.contains("-- draft --"));
        assert!(rendered.contains("  title: X"));
        assert!(rendered.contains("  openingText: "));
    }
}
