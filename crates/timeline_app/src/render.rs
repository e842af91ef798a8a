use timeline_core::{AppViewModel, SessionState};

const BAR_WIDTH: usize = 20;

/// Text shown after a state change.
pub(crate) fn render(view: &AppViewModel) -> String {
    let mut lines = Vec::new();
    match view.session {
        SessionState::Idle => lines.push(format!(
            "Ready: {} posts, {} ms pacing. Type `start` to begin.",
            view.target_input, view.pacing_input
        )),
        SessionState::Collecting => {
            lines.push(format!("Collecting {}", progress_bar(view.progress_percent)))
        }
        SessionState::Finished => {
            let reason = view
                .last_reason
                .map(|reason| reason.to_string())
                .unwrap_or_else(|| "done".to_string());
            lines.push(format!("Finished ({reason}): {} posts", view.rows.len()));
            for (n, row) in view.rows.iter().enumerate() {
                lines.push(format!("{:>3}. {}  {}", n + 1, row.display_time, row.text));
            }
            if !view.word_cloud.is_empty() {
                let words: Vec<String> = view
                    .word_cloud
                    .iter()
                    .map(|w| format!("{} ({})", w.word, w.count))
                    .collect();
                lines.push(format!("Frequent words: {}", words.join(", ")));
            }
            if view.export_enabled {
                lines.push("Type `csv`, `copy` or `summary` to use the results.".to_string());
            }
        }
    }
    if let Some(notice) = &view.notice {
        lines.push(format!("! {notice}"));
    }
    lines.join("\n")
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}
