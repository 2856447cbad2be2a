use bookdash_core::{AppViewModel, DownloadView, ResultRowKind, SearchView};

const BAR_WIDTH: usize = 30;
const LOG_TAIL: usize = 8;

/// Renders the view model to terminal lines. Pure: no state, no I/O.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    render_download(&mut lines, &view.download);
    if view.search.visible {
        lines.push(String::new());
        render_search(&mut lines, &view.search);
    }
    lines
}

fn render_download(lines: &mut Vec<String>, view: &DownloadView) {
    lines.push(format!(
        "[{}] {}  {}",
        progress_bar(view.bar_percent),
        view.percent_text,
        view.stats_text.as_deref().unwrap_or("")
    ));

    let status = if view.status_is_error {
        format!("!! {}", view.status_text)
    } else {
        view.status_text.clone()
    };
    lines.push(format!("status: {status}"));

    let mut actions = Vec::new();
    if view.start_enabled {
        actions.push(format!("<enter URL or keyword: {}>", view.start_label));
    }
    if view.pause_visible {
        actions.push("/pause".to_string());
    }
    if view.resume_visible {
        actions.push("/resume".to_string());
    }
    if view.retry_visible {
        actions.push("/retry".to_string());
    }
    if let Some(link) = &view.save_link {
        actions.push(format!("/save ({} -> {})", link.label, link.href));
    }
    if !actions.is_empty() {
        lines.push(format!("actions: {}", actions.join("  ")));
    }

    for line in tail(&view.log_lines) {
        lines.push(line.clone());
    }
}

fn render_search(lines: &mut Vec<String>, view: &SearchView) {
    let header = if view.searching {
        "-- search (running) --"
    } else if view.contact_lost {
        "-- search (connection lost) --"
    } else {
        "-- search --"
    };
    lines.push(header.to_string());

    for line in tail(&view.log_lines) {
        lines.push(line.clone());
    }

    if view.rows.is_empty() {
        lines.push("(no results...)".to_string());
        return;
    }
    lines.push(format!("found {} result(s):", view.rows.len()));
    for (index, row) in view.rows.iter().enumerate() {
        let action = match row.kind {
            ResultRowKind::Download => "/pick",
            ResultRowKind::Verify => "verify at",
        };
        let target = match row.kind {
            ResultRowKind::Download => format!("{} {}", action, index + 1),
            ResultRowKind::Verify => format!("{} {}", action, row.url),
        };
        lines.push(format!("  [{}] {} ({}) - {}", index + 1, row.title, row.meta, target));
    }
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent as usize * BAR_WIDTH) / 100;
    let mut bar = String::with_capacity(BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar
}

fn tail(lines: &[String]) -> &[String] {
    let start = lines.len().saturating_sub(LOG_TAIL);
    &lines[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_fixed_width() {
        assert_eq!(progress_bar(0).len(), BAR_WIDTH);
        assert_eq!(progress_bar(50).len(), BAR_WIDTH);
        assert_eq!(progress_bar(100).len(), BAR_WIDTH);
        assert!(progress_bar(100).chars().all(|c| c == '#'));
    }

    #[test]
    fn tail_keeps_last_entries() {
        let lines: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let shown = tail(&lines);
        assert_eq!(shown.len(), LOG_TAIL);
        assert_eq!(shown.last().map(String::as_str), Some("19"));
    }
}
