use crate::models::{DashboardResponse, SubjectView};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub fn render_index(dashboard: &DashboardResponse) -> String {
    let summary = &dashboard.summary;
    let cards = if dashboard.subjects.is_empty() {
        r#"<p class="empty">No subjects yet. Add one below to start tracking.</p>"#.to_string()
    } else {
        let last = dashboard.subjects.len() - 1;
        dashboard
            .subjects
            .iter()
            .enumerate()
            .map(|(index, subject)| render_card(subject, index == 0, index == last))
            .collect::<Vec<_>>()
            .join("\n")
    };

    INDEX_HTML
        .replace("{{OVERALL}}", &format!("{:.0}", summary.overall_percentage))
        .replace("{{ON_TRACK}}", &summary.subjects_on_track.to_string())
        .replace("{{SUBJECTS}}", &summary.subject_count.to_string())
        .replace("{{CARDS}}", &cards)
}

fn render_card(subject: &SubjectView, first: bool, last: bool) -> String {
    let id = encode_double_quoted_attribute(subject.id.as_str());
    let status = if subject.on_track { "good" } else { "bad" };
    let width = subject.current_percentage.clamp(0.0, 100.0);
    let action = |name: &str, label: &str, enabled: bool| {
        format!(
            r#"<form method="post" action="/subjects/{id}/{name}"><button class="btn-{name}" type="submit"{disabled}>{label}</button></form>"#,
            disabled = if enabled { "" } else { " disabled" },
        )
    };

    format!(
        r#"<article class="card">
  <header>
    <h2>{name}</h2>
    <span class="target">Target {target}%</span>
  </header>
  <div class="bar"><div class="fill {status}" style="width: {width:.1}%"></div></div>
  <div class="stats"><span>{attended} / {total} classes</span><span>{current:.1}%</span></div>
  <p class="advice {status}">{advice}</p>
  <div class="actions">
    {present}{absent}{undo}{up}{down}{delete}
  </div>
</article>"#,
        name = encode_text(&subject.name),
        target = subject.target_percentage,
        attended = subject.attended_classes,
        total = subject.total_classes,
        current = subject.current_percentage,
        advice = encode_text(&subject.advice),
        present = action("present", "Present", true),
        absent = action("absent", "Absent", true),
        undo = action("undo", "Undo", subject.can_undo),
        up = action("up", "&uarr;", !first),
        down = action("down", "&darr;", !last),
        delete = action("delete", "Delete", true),
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Attendance Tracker</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #26272b;
      --card: #ffffff;
      --good: #2d7a4b;
      --bad: #c63b2b;
      --muted: #77736c;
    }
    * {
      box-sizing: border-box;
    }
    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 32px 18px 48px;
    }
    main {
      width: min(720px, 100%);
      display: grid;
      gap: 20px;
    }
    h1 {
      margin: 0;
    }
    .summary {
      display: flex;
      gap: 16px;
      color: var(--muted);
    }
    .summary strong {
      color: var(--ink);
    }
    .card {
      background: var(--card);
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 10px;
      box-shadow: 0 10px 30px rgba(38, 39, 43, 0.08);
    }
    .card header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }
    .card h2 {
      margin: 0;
      font-size: 1.2rem;
    }
    .target,
    .stats {
      color: var(--muted);
      font-size: 0.9rem;
    }
    .stats {
      display: flex;
      justify-content: space-between;
    }
    .bar {
      height: 8px;
      border-radius: 999px;
      background: rgba(38, 39, 43, 0.08);
      overflow: hidden;
    }
    .fill {
      height: 100%;
    }
    .fill.good {
      background: var(--good);
    }
    .fill.bad {
      background: var(--bad);
    }
    .advice {
      margin: 0;
    }
    .advice.good {
      color: var(--good);
    }
    .advice.bad {
      color: var(--bad);
    }
    .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }
    .actions form {
      margin: 0;
    }
    button {
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      cursor: pointer;
      background: rgba(38, 39, 43, 0.08);
    }
    button:disabled {
      opacity: 0.4;
      cursor: default;
    }
    .btn-present {
      background: var(--good);
      color: white;
    }
    .btn-absent {
      background: var(--bad);
      color: white;
    }
    .add {
      display: flex;
      gap: 8px;
    }
    .add input {
      padding: 8px 12px;
      border-radius: 10px;
      border: 1px solid rgba(38, 39, 43, 0.2);
    }
    .empty {
      color: var(--muted);
      text-align: center;
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Attendance Tracker</h1>
      <div class="summary">
        <span>Overall <strong>{{OVERALL}}%</strong></span>
        <span><strong>{{ON_TRACK}}</strong> of {{SUBJECTS}} subjects on target</span>
      </div>
    </header>
    <section class="subjects">
{{CARDS}}
    </section>
    <form class="add" method="post" action="/subjects">
      <input name="name" placeholder="Subject name" required />
      <input name="target" type="number" min="0" max="100" step="1" placeholder="Target %" />
      <button type="submit">Add subject</button>
    </form>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Tracker;
    use crate::handlers::dashboard;

    #[test]
    fn renders_escaped_subject_cards() {
        let mut tracker = Tracker::default();
        let id = tracker.add_subject("<Maths & Co>", 75.0).unwrap().id.clone();
        tracker.mark_present(&id);

        let html = render_index(&dashboard(&tracker));

        assert!(html.contains("&lt;Maths &amp; Co&gt;"));
        assert!(html.contains("1 / 1 classes"));
        assert!(html.contains(&format!("/subjects/{id}/present")));
        assert!(!html.contains("{{CARDS}}"));
    }

    #[test]
    fn quotes_in_ids_cannot_break_out_of_form_actions() {
        let mut tracker = Tracker::default();
        let id = tracker.add_subject("Art", 75.0).unwrap().id.clone();
        let mut view = dashboard(&tracker);
        view.subjects[0].id = r#"x"><script>alert(1)</script>"#.into();

        let html = render_index(&view);

        assert!(!html.contains("<script>"));
        assert!(html.contains("/subjects/x&quot;&gt;&lt;script&gt;"));
        assert!(!html.contains(id.as_str()));
    }

    #[test]
    fn renders_empty_state() {
        let html = render_index(&dashboard(&Tracker::default()));
        assert!(html.contains("No subjects yet"));
        assert!(html.contains("Overall <strong>0%</strong>"));
    }
}
