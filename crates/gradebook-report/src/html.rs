//! HTML grade sheet generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use gradebook_core::report::GradeReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn format_grade(grade: Option<f64>) -> String {
    grade.map_or_else(|| "-".to_string(), |g| format!("{g:.1}"))
}

/// Generate an HTML grade sheet from a grade report.
pub fn generate_html(report: &GradeReport) -> String {
    let mut html = String::new();
    let stats = &report.statistics;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>gradebook: {}</title>\n",
        html_escape(&report.project.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.project.name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} students | {} objectives | {} indicators | threshold {:.0}% | correction {:+.1} | {}</p>\n",
        report.project.student_count,
        report.project.objectives.len(),
        report.project.indicator_count,
        report.settings.threshold * 100.0,
        report.settings.correction_error,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Graded</th><th>Mean</th><th>Median</th><th>Min</th><th>Max</th><th>Passed</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}/{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} ({:.0}%)</td></tr></tbody></table>\n",
        stats.graded_count,
        stats.student_count,
        stats.mean_grade.map_or_else(|| "-".to_string(), |g| format!("{g:.2}")),
        format_grade(stats.median_grade),
        format_grade(stats.min_grade),
        format_grade(stats.max_grade),
        stats.pass_count,
        stats.pass_rate * 100.0,
    ));

    if !stats.distribution.is_empty() {
        html.push_str(&generate_distribution_chart(&stats.distribution));
    }

    if !stats.per_objective.is_empty() {
        html.push_str("<table class=\"objectives\">\n");
        html.push_str("<thead><tr><th>Objective</th><th>Mean achievement</th></tr></thead>\n<tbody>\n");
        for objective in &stats.per_objective {
            html.push_str(&format!(
                "<tr><td>O{} ({})</td><td>{}</td></tr>\n",
                objective.number,
                html_escape(&objective.objective_id),
                objective
                    .mean_achievement
                    .map_or_else(|| "-".to_string(), |a| format!("{:.1}%", a * 100.0)),
            ));
        }
        html.push_str("</tbody></table>\n");
    }

    html.push_str("</section>\n");

    // Per-student results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n<thead><tr>");
    let mut column = 0;
    for header in ["Student", "Name"] {
        html.push_str(&format!(
            "<th onclick=\"sortTable({column})\">{header}</th>"
        ));
        column += 1;
    }
    for objective in &report.project.objectives {
        html.push_str(&format!(
            "<th onclick=\"sortTable({column})\">O{}</th>",
            objective.number
        ));
        column += 1;
    }
    for header in ["Points", "Grade"] {
        html.push_str(&format!(
            "<th onclick=\"sortTable({column})\">{header}</th>"
        ));
        column += 1;
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    let pass_grade = report.settings.pass_grade;
    for r in &report.results {
        let row_class = match r.outcome.grade() {
            Some(g) if g >= pass_grade => "pass",
            Some(_) => "fail",
            None => "ungraded",
        };

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td>",
            row_class,
            html_escape(&r.student_id),
            html_escape(&r.student_name)
        ));
        for objective in &report.project.objectives {
            let cell = r
                .objectives
                .iter()
                .find(|o| o.objective_id == objective.id)
                .map_or_else(
                    || "-".to_string(),
                    |o| format!("{}/{}", o.total_points, o.max_points),
                );
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str(&format!(
            "<td>{}/{}</td><td class=\"{}\">{}</td></tr>\n",
            r.total_points,
            r.max_points,
            row_class,
            format_grade(r.outcome.grade())
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML grade sheet to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_distribution_chart(distribution: &BTreeMap<String, usize>) -> String {
    let bar_width = 40;
    let max_height = 160;
    let padding = 10;
    let label_height = 20;

    let max_count = distribution.values().copied().max().unwrap_or(1).max(1);
    let total_width = distribution.len() * (bar_width + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        total_width,
        max_height + 2 * label_height
    );

    for (i, (bucket, count)) in distribution.iter().enumerate() {
        let x = i * (bar_width + padding) + padding;
        let height = count * max_height / max_count;
        let y = label_height + max_height - height;

        let grade: f64 = bucket.parse().unwrap_or(0.0);
        let color = if grade >= 5.0 {
            "#22c55e"
        } else if grade >= 4.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            y.saturating_sub(4),
            count
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            x, y, bar_width, height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            label_height + max_height + label_height - 4,
            html_escape(bucket)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --ungraded: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --ungraded: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.ungraded { background: var(--ungraded); font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
