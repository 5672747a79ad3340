use std::fmt::Write;

use tenki_core::dashboard::FieldStats;
use tenki_core::{Category, Field, Reading, SummaryStats, format_date_time};

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{padding:.4rem .8rem;border-bottom:1px solid #ddd;text-align:right}\
th:first-child,td:first-child{text-align:left}\
.stats{display:flex;gap:1rem;margin:1rem 0}\
.stat{border:1px solid #ddd;border-radius:6px;padding:.6rem 1rem}\
.error{background:#fdecea;color:#611a15;border-radius:6px;padding:1rem}";

pub struct PageView<'a> {
    pub title: &'a str,
    pub term: &'a str,
    pub category: Category,
    pub rows: &'a [&'a Reading],
    pub stats: &'a SummaryStats,
    /// Rows loaded before filtering.
    pub total: usize,
}

pub fn page(view: &PageView<'_>) -> String {
    let mut body = search_form(view.term, view.category);
    body.push_str(&stats_block(view.stats, view.total));
    body.push_str(&table(view.rows));
    layout(view.title, &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    let mut body = search_form("", Category::All);
    let _ = write!(body, r#"<div class="error" role="alert">{}</div>"#, escape(message));
    layout(title, &body)
}

fn layout(title: &str, body: &str) -> String {
    let title = escape(title);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    )
}

fn search_form(term: &str, selected: Category) -> String {
    let mut out = String::from(r#"<form method="get" action="/"><select name="category">"#);
    for c in Category::all() {
        let sel = if *c == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{c}"{sel}>{c}</option>"#);
    }
    let _ = write!(
        out,
        r#"</select> <input type="search" name="q" value="{}" placeholder="Search"> <button type="submit">Filter</button></form>"#,
        escape(term)
    );
    out
}

fn stats_block(stats: &SummaryStats, total: usize) -> String {
    let mut out = String::from(r#"<div class="stats">"#);
    let _ = write!(
        out,
        r#"<div class="stat"><strong>Readings</strong><br>{} of {total}</div>"#,
        stats.count
    );
    if let Some(latest) = &stats.latest {
        let _ = write!(
            out,
            r#"<div class="stat"><strong>Latest</strong><br>{}</div>"#,
            escape(latest)
        );
    }
    for field in Field::ALL {
        if let Some(s) = stats.field(field) {
            out.push_str(&stat_card(field, s));
        }
    }
    out.push_str("</div>");
    out
}

fn stat_card(field: Field, s: &FieldStats) -> String {
    let unit = field.unit();
    format!(
        r#"<div class="stat"><strong>{field}</strong><br>avg {:.1} {unit}<br>min {:.1} / max {:.1}</div>"#,
        s.mean, s.min, s.max
    )
}

fn table(rows: &[&Reading]) -> String {
    if rows.is_empty() {
        return "<p>No readings match.</p>".to_string();
    }

    let mut out = String::from(
        "<table><thead><tr><th>Date</th><th>Temperature (°C)</th>\
         <th>Wind (m/s)</th><th>Precipitation (mm)</th></tr></thead><tbody>",
    );
    for row in rows {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&format_date_time(&row.created_at)),
            escape(&row.temperature),
            escape(&row.wind),
            escape(&row.precipitation),
        );
    }
    out.push_str("</tbody></table>");
    out
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_specials() {
        assert_eq!(escape(r#"<b a="1">&'"#), "&lt;b a=&quot;1&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn form_marks_selected_category() {
        let html = search_form("2.3", Category::Wind);
        assert!(html.contains(r#"<option value="wind" selected>"#));
        assert!(html.contains(r#"value="2.3""#));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(table(&[]), "<p>No readings match.</p>");
    }
}
