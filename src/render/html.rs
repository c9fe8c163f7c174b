//! HTML adapter: turns page views into markup.
//!
//! Emits the whole subtree every time (no incremental patching), so a host
//! replacing the fragment never keeps stale nodes or listeners. Interaction
//! hooks are plain data/class attributes (`data-column-type`,
//! `data-test-result`, `data-id`) for an external script to bind.

use super::{AttachmentView, EnvDisplay, PageView, RowView};
use chrono::Local;

/// Escapes text for element content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Keeps an embedded JSON blob from terminating its own script element
fn escape_json_for_script(s: &str) -> String {
    s.replace("</script>", "<\\/script>")
}

/// Render the full self-contained document. When the raw JSON blob is
/// provided it is embedded so the document carries its own data.
pub fn render_document(page: &PageView, data_json: Option<&str>) -> String {
    let mut html = String::with_capacity(16_384);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<title>");
    html.push_str(&escape_html(&page.title));
    html.push_str("</title>\n<style>\n");
    html.push_str(STYLESHEET);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<h1>");
    html.push_str(&escape_html(&page.title));
    html.push_str("</h1>\n<p class=\"generated\">Report generated on ");
    html.push_str(&Local::now().format("%d-%b-%Y at %H:%M:%S").to_string());
    html.push_str("</p>\n");

    render_environment(&mut html, page);
    render_summary(&mut html, page);
    render_results_table(&mut html, page);

    if let Some(blob) = data_json {
        html.push_str("<script id=\"data-container\" type=\"application/json\">\n");
        html.push_str(&escape_json_for_script(blob));
        html.push_str("\n</script>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_environment(html: &mut String, page: &PageView) {
    if page.environment.is_empty() {
        return;
    }
    html.push_str("<h2>Environment</h2>\n<table id=\"environment\">\n");
    for row in &page.environment {
        html.push_str("<tr><td>");
        html.push_str(&escape_html(&row.key));
        html.push_str("</td><td>");
        match &row.value {
            EnvDisplay::Text(text) => html.push_str(&escape_html(text)),
            EnvDisplay::Items(items) => {
                html.push_str("<ul>");
                for item in items {
                    html.push_str("<li>");
                    html.push_str(&escape_html(item));
                    html.push_str("</li>");
                }
                html.push_str("</ul>");
            }
        }
        html.push_str("</td></tr>\n");
    }
    html.push_str("</table>\n");
}

fn render_summary(html: &mut String, page: &PageView) {
    html.push_str("<h2>Summary</h2>\n<p class=\"run-count\">");
    html.push_str(&escape_html(&page.progress));
    html.push_str("</p>\n<div class=\"filters\">\n");
    for control in &page.filters {
        html.push_str("<label class=\"filter ");
        html.push_str(control.outcome.as_str());
        html.push_str("\"><input type=\"checkbox\" name=\"filter_checkbox\" data-test-result=\"");
        html.push_str(control.outcome.as_str());
        html.push('"');
        if control.checked {
            html.push_str(" checked");
        }
        if control.disabled {
            html.push_str(" disabled");
        }
        html.push_str("> ");
        html.push_str(&control.count.to_string());
        html.push(' ');
        html.push_str(control.label);
        html.push_str("</label>\n");
    }
    html.push_str("</div>\n");
    html.push_str(
        "<p class=\"collapse-controls\"><a href=\"#\" data-action=\"show-all\">Show all details</a> / \
         <a href=\"#\" data-action=\"hide-all\">Hide all details</a></p>\n",
    );
}

fn render_results_table(html: &mut String, page: &PageView) {
    html.push_str("<table class=\"results-table\">\n<thead class=\"results-table-head\">\n<tr>\n");
    for header in &page.headers {
        html.push_str("<th class=\"sortable ");
        html.push_str(header.state.css_class());
        html.push_str("\" data-column-type=\"");
        html.push_str(header.key.as_str());
        html.push_str("\">");
        html.push_str(header.label);
        html.push_str("</th>\n");
    }
    html.push_str("<th>Links</th>\n</tr>\n</thead>\n");
    html.push_str(&render_rows(page));
    html.push_str("</table>\n");
}

/// The replaceable subtree: every table body, or the empty-state fragment.
/// A redraw host swaps this whole string in.
pub fn render_rows(page: &PageView) -> String {
    if page.is_empty() {
        return "<tbody class=\"not-found-message\"><tr><td colspan=\"4\">\
                No results found. Check the filters.\
                </td></tr></tbody>\n"
            .to_string();
    }
    let mut html = String::with_capacity(1024 * page.rows.len());
    for row in &page.rows {
        render_row(&mut html, row);
    }
    html
}

fn render_row(html: &mut String, row: &RowView) {
    html.push_str("<tbody class=\"results-table-row ");
    html.push_str(row.result.as_str());
    html.push_str("\" data-id=\"");
    html.push_str(&escape_html(&row.id));
    html.push_str("\">\n<tr>\n<td class=\"col-result\">");
    html.push_str(row.result.as_str());
    html.push_str("</td>\n<td class=\"col-name\">");
    html.push_str(&escape_html(&row.name));
    html.push_str("</td>\n<td class=\"col-duration\">");
    html.push_str(&escape_html(&row.duration_text));
    html.push_str("</td>\n<td class=\"col-links\">");
    for attachment in &row.attachments {
        render_attachment_link(html, attachment);
    }
    html.push_str("</td>\n</tr>\n");

    html.push_str("<tr class=\"extras-row");
    if row.collapsed {
        html.push_str(" collapsed");
    }
    html.push_str("\">\n<td colspan=\"4\">\n");
    if let Some(log) = &row.log {
        html.push_str("<div class=\"log\">");
        html.push_str(&escape_html(log));
        html.push_str("</div>\n");
    }
    let images: Vec<&AttachmentView> = row
        .attachments
        .iter()
        .filter(|a| a.inline_image.is_some())
        .collect();
    if !images.is_empty() {
        html.push_str("<div class=\"extra image\">");
        for image in images {
            if let Some(src) = &image.inline_image {
                html.push_str("<a href=\"");
                html.push_str(&escape_html(src));
                html.push_str("\"><img src=\"");
                html.push_str(&escape_html(src));
                html.push_str("\" alt=\"");
                html.push_str(&escape_html(&image.name));
                html.push_str("\"></a>");
            }
        }
        html.push_str("</div>\n");
    }
    html.push_str("</td>\n</tr>\n</tbody>\n");
}

fn render_attachment_link(html: &mut String, attachment: &AttachmentView) {
    html.push_str("<a class=\"col-links__extra ");
    html.push_str(attachment.kind.as_str());
    html.push_str("\" href=\"");
    html.push_str(&escape_html(&attachment.href));
    html.push_str("\" target=\"_blank\">");
    html.push_str(&escape_html(&attachment.name));
    html.push_str("</a> ");
}

const STYLESHEET: &str = r#"body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;margin:0 auto;max-width:1100px;padding:1rem;color:#1f2328}
h1{font-size:1.5rem}
h2{font-size:1.125rem;border-bottom:1px solid #d0d7de;padding-bottom:.25rem}
.generated{color:#656d76;font-size:.8125rem}
table{border-collapse:collapse;width:100%}
#environment td{border:1px solid #d0d7de;padding:.375rem .625rem;font-size:.8125rem;vertical-align:top}
#environment ul{margin:0;padding-left:1rem}
.filters{display:flex;gap:1rem;flex-wrap:wrap;font-size:.8125rem;margin:.5rem 0}
.filter input[disabled]+*{color:#8c959f}
.collapse-controls{font-size:.8125rem}
.results-table{margin-top:.75rem;font-size:.8125rem}
.results-table th{text-align:left;border-bottom:2px solid #d0d7de;padding:.375rem .625rem}
.results-table th.sortable{cursor:pointer;user-select:none}
.results-table th.sortable.asc::after{content:' \2191'}
.results-table th.sortable.desc::after{content:' \2193'}
.results-table td{border-bottom:1px solid #d0d7de;padding:.375rem .625rem;vertical-align:top}
.col-result{text-transform:capitalize;font-weight:600;width:8rem}
.results-table-row.passed .col-result{color:#1a7f37}
.results-table-row.failed .col-result,.results-table-row.error .col-result{color:#cf222e}
.results-table-row.skipped .col-result,.results-table-row.rerun .col-result{color:#9a6700}
.results-table-row.xfailed .col-result,.results-table-row.xpassed .col-result{color:#8250df}
.col-links__extra{margin-right:.375rem}
.extras-row.collapsed{display:none}
.extras-row .log{white-space:pre-wrap;font-family:SFMono-Regular,Consolas,monospace;font-size:.75rem;background:#f6f8fa;padding:.5rem;max-height:16rem;overflow-y:auto}
.extra.image img{max-width:320px;margin:.25rem .375rem 0 0}
.not-found-message td{color:#656d76;text-align:center;padding:1.5rem}
"#;
