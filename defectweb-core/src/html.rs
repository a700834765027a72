//! HTML page generation
//!
//! Renders one detail page per defect and one sortable index page.
//!
//! Global invariants enforced:
//! - Identical input yields byte-for-byte identical output
//! - Every index row has exactly `COLUMN_ORDER.len()` cells
//! - Text is kept as UTF-8; only control characters are dropped
//!
//! Field values are written without HTML escaping. The export comes from an
//! internal tracker with rich text already stripped.

use crate::defect::{join_people, Attachment, Defect, Event, SeverityCounts};

/// Client-side table sorting script, loaded by reference
pub const SORTTABLE_SCRIPT_URL: &str = "https://www.kryogenix.org/code/browser/sorttable/sorttable.js";

/// Columns of the index table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Summary,
    Severity,
    Status,
    Assigned,
    Component,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Summary => "summary",
            Column::Severity => "severity",
            Column::Status => "status",
            Column::Assigned => "assigned",
            Column::Component => "component",
        }
    }

    /// Cell content for a defect; `None` renders as an empty cell
    fn value(&self, defect: &Defect) -> Option<String> {
        match self {
            Column::Id => Some(format!(
                r#"<a href="{}">{}</a>"#,
                clean(&defect.page_name()),
                clean(&defect.id)
            )),
            Column::Summary => defect.summary.as_deref().map(clean),
            Column::Severity => defect.severity.as_deref().map(clean),
            Column::Status => defect.status.as_deref().map(clean),
            Column::Assigned if defect.assigned.is_empty() => None,
            Column::Assigned => Some(clean(&defect.assigned_display())),
            Column::Component => defect.component.as_deref().map(clean),
        }
    }
}

pub const COLUMN_ORDER: [Column; 6] = [
    Column::Id,
    Column::Summary,
    Column::Severity,
    Column::Status,
    Column::Assigned,
    Column::Component,
];

/// Render the summary page for all defects
pub fn render_index_page(defects: &[Defect]) -> String {
    let counts = SeverityCounts::from_defects(defects);

    let header: String = COLUMN_ORDER
        .iter()
        .map(|column| format!("<th>{}</th>", column.as_str()))
        .collect();

    let rows: String = defects
        .iter()
        .map(|defect| {
            let cells: String = COLUMN_ORDER
                .iter()
                .map(|column| format!("<td>{}</td>", column.value(defect).unwrap_or_default()))
                .collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<script src="{script}"></script>
<style>{css}</style>
<title>{title}</title>
</head>
<body>
<table class="sortable" border="1">
<thead>
<tr>{header}</tr>
</thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        script = SORTTABLE_SCRIPT_URL,
        css = index_css(),
        title = index_title(defects.len(), &counts),
        header = header,
        rows = rows,
    )
}

fn index_title(total: usize, counts: &SeverityCounts) -> String {
    format!(
        "Defect Database - {} Defects - A: {} + B: {} + C: {} + Other: {}",
        total, counts.a, counts.b, counts.c, counts.other
    )
}

fn index_css() -> &'static str {
    r#"
/* Sortable tables */
table.sortable thead {
    background-color: #eee;
    color: #666666;
    font-weight: bold;
    cursor: default;
}
"#
}

/// Render the detail page of one defect
pub fn render_defect_page(defect: &Defect) -> String {
    let id = clean(&defect.id);
    let summary = blank(defect.summary.as_deref());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{id} - {summary}</title>
</head>
<body>
<table border="1">
<tr> <td>{id}</td> <td>{status}</td> <td>Assigned: {assigned}</td> <td>Component: {component}</td> </tr>
<tr> <td>Sev: {severity}</td> <td>Rate: {rate}</td> <td>Reporter: {reporter}</td> <td>Opened: {date}</td> <td>{found_version}</td> </tr>
</table>
<h2>{summary}</h2>
<pre>{description}</pre>
{events}{attachments}</body>
</html>
"#,
        id = id,
        summary = summary,
        status = blank(defect.status.as_deref()),
        assigned = clean(&defect.assigned_display()),
        component = blank(defect.component.as_deref()),
        severity = blank(defect.severity.as_deref()),
        rate = blank(defect.rate.as_deref()),
        reporter = blank(defect.reporter()),
        date = blank(defect.date.as_deref()),
        found_version = blank(defect.found_version.as_deref()),
        description = blank(defect.description.as_deref()),
        events = render_events(&defect.defect_events),
        attachments = render_attachments(&defect.attachments),
    )
}

/// Event history table; optional columns appear only on rows that have them
fn render_events(events: &[Event]) -> String {
    if events.is_empty() {
        return String::new();
    }

    let rows: String = events
        .iter()
        .map(|event| {
            let assigned = event
                .assigned
                .as_ref()
                .map(|people| format!("<td>Assigned To: {}</td>", clean(&join_people(people))))
                .unwrap_or_default();
            let notes = event
                .notes
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| format!("<td>{}</td>", clean(n)))
                .unwrap_or_default();
            let fixed_version = event
                .fixed_version
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("<td>Fixed Version: {}</td>", clean(v)))
                .unwrap_or_default();
            format!(
                "<tr> <td>{date}</td> <td>{author}</td> <td>{name}</td>{assigned}{notes}{fixed_version}</tr>\n",
                date = blank(event.date.as_deref()),
                author = blank(event.author()),
                name = blank(event.name.as_deref()),
                assigned = assigned,
                notes = notes,
                fixed_version = fixed_version,
            )
        })
        .collect();

    format!("<table border=\"1\">\n{}</table>\n", rows)
}

/// Plain attachments as links, then images as links with inline previews
fn render_attachments(attachments: &[Attachment]) -> String {
    let files: String = attachments
        .iter()
        .filter(|a| !a.is_image())
        .map(|a| format!("<br>{}\n", attachment_link(a)))
        .collect();

    let images: String = attachments
        .iter()
        .filter(|a| a.is_image())
        .map(|a| {
            format!(
                "<br>{link}\n<br><img src=\"{filename}\" alt=\"{filename}\" /><br>\n",
                link = attachment_link(a),
                filename = clean(&a.filename),
            )
        })
        .collect();

    format!("{}<br>{}\n", files, images)
}

fn attachment_link(attachment: &Attachment) -> String {
    let filename = clean(&attachment.filename);
    match attachment.date.as_deref() {
        Some(date) => format!(r#"<a href="{0}">{0} - {1}</a>"#, filename, clean(date)),
        None => format!(r#"<a href="{0}">{0}</a>"#, filename),
    }
}

/// Missing values render as blank text
fn blank(value: Option<&str>) -> String {
    value.map(clean).unwrap_or_default()
}

/// Drop control characters other than tab, newline and carriage return
fn clean(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}
