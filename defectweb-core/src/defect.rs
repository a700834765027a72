//! Defect model consumed by the renderers
//!
//! Global invariants enforced:
//! - Absent source fields are `None`, never an empty string
//! - Attachments and events keep source document order
//! - A `Defect` id is non-empty, unique in a report, and safe as a file stem

use serde::Serialize;

/// One tracked issue in the export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Defect {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// People in "Last, First" form
    pub assigned: Vec<String>,
    /// People in "Last, First" form; the first entry is the reporter shown on pages
    pub reporter: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attachments: Vec<Attachment>,
    pub defect_events: Vec<Event>,
}

impl Defect {
    /// Canonical reporter, if any
    pub fn reporter(&self) -> Option<&str> {
        self.reporter.first().map(String::as_str)
    }

    /// Assigned people joined for display
    pub fn assigned_display(&self) -> String {
        join_people(&self.assigned)
    }

    /// File name of this defect's detail page
    pub fn page_name(&self) -> String {
        format!("{}.html", self.id)
    }
}

/// File attached to the original report of a defect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Original (human) file name, relative to the export root
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Attachment {
    /// Images get an inline preview on the detail page
    pub fn is_image(&self) -> bool {
        self.filename.to_lowercase().contains(".jpg")
    }
}

/// State change or annotation in a defect's history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub author: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
    /// Present only when the event carried an assignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<Vec<String>>,
}

impl Event {
    pub fn author(&self) -> Option<&str> {
        self.author.first().map(String::as_str)
    }
}

/// Join person names the way every page displays them
pub fn join_people(people: &[String]) -> String {
    people.join(" and ")
}

/// Severity bucket used by the index page summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBucket {
    A,
    B,
    C,
    Other,
}

impl SeverityBucket {
    /// Classify a severity value; missing or unrecognized values are `Other`
    pub fn classify(severity: Option<&str>) -> Self {
        match severity.map(str::to_lowercase).as_deref() {
            Some("a") => SeverityBucket::A,
            Some("b") => SeverityBucket::B,
            Some("c") => SeverityBucket::C,
            _ => SeverityBucket::Other,
        }
    }
}

/// Per-bucket defect counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub other: usize,
}

impl SeverityCounts {
    pub fn from_defects(defects: &[Defect]) -> Self {
        let mut counts = SeverityCounts::default();
        for defect in defects {
            match SeverityBucket::classify(defect.severity.as_deref()) {
                SeverityBucket::A => counts.a += 1,
                SeverityBucket::B => counts.b += 1,
                SeverityBucket::C => counts.c += 1,
                SeverityBucket::Other => counts.other += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c + self.other
    }
}
