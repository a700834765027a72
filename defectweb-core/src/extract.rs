//! Defect extraction from the manifest document
//!
//! Global invariants enforced:
//! - Pure function of the document: no filesystem access, no global state
//! - A malformed field becomes `None` and never fails extraction
//! - Defects that cannot own a detail page are skipped and reported

use crate::defect::{Attachment, Defect, Event};
use crate::fields::{Field, FIELD_MAP};
use crate::manifest::{custom_field, elements, people, scalar};
use roxmltree::{Document, Node};
use std::collections::HashSet;
use std::fmt;

const FOUND_VERSION_FIELD: &str = "found on build";
const FIX_VERSION_FIELD: &str = "Fix Version";

/// Result of extracting every defect in a manifest
#[derive(Debug, Default)]
pub struct Extraction {
    pub defects: Vec<Defect>,
    pub skipped: Vec<SkippedDefect>,
}

/// A defect entry left out of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDefect {
    /// Zero-based position of the entry among the manifest's defects
    pub position: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    UnsafeId(String),
    DuplicateId(String),
}

impl fmt::Display for SkippedDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::MissingId => {
                write!(f, "defect #{} has no record-id", self.position + 1)
            }
            SkipReason::UnsafeId(id) => write!(
                f,
                "defect #{} has id {:?} which is not a valid file name",
                self.position + 1,
                id
            ),
            SkipReason::DuplicateId(id) => write!(
                f,
                "defect #{} repeats id {:?}",
                self.position + 1,
                id
            ),
        }
    }
}

/// Extract all defects in document order
pub fn extract_defects(doc: &Document<'_>) -> Extraction {
    let mut extraction = Extraction::default();
    let mut seen = HashSet::new();

    for (position, element) in elements(doc.root(), "defect").enumerate() {
        let defect = match extract_defect(element) {
            Ok(defect) => defect,
            Err(reason) => {
                extraction.skipped.push(SkippedDefect { position, reason });
                continue;
            }
        };
        if !seen.insert(defect.id.clone()) {
            extraction.skipped.push(SkippedDefect {
                position,
                reason: SkipReason::DuplicateId(defect.id),
            });
            continue;
        }
        extraction.defects.push(defect);
    }

    extraction
}

/// Build one defect from its `defect` element
pub fn extract_defect(element: Node<'_, '_>) -> Result<Defect, SkipReason> {
    let mut defect = Defect::default();
    let mut id = None;

    for (raw, field) in FIELD_MAP {
        let value = scalar(element, raw);
        match field {
            Field::Id => id = value,
            Field::Summary => defect.summary = value,
            Field::Severity => defect.severity = value,
            Field::Component => defect.component = value,
            Field::Rate => defect.rate = value,
            Field::Date => defect.date = value,
            Field::Status => defect.status = value,
        }
    }

    defect.id = match id {
        Some(id) if is_safe_id(&id) => id,
        Some(id) => return Err(SkipReason::UnsafeId(id)),
        None => return Err(SkipReason::MissingId),
    };

    defect.assigned = people(element, "currently-assigned-to");
    defect.reporter = people(element, "entered-by");
    defect.attachments = extract_attachments(element);
    defect.description = extract_description(element);
    defect.found_version = custom_field(element, FOUND_VERSION_FIELD);
    defect.defect_events = elements(element, "defect-event")
        .map(extract_event)
        .collect();

    Ok(defect)
}

/// An id doubles as a file stem, so it must name a single path component
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

fn extract_attachments(element: Node<'_, '_>) -> Vec<Attachment> {
    elements(element, "reported-by-record")
        .flat_map(|record| elements(record, "attachment"))
        .map(|attachment| Attachment {
            filename: attachment.attribute("name").unwrap_or_default().to_string(),
            date: attachment.attribute("create-date").map(str::to_string),
        })
        .collect()
}

/// Description of the sole reported-by record; zero or several yield none
fn extract_description(element: Node<'_, '_>) -> Option<String> {
    let mut records = elements(element, "reported-by-record");
    let record = records.next()?;
    if records.next().is_some() {
        return None;
    }
    scalar(record, "description")
}

fn extract_event(element: Node<'_, '_>) -> Event {
    let mut assigned_to = elements(element, "event-assigned-to");
    let assigned = match (assigned_to.next(), assigned_to.next()) {
        (Some(node), None) => Some(people(node, "assigned-to-user")),
        _ => None,
    };

    Event {
        name: scalar(element, "event-name"),
        date: scalar(element, "event-date"),
        author: people(element, "event-author"),
        notes: scalar(element, "notes"),
        fixed_version: custom_field(element, FIX_VERSION_FIELD),
        assigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(xml: &str) -> Extraction {
        let doc = Document::parse(xml).unwrap();
        extract_defects(&doc)
    }

    #[test]
    fn test_mislabeled_fields_land_in_canonical_slots() {
        let extraction = extract(
            "<defects><defect>\
               <record-id>7</record-id>\
               <type>B</type>\
               <priority>Network</priority>\
               <severity>High</severity>\
             </defect></defects>",
        );
        let defect = &extraction.defects[0];
        assert_eq!(defect.severity.as_deref(), Some("B"));
        assert_eq!(defect.component.as_deref(), Some("Network"));
        assert_eq!(defect.rate.as_deref(), Some("High"));
    }

    #[test]
    fn test_repeated_scalar_is_missing() {
        let extraction = extract(
            "<defects><defect>\
               <record-id>1</record-id>\
               <defect-status>Open</defect-status>\
               <defect-status>Closed</defect-status>\
             </defect></defects>",
        );
        assert_eq!(extraction.defects[0].status, None);
    }

    #[test]
    fn test_missing_id_is_skipped() {
        let extraction = extract(
            "<defects>\
               <defect><summary>no id</summary></defect>\
               <defect><record-id>2</record-id></defect>\
             </defects>",
        );
        assert_eq!(extraction.defects.len(), 1);
        assert_eq!(extraction.defects[0].id, "2");
        assert_eq!(
            extraction.skipped,
            vec![SkippedDefect {
                position: 0,
                reason: SkipReason::MissingId
            }]
        );
    }

    #[test]
    fn test_unsafe_and_duplicate_ids_are_skipped() {
        let extraction = extract(
            "<defects>\
               <defect><record-id>../etc</record-id></defect>\
               <defect><record-id>5</record-id></defect>\
               <defect><record-id>5</record-id></defect>\
             </defects>",
        );
        assert_eq!(extraction.defects.len(), 1);
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::UnsafeId("../etc".to_string())
        );
        assert_eq!(
            extraction.skipped[1],
            SkippedDefect {
                position: 2,
                reason: SkipReason::DuplicateId("5".to_string())
            }
        );
    }

    #[test]
    fn test_two_reported_by_records_have_no_description() {
        let extraction = extract(
            "<defects><defect>\
               <record-id>3</record-id>\
               <reported-by-record><description>first</description></reported-by-record>\
               <reported-by-record><description>second</description></reported-by-record>\
             </defect></defects>",
        );
        assert_eq!(extraction.defects[0].description, None);
    }

    #[test]
    fn test_attachments_keep_order_across_records() {
        let extraction = extract(
            r#"<defects><defect>
                 <record-id>4</record-id>
                 <reported-by-record>
                   <attachment name="b.txt" filespec="1.dat" create-date="1/1/2010"/>
                   <attachment name="a.jpg" filespec="2.dat" create-date="1/2/2010"/>
                 </reported-by-record>
                 <reported-by-record>
                   <attachment name="c.log" filespec="3.dat"/>
                 </reported-by-record>
               </defect></defects>"#,
        );
        let names: Vec<&str> = extraction.defects[0]
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, vec!["b.txt", "a.jpg", "c.log"]);
        assert_eq!(
            extraction.defects[0].attachments[0].date.as_deref(),
            Some("1/1/2010")
        );
        assert_eq!(extraction.defects[0].attachments[2].date, None);
    }

    #[test]
    fn test_attachment_without_name_is_listed_blank() {
        let extraction = extract(
            r#"<defects><defect>
                 <record-id>8</record-id>
                 <reported-by-record>
                   <attachment filespec="1.dat" create-date="6/1/2013"/>
                   <attachment name="" filespec="2.dat"/>
                   <attachment name="kept.txt" filespec="3.dat"/>
                 </reported-by-record>
               </defect></defects>"#,
        );
        let attachments = &extraction.defects[0].attachments;
        assert_eq!(attachments.len(), 3);
        assert_eq!(attachments[0].filename, "");
        assert_eq!(attachments[0].date.as_deref(), Some("6/1/2013"));
        assert_eq!(attachments[1].filename, "");
        assert_eq!(attachments[2].filename, "kept.txt");
    }

    #[test]
    fn test_events_with_optional_assignment() {
        let extraction = extract(
            r#"<defects><defect>
                 <record-id>9</record-id>
                 <defect-event>
                   <event-name>Assign</event-name>
                   <event-date>2/3/2011</event-date>
                   <event-author><first-name>Ann</first-name><last-name>Lee</last-name></event-author>
                   <event-assigned-to>
                     <assigned-to-user><first-name>Bo</first-name><last-name>Kim</last-name></assigned-to-user>
                   </event-assigned-to>
                 </defect-event>
                 <defect-event>
                   <event-name>Fix</event-name>
                   <notes>patched</notes>
                   <custom-field-value field-name="fix version" field-value="2.0"/>
                 </defect-event>
               </defect></defects>"#,
        );
        let events = &extraction.defects[0].defect_events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name.as_deref(), Some("Assign"));
        assert_eq!(events[0].author(), Some("Lee, Ann"));
        assert_eq!(events[0].assigned, Some(vec!["Kim, Bo".to_string()]));
        assert_eq!(events[1].assigned, None);
        assert_eq!(events[1].notes.as_deref(), Some("patched"));
        assert_eq!(events[1].fixed_version.as_deref(), Some("2.0"));
        assert_eq!(events[1].date, None);
    }
}
