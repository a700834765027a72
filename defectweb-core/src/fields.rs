//! Raw export element names to canonical defect fields
//!
//! The exporter stores the component in `priority` and a secondary rating in
//! `severity`, while the real severity lives in `type`. This table is the only
//! place that correction is encoded.

/// Canonical scalar fields of a defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Summary,
    Severity,
    Component,
    Rate,
    Date,
    Status,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Summary => "summary",
            Field::Severity => "severity",
            Field::Component => "component",
            Field::Rate => "rate",
            Field::Date => "date",
            Field::Status => "status",
        }
    }
}

/// Raw element name paired with the field it actually holds
pub const FIELD_MAP: &[(&str, Field)] = &[
    ("record-id", Field::Id),
    ("summary", Field::Summary),
    ("type", Field::Severity),
    ("priority", Field::Component),
    ("severity", Field::Rate),
    ("date-entered", Field::Date),
    ("defect-status", Field::Status),
];

/// Resolve a raw element name
pub fn lookup(raw: &str) -> Option<Field> {
    FIELD_MAP
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, field)| *field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_holds_component() {
        assert_eq!(lookup("priority"), Some(Field::Component));
    }

    #[test]
    fn test_severity_holds_rate_not_severity() {
        assert_eq!(lookup("severity"), Some(Field::Rate));
        assert_eq!(lookup("type"), Some(Field::Severity));
    }

    #[test]
    fn test_unknown_names_are_unmapped() {
        assert_eq!(lookup("component"), None);
        assert_eq!(lookup("Record-Id"), None);
    }

    #[test]
    fn test_every_canonical_field_mapped_once() {
        let mut names: Vec<&str> = FIELD_MAP.iter().map(|(_, f)| f.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FIELD_MAP.len());
    }
}
