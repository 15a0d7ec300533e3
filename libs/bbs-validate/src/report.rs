use serde::{Deserialize, Serialize};

/// Messages collected for one field, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub field: String,
    pub messages: Vec<String>,
}

/// Result of a validation run.
///
/// `errors` is the flat list in evaluation order; `by_field` groups the same
/// messages under the field that produced them, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub by_field: Vec<FieldErrors>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for `field`, empty when the field passed.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.by_field
            .iter()
            .find(|f| f.field == field)
            .map_or(&[][..], |f| f.messages.as_slice())
    }

    pub(crate) fn push(&mut self, field: &str, message: String) {
        self.errors.push(message.clone());
        if let Some(entry) = self.by_field.iter_mut().find(|f| f.field == field) {
            entry.messages.push(message);
        } else {
            self.by_field.push(FieldErrors {
                field: field.to_owned(),
                messages: vec![message],
            });
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn push_groups_by_field_and_keeps_flat_order() {
        let mut report = ValidationReport::default();
        report.push("name", "n1".to_owned());
        report.push("email", "e1".to_owned());
        report.push("name", "n2".to_owned());

        assert!(!report.is_ok());
        assert_eq!(report.errors, ["n1", "e1", "n2"]);
        assert_eq!(report.field_errors("name"), ["n1", "n2"]);
        assert_eq!(report.field_errors("email"), ["e1"]);
        assert!(report.field_errors("introduction").is_empty());
        assert_eq!(report.by_field[0].field, "name");
    }

    #[test]
    fn serializes_for_session_storage() {
        let mut report = ValidationReport::default();
        report.push("email", "bad".to_owned());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"][0], "bad");
        assert_eq!(json["by_field"][0]["field"], "email");

        let back: ValidationReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
