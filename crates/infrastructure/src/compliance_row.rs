use ppecheck_domain::ComplianceRecord;
use serde_json::{Map, Value};

/// Column holding the source object name.
pub(crate) const FILE_NAME_COLUMN: &str = "file_name";

/// Renders a record as one analytic table row keyed by column name.
pub(crate) fn compliance_row(record: &ComplianceRecord) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert(
        FILE_NAME_COLUMN.to_owned(),
        Value::String(record.file_name().to_owned()),
    );

    for (attribute, verdict) in record.verdicts().iter() {
        row.insert(
            attribute.column_name().to_owned(),
            Value::String(verdict.as_str().to_owned()),
        );
    }

    row
}

#[cfg(test)]
mod tests {
    use ppecheck_domain::{ComplianceRecord, ComplianceVerdicts, Verdict};
    use serde_json::{Value, json};

    use super::compliance_row;

    #[test]
    fn row_uses_table_column_names() {
        let record = ComplianceRecord::new(
            "uploads/captured_photo.jpg",
            ComplianceVerdicts {
                helmet: Verdict::Yes,
                hair: Verdict::No,
                work_clothes: Verdict::Yes,
                safety_vest: Verdict::Uncertain,
            },
        );
        let Ok(record) = record else {
            panic!("record should be valid");
        };

        assert_eq!(
            Value::Object(compliance_row(&record)),
            json!({
                "file_name": "uploads/captured_photo.jpg",
                "helmet": "YES",
                "hair": "NO",
                "work_clothes": "YES",
                "safety_vest": "UNCERTAIN",
            })
        );
    }
}
