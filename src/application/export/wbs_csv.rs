//! WBS table as CSV

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Outline, DATE_FORMAT};

pub const WBS_CSV_HEADER: [&str; 6] = ["number", "title", "owner", "due", "status", "priority"];

/// Render the outline as `number,title,owner,due,status,priority` rows.
pub fn outline_to_csv(outline: &Outline) -> ApplicationResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(WBS_CSV_HEADER).map_err(csv_err)?;

    for row in outline.rows() {
        let due = row
            .due
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let priority = row.priority.to_string();
        writer
            .write_record([
                row.number.as_str(),
                row.title.as_str(),
                row.owner.as_deref().unwrap_or_default(),
                due.as_str(),
                row.status.as_str(),
                priority.as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApplicationError::OperationFailed {
            context: "flush CSV output".into(),
            source: Box::new(e.into_error()),
        })?;
    String::from_utf8(bytes).map_err(|e| ApplicationError::OperationFailed {
        context: "encode CSV output".into(),
        source: Box::new(e),
    })
}

fn csv_err(e: csv::Error) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: "write CSV row".into(),
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_date, ItemPatch, Status};

    #[test]
    fn given_template_outline_when_exporting_then_rows_carry_numbers() {
        let mut outline = Outline::proposal_template(5);
        let id = outline.items()[3].id.clone();
        outline.update(
            &id,
            &ItemPatch {
                owner: Some(Some("Lee, J".into())),
                due: Some(Some(parse_date("2025-09-01").unwrap())),
                status: Some(Status::InProgress),
                ..ItemPatch::default()
            },
        );

        let csv = outline_to_csv(&outline).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "number,title,owner,due,status,priority");
        assert_eq!(lines[1], "1,Proposal,,,not-started,P2");
        assert_eq!(
            lines[4],
            "1.2.1,System architecture,\"Lee, J\",2025-09-01,in-progress,P2"
        );
        assert_eq!(lines.len(), 6);
    }
}
