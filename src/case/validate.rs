//! Eligibility checks for case reanalysis.

use super::ds::CaseRecord;

/// Validate a case record for reanalysis.
///
/// All checks run before any other processing and the outcome is
/// all-or-nothing.  Note that the schema check itself happens when the raw
/// JSON is parsed into a [`CaseRecord`]; a record that deserialized is
/// structurally v6.
///
/// # Errors
///
/// If the case has no interpreted genome, has not been submitted for
/// clinical review, or has already been closed with a positive outcome.
pub fn validate(record: &CaseRecord) -> Result<(), anyhow::Error> {
    let has_genome = !record.interpreted_genome.is_empty();
    let sent = is_sent(record);
    let unsolved = is_unsolved(record);
    if has_genome && sent && unsolved {
        Ok(())
    } else {
        anyhow::bail!(
            "case not eligible for reanalysis: has_genome:{}, is_sent:{}, is_unsolved:{}",
            has_genome,
            sent,
            unsolved
        )
    }
}

/// Whether the case was submitted to the interpretation portal.
///
/// This happens once all QC checks have passed and a decision support
/// service has processed the data.
fn is_sent(record: &CaseRecord) -> bool {
    record.status.iter().any(|item| item.status == "sent_to_gmcs")
}

/// Whether no issued report has closed the case as solved.
fn is_unsolved(record: &CaseRecord) -> bool {
    !record.clinical_report.iter().any(|report| {
        report
            .exit_questionnaire
            .as_ref()
            .map(|eq| eq.exit_questionnaire_data.family_level_questions.case_solved_family == "yes")
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod test {
    use crate::case::ds::CaseRecord;

    fn fixture() -> CaseRecord {
        let text = std::fs::read_to_string("tests/data/case.json").expect("fixture exists");
        CaseRecord::from_value(serde_json::from_str(&text).expect("valid JSON"))
            .expect("valid v6 record")
    }

    #[test]
    fn accepts_eligible_case() {
        super::validate(&fixture()).expect("fixture case is eligible");
    }

    #[test]
    fn rejects_unsubmitted_case() {
        let mut record = fixture();
        record.status.clear();
        let err = super::validate(&record).unwrap_err();
        assert!(err.to_string().contains("is_sent:false"), "{}", err);
    }

    #[test]
    fn rejects_solved_case() {
        let mut record = fixture();
        for report in &mut record.clinical_report {
            if let Some(eq) = report.exit_questionnaire.as_mut() {
                eq.exit_questionnaire_data
                    .family_level_questions
                    .case_solved_family = "yes".into();
            }
        }
        let err = super::validate(&record).unwrap_err();
        assert!(err.to_string().contains("is_unsolved:false"), "{}", err);
    }

    #[test]
    fn reports_without_questionnaire_do_not_count_as_solved() {
        let mut record = fixture();
        for report in &mut record.clinical_report {
            report.exit_questionnaire = None;
        }
        super::validate(&record).expect("open questionnaire keeps the case eligible");
    }

    #[test]
    fn rejects_case_without_interpreted_genome() {
        let mut record = fixture();
        record.interpreted_genome.clear();
        let err = super::validate(&record).unwrap_err();
        assert!(err.to_string().contains("has_genome:false"), "{}", err);
    }
}
