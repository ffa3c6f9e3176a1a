use took::Took;

use crate::violation::ViolationReport;

pub fn format_log_method_report_timed(method: &str, report: &ViolationReport, took: Took) -> String {
    format!("{method} - {}, took: {took}", format_log_report(report))
}

pub fn format_log_report(report: &ViolationReport) -> String {
    format!(
        "{}/{}/{} (valid: {})",
        report.total(),
        report.no_repeat,
        report.streak,
        report.is_valid(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_formatted_as_total_no_repeat_streak() {
        let report = ViolationReport {
            no_repeat: 2,
            streak: 3,
            per_team: vec![1, 4],
        };
        assert_eq!(format_log_report(&report), "5/2/3 (valid: false)");
    }
}
