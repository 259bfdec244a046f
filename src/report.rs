use std::fmt::Write;

use crate::models::{CompanyRecord, OfferTypeSummary};
use crate::stats;

pub fn summarize_by_offer(companies: &[CompanyRecord]) -> Vec<OfferTypeSummary> {
    let mut map: std::collections::HashMap<String, (usize, i64)> =
        std::collections::HashMap::new();

    for company in companies {
        let entry = map.entry(company.type_of_offer.clone()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += company.students_selected as i64;
    }

    let mut summaries: Vec<OfferTypeSummary> = map
        .into_iter()
        .map(|(type_of_offer, (drive_count, students_selected))| OfferTypeSummary {
            type_of_offer,
            drive_count,
            students_selected,
        })
        .collect();

    summaries.sort_by(|a, b| b.drive_count.cmp(&a.drive_count));
    summaries
}

pub fn build_report(companies: &[CompanyRecord]) -> String {
    let stats = stats::compute_stats(companies);
    let summaries = summarize_by_offer(companies);

    let mut output = String::new();

    let _ = writeln!(output, "# Placement Report");
    let _ = writeln!(
        output,
        "Covers {} drives across {} companies.",
        companies.len(),
        stats.total_unique_companies
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Placements");
    let _ = writeln!(output, "- Students selected: {}", stats.students_selected);
    let _ = writeln!(output, "- On-campus companies: {}", stats.on_campus);
    let _ = writeln!(output, "- PPO companies: {}", stats.ppo);
    let _ = writeln!(
        output,
        "- Intern / FTE / Intern+FTE students: {} / {} / {}",
        stats.intern_count, stats.fte_count, stats.intern_fte_count
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Compensation");
    let _ = writeln!(output, "- Average CTC: ₹{:.2}", stats.average_ctc);
    let _ = writeln!(
        output,
        "- Average package secured (weighted): ₹{:.2}",
        stats.average_ctc_weighted
    );
    let _ = writeln!(output, "- Median package secured: ₹{:.2}", stats.median_ctc);
    let _ = writeln!(output, "- Average stipend (weighted): ₹{:.2}", stats.average_stipend);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Offer Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No drives recorded.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} drives, {} students",
                summary.type_of_offer, summary.drive_count, summary.students_selected
            );
        }
    }

    let mut recent = companies.to_vec();
    recent.sort_by(|a, b| b.notification_date.cmp(&a.notification_date));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Drives");

    if recent.is_empty() {
        let _ = writeln!(output, "No drives recorded.");
    } else {
        for company in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}",
                company.company_name,
                company.type_of_offer,
                company.notification_date,
                company.job_roles
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn drive(name: &str, offer: &str, selected: i32) -> CompanyRecord {
        CompanyRecord {
            id: 0,
            notification_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            company_name: name.to_string(),
            type_of_offer: offer.to_string(),
            branches_allowed: None,
            eligibility_cgpa: None,
            job_roles: "SDE".to_string(),
            ctc_stipend: "CTC: ₹7,00,000".to_string(),
            students_selected: selected,
            process: "Completed".to_string(),
        }
    }

    #[test]
    fn offer_summaries_group_and_sort_by_drive_count() {
        let drives = vec![
            drive("A", "SLI + FTE", 2),
            drive("B", "SLI + FTE", 3),
            drive("C", "Intern + PPO", 1),
        ];
        let summaries = summarize_by_offer(&drives);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].type_of_offer, "SLI + FTE");
        assert_eq!(summaries[0].drive_count, 2);
        assert_eq!(summaries[0].students_selected, 5);
    }

    #[test]
    fn empty_report_still_renders_sections() {
        let report = build_report(&[]);
        assert!(report.contains("# Placement Report"));
        assert!(report.contains("No drives recorded."));
        assert!(report.contains("- Median package secured: ₹0.00"));
    }
}
