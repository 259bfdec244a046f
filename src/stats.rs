use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CompanyRecord, PlacementStats, WeightedSample};

/// Which compensation sub-field to pull out of a drive's free-text blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ctc,
    Stipend,
    Fixed,
}

// Amount tokens: digits with optional decimals, or a k-suffixed shorthand.
// Alternation order is load-bearing; historical stats depend on the plain
// digit form winning when both could match.
const AMOUNT_TOKEN: &str = r"[\d,]+(?:\.\d+)?|\d+(?:\.\d+)?\s*[kK]";

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(k)?$").unwrap());
static KAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\s*[kK]").unwrap());

static CTC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)CTC\s*[:\-]\s*₹?\s*({AMOUNT_TOKEN})")).unwrap()
});
// Two stipend forms: a separated "Stipend: ₹x" and a looser "Stipend ₹x".
// Tried in this order, first extracted value wins.
static STIPEND_RES: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(&format!(r"(?i)Stipend\s*[:\-]\s*₹?\s*({AMOUNT_TOKEN})")).unwrap(),
        Regex::new(&format!(r"(?i)Stipend\s*₹?\s*({AMOUNT_TOKEN})")).unwrap(),
    ]
});
static FIXED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)Fixed\s*[-:]\s*₹?\s*(same as CTC|{AMOUNT_TOKEN})")).unwrap()
});

/// Parses a bare amount token such as `1,50,000`, `19999.95` or `35k`.
/// Returns `None` for anything that is not a plain non-negative number
/// with an optional thousands suffix.
pub fn parse_amount(token: &str) -> Option<f64> {
    let t = token.replace(',', "").trim().to_lowercase();
    let caps = AMOUNT_RE.captures(&t)?;
    let mut value: f64 = caps.get(1)?.as_str().parse().ok()?;
    if caps.get(2).is_some() {
        value *= 1000.0;
    }
    Some(value)
}

fn find_amount(re: &Regex, text: &str) -> Option<f64> {
    let caps = re.captures(text)?;
    let mut raw = caps.get(1)?.as_str().to_string();
    // tokens like "35 k" carry an internal space
    if KAY_RE.is_match(&raw) {
        raw = raw.replace(' ', "");
    }
    parse_amount(&raw)
}

/// Extracts one compensation sub-field from the whole text blob.
///
/// `Fixed` resolves "same as CTC" against the CTC extracted from the same
/// text; a missing label yields `None`, never zero.
pub fn extract_field(field: Field, text: &str) -> Option<f64> {
    match field {
        Field::Ctc => find_amount(&CTC_RE, text),
        Field::Stipend => STIPEND_RES.iter().find_map(|re| find_amount(re, text)),
        Field::Fixed => extract_fixed(text, extract_field(Field::Ctc, text)),
    }
}

/// `Fixed` extraction with the record's already-extracted CTC, so the
/// "same as CTC" phrase can resolve without re-scanning the text.
pub fn extract_fixed(text: &str, ctc: Option<f64>) -> Option<f64> {
    let caps = FIXED_RE.captures(text)?;
    let raw = caps.get(1)?.as_str();
    if raw.trim().to_lowercase().starts_with("same") {
        return ctc;
    }
    parse_amount(raw)
}

fn weighted_avg(samples: &[WeightedSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total_value: f64 = samples.iter().map(|s| s.value * s.weight as f64).sum();
    let total_weight: i64 = samples.iter().map(|s| s.weight as i64).sum();
    if total_weight > 0 {
        total_value / total_weight as f64
    } else {
        0.0
    }
}

fn simple_avg(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Computes the placement statistics over an immutable snapshot of drives.
///
/// Malformed compensation text never fails a record; fields that cannot be
/// extracted are simply left out of their aggregate.
pub fn compute_stats(companies: &[CompanyRecord]) -> PlacementStats {
    if companies.is_empty() {
        return PlacementStats::default();
    }

    let unique: HashSet<&str> = companies.iter().map(|c| c.company_name.as_str()).collect();
    let ppo: HashSet<&str> = companies
        .iter()
        .filter(|c| c.type_of_offer.to_uppercase().contains("PPO"))
        .map(|c| c.company_name.as_str())
        .collect();
    let total_unique = unique.len();
    let ppo_count = ppo.len();

    let mut stipend_weighted: Vec<WeightedSample> = Vec::new();
    let mut ctc_simple: Vec<f64> = Vec::new();
    let mut fixed_weighted: Vec<WeightedSample> = Vec::new();

    let mut intern_count = 0i64;
    let mut fte_count = 0i64;
    let mut intern_fte_count = 0i64;
    let mut total_students = 0i64;

    for c in companies {
        let text = c.ctc_stipend.trim();

        if let Some(stipend) = extract_field(Field::Stipend, text) {
            stipend_weighted.push(WeightedSample {
                value: stipend,
                weight: c.students_selected,
            });
        }

        let ctc = extract_field(Field::Ctc, text);
        if let Some(ctc) = ctc {
            ctc_simple.push(ctc);
        }

        // No explicit Fixed means no Fixed, even when a CTC is present.
        if let Some(fixed) = extract_fixed(text, ctc) {
            fixed_weighted.push(WeightedSample {
                value: fixed,
                weight: c.students_selected,
            });
        }

        let offer = c.type_of_offer.to_lowercase();
        let has_intern = offer.contains("intern");
        let has_fte = offer.contains("fte");
        if has_intern && !has_fte {
            intern_count += c.students_selected as i64;
        }
        if has_fte && !has_intern {
            fte_count += c.students_selected as i64;
        }
        if offer.contains("intern+fte") || (has_intern && has_fte) {
            intern_fte_count += c.students_selected as i64;
        }

        total_students += c.students_selected as i64;
    }

    let fixed_values: Vec<f64> = fixed_weighted.iter().map(|s| s.value).collect();

    PlacementStats {
        total_unique_companies: total_unique,
        on_campus: total_unique - ppo_count,
        ppo: ppo_count,
        average_stipend: weighted_avg(&stipend_weighted),
        average_ctc: simple_avg(&ctc_simple),
        median_ctc: median(fixed_values),
        average_ctc_weighted: weighted_avg(&fixed_weighted),
        students_selected: total_students,
        intern_count,
        fte_count,
        intern_fte_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn drive(name: &str, offer: &str, comp: &str, selected: i32) -> CompanyRecord {
        CompanyRecord {
            id: 0,
            notification_date: NaiveDate::from_ymd_opt(2025, 9, 29).unwrap(),
            company_name: name.to_string(),
            type_of_offer: offer.to_string(),
            branches_allowed: Some("CSE, ECE, CCE".to_string()),
            eligibility_cgpa: Some("6".to_string()),
            job_roles: "SDE".to_string(),
            ctc_stipend: comp.to_string(),
            students_selected: selected,
            process: "Completed".to_string(),
        }
    }

    #[test]
    fn parses_indian_grouped_digits() {
        assert_eq!(parse_amount("1,50,000"), Some(150000.0));
        assert_eq!(parse_amount("  7,00,000 "), Some(700000.0));
    }

    #[test]
    fn parses_thousands_suffix() {
        assert_eq!(parse_amount("35k"), Some(35000.0));
        assert_eq!(parse_amount("35K"), Some(35000.0));
        assert_eq!(parse_amount("2.5k"), Some(2500.0));
    }

    #[test]
    fn rejects_non_amounts() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-500"), None);
        assert_eq!(parse_amount("1e5"), None);
        assert_eq!(parse_amount("₹500"), None);
    }

    #[test]
    fn extracts_all_three_fields_from_one_blob() {
        let text = "CTC: ₹7,00,000\nStipend: ₹15,000\nFixed - 600000";
        assert_eq!(extract_field(Field::Ctc, text), Some(700000.0));
        assert_eq!(extract_field(Field::Stipend, text), Some(15000.0));
        assert_eq!(extract_field(Field::Fixed, text), Some(600000.0));
    }

    #[test]
    fn fixed_same_as_ctc_keeps_decimals() {
        let text = "CTC: ₹12,49,999.99\nFixed - same as CTC";
        assert_eq!(extract_field(Field::Fixed, text), Some(1249999.99));
    }

    #[test]
    fn fixed_same_as_ctc_propagates_missing_ctc() {
        assert_eq!(extract_field(Field::Fixed, "Fixed - same as CTC"), None);
        assert_eq!(extract_fixed("Fixed - same as CTC", None), None);
    }

    #[test]
    fn missing_label_is_not_zero() {
        let text = "Stipend: ₹1,00,000";
        assert_eq!(extract_field(Field::Ctc, text), None);
        assert_eq!(extract_field(Field::Fixed, text), None);
    }

    #[test]
    fn trailing_prose_after_amount_is_ignored() {
        let text = "CTC: ₹12,00,000\nStipend: ₹25,000\nFixed - 1200000 + other benefits additional";
        assert_eq!(extract_field(Field::Fixed, text), Some(1200000.0));
        let text = "CTC: ₹12,84,000\nStipend: ₹50,000\nFixed - 1200000 (Remote)";
        assert_eq!(extract_field(Field::Fixed, text), Some(1200000.0));
    }

    #[test]
    fn stipend_falls_back_to_looser_form() {
        assert_eq!(extract_field(Field::Stipend, "Stipend ₹12,000 per month"), Some(12000.0));
        // separated form wins when both are present
        let text = "Stipend: ₹40,000\nStipend - 35k fixed";
        assert_eq!(extract_field(Field::Stipend, text), Some(40000.0));
    }

    #[test]
    fn empty_snapshot_yields_all_zeroes() {
        assert_eq!(compute_stats(&[]), PlacementStats::default());
    }

    #[test]
    fn all_zero_weights_do_not_divide_by_zero() {
        let drives = vec![
            drive("A", "FTE", "CTC: ₹5,00,000\nStipend: ₹10,000\nFixed - 400000", 0),
            drive("B", "FTE", "CTC: ₹6,00,000\nStipend: ₹20,000\nFixed - 500000", 0),
        ];
        let stats = compute_stats(&drives);
        assert_eq!(stats.average_stipend, 0.0);
        assert_eq!(stats.average_ctc_weighted, 0.0);
        // unweighted aggregates still apply
        assert_eq!(stats.average_ctc, 550000.0);
        assert_eq!(stats.median_ctc, 450000.0);
    }

    #[test]
    fn compute_stats_is_idempotent() {
        let drives = vec![
            drive("A", "SLI + FTE", "CTC: ₹7,00,000\nStipend: ₹15,000\nFixed - 600000", 8),
            drive("B", "Intern + PPO", "CTC: ₹22,00,000\nStipend: ₹75,000", 4),
        ];
        assert_eq!(compute_stats(&drives), compute_stats(&drives));
    }

    #[test]
    fn offer_categories_partition_students() {
        let cases = [
            ("SDE Intern", (3, 0, 0)),
            ("FTE", (0, 3, 0)),
            ("Intern+FTE", (0, 0, 3)),
            ("SLI + FTE and Intern later", (0, 0, 3)),
            ("Full time", (0, 0, 0)),
        ];
        for (offer, (intern, fte, both)) in cases {
            let stats = compute_stats(&[drive("A", offer, "", 3)]);
            assert_eq!(
                (stats.intern_count, stats.fte_count, stats.intern_fte_count),
                (intern, fte, both),
                "offer {offer:?}"
            );
        }
    }

    #[test]
    fn ppo_split_counts_distinct_companies() {
        let drives = vec![
            drive("BNY Mellon", "Intern + PPO", "CTC: ₹22,00,000\nStipend: ₹75,000", 4),
            drive("BNY Mellon", "Intern + PPO", "CTC: ₹22,00,000\nStipend: ₹75,000", 1),
            drive("Triology", "FTE", "CTC: ₹32,50,000\nFixed - 3000000 Bonus - 250000", 0),
        ];
        let stats = compute_stats(&drives);
        assert_eq!(stats.total_unique_companies, 2);
        assert_eq!(stats.ppo, 1);
        assert_eq!(stats.on_campus, 1);
    }

    #[test]
    fn malformed_text_still_counts_students() {
        let drives = vec![drive("A", "FTE", "package to be decided", 5)];
        let stats = compute_stats(&drives);
        assert_eq!(stats.students_selected, 5);
        assert_eq!(stats.fte_count, 5);
        assert_eq!(stats.average_ctc, 0.0);
        assert_eq!(stats.median_ctc, 0.0);
    }

    #[test]
    fn end_to_end_seed_style_snapshot() {
        let drives = vec![
            drive("Celebal", "SLI + FTE", "CTC: ₹7,00,000\nStipend: ₹15,000\nFixed - 600000", 8),
            drive("FreeCharge", "SLI + FTE", "CTC: ₹7,00,000\nStipend: ₹25,000\nFixed - 700000", 0),
            drive("Provakil", "SLI + FTE", "CTC: ₹6,50,000\nStipend: ₹20,000\nFixed - 650000", 2),
        ];
        let stats = compute_stats(&drives);
        assert_eq!(stats.total_unique_companies, 3);
        assert_eq!(stats.ppo, 0);
        assert_eq!(stats.on_campus, 3);
        assert_eq!(stats.students_selected, 10);
        assert_eq!(stats.fte_count, 10);
        assert_eq!(stats.intern_count, 0);
        assert_eq!(stats.intern_fte_count, 0);
        assert!((stats.average_ctc - 683333.3333333334).abs() < 0.01);
        assert_eq!(stats.average_stipend, 16000.0);
        assert_eq!(stats.median_ctc, 650000.0);
        assert_eq!(stats.average_ctc_weighted, 610000.0);
    }

    #[test]
    fn median_averages_middle_pair_for_even_counts() {
        let drives = vec![
            drive("A", "FTE", "Fixed - 400000", 1),
            drive("B", "FTE", "Fixed - 600000", 1),
            drive("C", "FTE", "Fixed - 900000", 1),
            drive("D", "FTE", "Fixed - 100000", 1),
        ];
        assert_eq!(compute_stats(&drives).median_ctc, 500000.0);
    }
}
