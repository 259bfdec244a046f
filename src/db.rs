use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{CompanyPatch, CompanyRecord, NewCompany};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn row_to_company(row: &PgRow) -> CompanyRecord {
    CompanyRecord {
        id: row.get("id"),
        notification_date: row.get("notification_date"),
        company_name: row.get("company_name"),
        type_of_offer: row.get("type_of_offer"),
        branches_allowed: row.get("branches_allowed"),
        eligibility_cgpa: row.get("eligibility_cgpa"),
        job_roles: row.get("job_roles"),
        ctc_stipend: row.get("ctc_stipend"),
        students_selected: row.get("students_selected"),
        process: row.get("process"),
    }
}

/// Fetches the full snapshot the statistics engine runs over, in insertion
/// order.
pub async fn fetch_companies(pool: &PgPool) -> anyhow::Result<Vec<CompanyRecord>> {
    let rows = sqlx::query(
        "SELECT id, notification_date, company_name, type_of_offer, branches_allowed, \
         eligibility_cgpa, job_roles, ctc_stipend, students_selected, process \
         FROM placement_tracker.companies ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_company).collect())
}

pub async fn fetch_company(pool: &PgPool, id: i64) -> anyhow::Result<Option<CompanyRecord>> {
    let row = sqlx::query(
        "SELECT id, notification_date, company_name, type_of_offer, branches_allowed, \
         eligibility_cgpa, job_roles, ctc_stipend, students_selected, process \
         FROM placement_tracker.companies WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_company))
}

pub async fn insert_company(pool: &PgPool, company: &NewCompany) -> anyhow::Result<Option<i64>> {
    let source_key = company
        .source_key
        .clone()
        .unwrap_or_else(|| format!("manual-{}", Uuid::new_v4()));

    let row = sqlx::query(
        r#"
        INSERT INTO placement_tracker.companies
        (notification_date, company_name, type_of_offer, branches_allowed,
         eligibility_cgpa, job_roles, ctc_stipend, students_selected, process, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (source_key) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(company.notification_date)
    .bind(&company.company_name)
    .bind(&company.type_of_offer)
    .bind(&company.branches_allowed)
    .bind(&company.eligibility_cgpa)
    .bind(&company.job_roles)
    .bind(&company.ctc_stipend)
    .bind(company.students_selected)
    .bind(&company.process)
    .bind(source_key)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.get("id")))
}

/// Applies a partial update; fields left `None` keep their stored values.
/// Returns the updated record, or `None` when the id does not exist.
pub async fn update_company(
    pool: &PgPool,
    id: i64,
    patch: CompanyPatch,
) -> anyhow::Result<Option<CompanyRecord>> {
    let Some(mut company) = fetch_company(pool, id).await? else {
        return Ok(None);
    };

    if let Some(value) = patch.notification_date {
        company.notification_date = value;
    }
    if let Some(value) = patch.company_name {
        company.company_name = value;
    }
    if let Some(value) = patch.type_of_offer {
        company.type_of_offer = value;
    }
    if let Some(value) = patch.branches_allowed {
        company.branches_allowed = Some(value);
    }
    if let Some(value) = patch.eligibility_cgpa {
        company.eligibility_cgpa = Some(value);
    }
    if let Some(value) = patch.job_roles {
        company.job_roles = value;
    }
    if let Some(value) = patch.ctc_stipend {
        company.ctc_stipend = value;
    }
    if let Some(value) = patch.students_selected {
        company.students_selected = value;
    }
    if let Some(value) = patch.process {
        company.process = value;
    }

    sqlx::query(
        r#"
        UPDATE placement_tracker.companies
        SET notification_date = $2, company_name = $3, type_of_offer = $4,
            branches_allowed = $5, eligibility_cgpa = $6, job_roles = $7,
            ctc_stipend = $8, students_selected = $9, process = $10
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(company.notification_date)
    .bind(&company.company_name)
    .bind(&company.type_of_offer)
    .bind(&company.branches_allowed)
    .bind(&company.eligibility_cgpa)
    .bind(&company.job_roles)
    .bind(&company.ctc_stipend)
    .bind(company.students_selected)
    .bind(&company.process)
    .execute(pool)
    .await?;

    Ok(Some(company))
}

pub async fn delete_company(pool: &PgPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM placement_tracker.companies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    // Drives from the 2025-26 season, compensation text kept verbatim,
    // awkward formatting included.
    let drives: Vec<(&str, &str, &str, Option<&str>, Option<&str>, &str, &str, i32)> = vec![
        (
            "seed-001",
            "Celebal Technologies",
            "SLI + FTE",
            Some("CSE, ECE, CCE, Mech"),
            Some("5"),
            "Data Science, Data Engineer",
            "CTC: ₹7,00,000\nStipend: ₹15,000\nFixed - 600000",
            8,
        ),
        (
            "seed-002",
            "FreeCharge",
            "SLI + FTE",
            None,
            Some("6"),
            "Devops, Data engineer, Quality Assurance, Frontend Developer, Backend Developer(Java)",
            "CTC: ₹7,00,000\nStipend: ₹25,000\nFixed - 700000",
            0,
        ),
        (
            "seed-003",
            "Provakil",
            "SLI + FTE",
            Some("CSE, ECE, CCE, Mech"),
            Some("5"),
            "Associate Software Developer",
            "CTC: ₹6,50,000\nStipend: ₹20,000\nFixed - 650000",
            2,
        ),
        (
            "seed-004",
            "ShodhAI",
            "SLI + FTE",
            Some("CSE, CCE"),
            Some("5"),
            "ML, Fullstack, SRE",
            "CTC: ₹12,49,999.99\nFixed - same as CTC",
            0,
        ),
        (
            "seed-005",
            "TITAN.email",
            "SLI + FTE",
            None,
            Some("7"),
            "SDE",
            "CTC: ₹25,00,000\nStipend: ₹1,00,000\nFixed - 1800000 Other Variable - 700000",
            0,
        ),
        (
            "seed-006",
            "Spring Financial",
            "SLI + FTE",
            Some("CSE, CCE"),
            Some("6"),
            "Software Engineer Trainee",
            "CTC: ₹12,00,000\nStipend: ₹25,000\nFixed - 1200000 + other benefits additional",
            3,
        ),
        (
            "seed-007",
            "ZS Associates",
            "SLI + FTE",
            Some("CSE, ECE, CCE"),
            Some("7"),
            "Software Developer, Business Analyst, DAA",
            "CTC: ₹14,15,000",
            19,
        ),
        (
            "seed-008",
            "Media.net",
            "SLI",
            Some("CSE, ECE, CCE"),
            Some("6"),
            "SDE Intern",
            "Stipend: ₹1,00,000",
            1,
        ),
        (
            "seed-009",
            "Triology",
            "FTE",
            Some("CSE, ECE, CCE, Mech"),
            None,
            "SDE",
            "CTC: ₹32,50,000\nFixed - 3000000 Bonus - 250000",
            0,
        ),
        (
            "seed-010",
            "Tekion",
            "SLI + FTE",
            Some("CSE"),
            Some("7"),
            "Associate Software Engineer",
            "CTC: ₹19,99,999.95\nStipend: ₹65,000\nFixed - 2000000",
            5,
        ),
        (
            "seed-011",
            "Signzy",
            "SLI + PPO based on Performance",
            Some("CSE, ECE, CCE, Mech"),
            Some("6.5"),
            "MERN Stack Intern",
            "Stipend: ₹40,000\nStipend - 35k fixed",
            0,
        ),
        (
            "seed-012",
            "DEShaw",
            "SLI + FTE",
            Some("CSE, ECE, CCE"),
            Some("7"),
            "SDE",
            "CTC: ₹59,30,000\nStipend: ₹1,50,000\nFixed - 2400000 Variable* INR 4,00,000 Non Cash Benefits INR 5,30,000 Relocation Allowance** INR 2,00,000 Long Term Incentive*** INR 20,00,000 Joining Bonus INR 4,00,000",
            3,
        ),
        (
            "seed-013",
            "BNY Mellon",
            "Intern + PPO",
            Some("CSE"),
            Some("7.5"),
            "CSE, CCE, ECE",
            "CTC: ₹22,00,000\nStipend: ₹75,000",
            4,
        ),
        (
            "seed-014",
            "Deloitte",
            "Intern + PPO",
            Some("CSE, ECE, CCE, Mech"),
            Some("6"),
            "Product Engineer, DataScience, UI/UX",
            "CTC: ₹12,50,000\nStipend: ₹30,000",
            21,
        ),
    ];

    let dates = [
        (2025, 9, 29),
        (2025, 9, 29),
        (2025, 9, 25),
        (2025, 9, 24),
        (2025, 9, 22),
        (2025, 9, 9),
        (2025, 9, 2),
        (2025, 8, 22),
        (2025, 8, 21),
        (2025, 8, 5),
        (2025, 8, 5),
        (2025, 8, 29),
        (2024, 10, 5),
        (2024, 2, 19),
    ];

    let mut inserted = 0usize;
    for (i, (source_key, name, offer, branches, cgpa, roles, comp, selected)) in
        drives.into_iter().enumerate()
    {
        let (y, m, d) = dates[i];
        let company = NewCompany {
            notification_date: NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| anyhow::anyhow!("invalid seed date"))?,
            company_name: name.to_string(),
            type_of_offer: offer.to_string(),
            branches_allowed: branches.map(str::to_string),
            eligibility_cgpa: cgpa.map(str::to_string),
            job_roles: roles.to_string(),
            ctc_stipend: comp.to_string(),
            students_selected: selected,
            process: "Completed".to_string(),
            source_key: Some(source_key.to_string()),
        };
        if insert_company(pool, &company).await?.is_some() {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        notification_date: NaiveDate,
        company_name: String,
        type_of_offer: String,
        branches_allowed: Option<String>,
        eligibility_cgpa: Option<String>,
        job_roles: String,
        ctc_stipend: Option<String>,
        students_selected: i32,
        process: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let company = NewCompany {
            notification_date: row.notification_date,
            company_name: row.company_name,
            type_of_offer: row.type_of_offer,
            branches_allowed: row.branches_allowed,
            eligibility_cgpa: row.eligibility_cgpa,
            job_roles: row.job_roles,
            ctc_stipend: row.ctc_stipend.unwrap_or_default(),
            students_selected: row.students_selected,
            process: row.process.unwrap_or_else(|| "Completed".to_string()),
            source_key: Some(
                row.source_key
                    .unwrap_or_else(|| format!("import-{}", Uuid::new_v4())),
            ),
        };
        if insert_company(pool, &company).await?.is_some() {
            inserted += 1;
        }
    }

    Ok(inserted)
}
