//! Read-only timetable reports.
//!
//! Consumes the joined rows from the store and renders plain CSV: a
//! day-by-day listing and a grouping by academic year (year n covers
//! semesters 2n-1 and 2n).

use crate::db::ScheduleRow;
use crate::models::Weekday;

/// Academic year 1..4 a semester belongs to.
pub fn academic_year(semester: u8) -> u8 {
    ((semester.max(1) - 1) / 2) + 1
}

/// CSV listing of every booking, ordered day then start time.
pub fn daily_report(rows: &[ScheduleRow]) -> String {
    let mut out = String::from(
        "day,start,end,course_code,course_name,semester,department,classroom,instructor\n",
    );
    for day in Weekday::ALL {
        for row in rows.iter().filter(|r| r.day == day) {
            push_row(&mut out, row, None);
        }
    }
    out
}

/// CSV listing grouped by academic year, then day, then start time.
pub fn academic_year_report(rows: &[ScheduleRow]) -> String {
    let mut out = String::from(
        "year,day,start,end,course_code,course_name,semester,department,classroom,instructor\n",
    );
    for year in 1..=4u8 {
        for day in Weekday::ALL {
            for row in rows
                .iter()
                .filter(|r| academic_year(r.semester) == year && r.day == day)
            {
                push_row(&mut out, row, Some(year));
            }
        }
    }
    out
}

fn push_row(out: &mut String, row: &ScheduleRow, year: Option<u8>) {
    let fields = [
        row.day.as_str().to_string(),
        row.start.format("%H:%M").to_string(),
        row.end.format("%H:%M").to_string(),
        row.course_code.clone(),
        row.course_name.clone(),
        row.semester.to_string(),
        row.department_code.clone(),
        row.classroom_code.clone(),
        row.instructor_name.clone().unwrap_or_default(),
    ];
    if let Some(year) = year {
        out.push_str(&year.to_string());
        out.push(',');
    }
    let line = fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Quotes a CSV field when it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn row(day: Weekday, semester: u8, code: &str) -> ScheduleRow {
        ScheduleRow {
            entry_id: 1,
            day,
            start: t(9, 0),
            end: t(10, 0),
            course_code: code.to_string(),
            course_name: "Algorithms, Advanced".to_string(),
            semester,
            department_code: "CS".to_string(),
            classroom_code: "R101".to_string(),
            instructor_name: Some("A. Turing".to_string()),
        }
    }

    #[test]
    fn test_academic_year_mapping() {
        assert_eq!(academic_year(1), 1);
        assert_eq!(academic_year(2), 1);
        assert_eq!(academic_year(3), 2);
        assert_eq!(academic_year(7), 4);
        assert_eq!(academic_year(8), 4);
    }

    #[test]
    fn test_daily_report_orders_by_day() {
        let rows = vec![
            row(Weekday::Friday, 1, "CS101"),
            row(Weekday::Monday, 1, "CS102"),
        ];
        let csv = daily_report(&rows);
        let monday = csv.find("Monday").unwrap();
        let friday = csv.find("Friday").unwrap();
        assert!(monday < friday);
    }

    #[test]
    fn test_comma_in_field_is_quoted() {
        let rows = vec![row(Weekday::Monday, 1, "CS101")];
        let csv = daily_report(&rows);
        assert!(csv.contains("\"Algorithms, Advanced\""));
    }

    #[test]
    fn test_year_report_groups_semesters() {
        let rows = vec![
            row(Weekday::Monday, 3, "CS201"),
            row(Weekday::Monday, 1, "CS101"),
        ];
        let csv = academic_year_report(&rows);
        let first_year = csv.find("CS101").unwrap();
        let second_year = csv.find("CS201").unwrap();
        assert!(first_year < second_year);
    }
}
