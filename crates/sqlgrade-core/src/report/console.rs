use crate::grading::RowSet;
use crate::model::{LedgerRow, QueryOutcome, Receipt, StatsRow, Student, TeacherQuery};

pub fn format_receipt(r: &Receipt) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({}) · {} · assignment {}\n",
        r.name, r.student_id, r.track, r.assignment
    ));

    for (i, o) in r.outcomes.iter().enumerate() {
        let line = match o {
            QueryOutcome::Correct => format!("✅ q{:<3} {}", i + 1, o.as_str()),
            QueryOutcome::Incorrect => format!("❌ q{:<3} {}", i + 1, o.as_str()),
            QueryOutcome::ExecutionError { message } => {
                format!("💥 q{:<3} {}: {}", i + 1, o.as_str(), message)
            }
        };
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    let incorrect = if r.incorrect.is_empty() {
        "none".to_string()
    } else {
        r.incorrect
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    out.push_str(&format!(
        "Result: {}/{} correct (incorrect: {})\n",
        r.correct, r.total, incorrect
    ));
    out.push_str(&format!(
        "Submissions: {} used, {} remaining · submitted at {} UTC\n",
        r.done, r.remaining, r.submitted_at
    ));
    out
}

pub fn print_receipt(r: &Receipt) {
    eprint!("{}", format_receipt(r));
}

pub fn format_rowset(rs: &RowSet) -> String {
    let mut out = String::new();
    out.push_str(&rs.columns.join(" | "));
    out.push('\n');
    for row in &rs.rows {
        let cells: Vec<String> = row.iter().map(|c| c.render()).collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
    out.push_str(&format!("({} rows)\n", rs.len()));
    out
}

pub fn format_stats(rows: &[StatsRow]) -> String {
    let mut out = format!("{:<20} {:<6} {:>11} {:>11}\n", "track", "hw", "submissions", "avg correct");
    for r in rows {
        out.push_str(&format!(
            "{:<20} {:<6} {:>11} {:>11.2}\n",
            r.track, r.assignment, r.submissions, r.avg_correct
        ));
    }
    out
}

pub fn format_submissions(rows: &[LedgerRow]) -> String {
    let mut out = String::new();
    for r in rows {
        let total = r
            .total_count
            .map(|t| format!("/{}", t))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}  {:<12} {:<20} {:<16} hw{:<4} {}{}\n",
            r.submitted_at, r.student_id, r.name, r.track, r.assignment, r.correct_count, total
        ));
    }
    out.push_str(&format!("({} submissions)\n", rows.len()));
    out
}

pub fn format_students(rows: &[Student]) -> String {
    let mut out = String::new();
    for s in rows {
        out.push_str(&format!(
            "{:<12} {:<20} {:<16} {}\n",
            s.student_id,
            s.name,
            s.track,
            s.email.as_deref().unwrap_or("-")
        ));
    }
    out
}

pub fn format_teacher_queries(rows: &[TeacherQuery]) -> String {
    let mut out = String::new();
    for q in rows {
        out.push_str(&format!(
            "#{} {} {} ({}) · {}\n    {}\n",
            q.id,
            q.submitted_at,
            q.student_name,
            q.student_id,
            q.track,
            q.query.replace('\n', "\n    ")
        ));
        if let Some(rows) = q.output.as_ref().and_then(|o| o.get("rows")).and_then(|r| r.as_array()) {
            out.push_str(&format!("    → {} rows\n", rows.len()));
        }
    }
    out
}
