use super::{exit_codes, load_config_or_default, open_store, Context};
use crate::cli::args::{AdminArgs, AdminSub, UsersSub};
use sqlgrade_core::admin::{self, AdminOutcome};
use sqlgrade_core::auth::{admin_login, AdminCredentials, AdminSession};
use sqlgrade_core::config::CourseConfig;
use sqlgrade_core::model::{Student, SubmissionFilter};
use sqlgrade_core::report::console;
use sqlgrade_core::storage::Store;

pub fn run(ctx: &Context, args: AdminArgs) -> anyhow::Result<i32> {
    let cfg = load_config_or_default(ctx)?;
    let creds = AdminCredentials::resolve(&cfg);
    let session = admin_login(creds.as_ref(), &args.username, &args.password)?;
    let store = open_store(&ctx.db)?;

    match args.cmd {
        AdminSub::Stats => {
            print!("{}", console::format_stats(&admin::stats(&store, &session)?));
        }
        AdminSub::Submissions {
            track,
            assignment,
            student_id,
        } => {
            let filter = SubmissionFilter {
                track,
                assignment,
                student_id,
            };
            let rows = admin::submissions(&store, &session, &filter)?;
            print!("{}", console::format_submissions(&rows));
        }
        AdminSub::Query { sql } => match admin::run_query(&store, &session, &sql) {
            Ok(AdminOutcome::Rows(rows)) => print!("{}", console::format_rowset(&rows)),
            Ok(AdminOutcome::Affected(n)) => println!("{} rows affected", n),
            Err(e) => {
                eprintln!("query error: {:#}", e);
                return Ok(exit_codes::REJECTED);
            }
        },
        AdminSub::TeacherQueries { track } => {
            let rows = admin::teacher_queries(&store, &session, track.as_deref())?;
            print!("{}", console::format_teacher_queries(&rows));
        }
        AdminSub::Users { cmd } => return users(&store, &session, &cfg, cmd),
    }
    Ok(exit_codes::OK)
}

fn users(
    store: &Store,
    session: &AdminSession,
    cfg: &CourseConfig,
    cmd: UsersSub,
) -> anyhow::Result<i32> {
    match cmd {
        UsersSub::List => {
            print!("{}", console::format_students(&admin::list_users(store, session)?));
        }
        UsersSub::Add {
            student_id,
            name,
            track,
            password,
            email,
        } => {
            if !cfg.track_names().contains(&track.as_str()) {
                tracing::warn!(
                    track = %track,
                    known = ?cfg.track_names(),
                    "unknown track, default reference suffix applies"
                );
            }
            let student = Student {
                student_id,
                name,
                track,
                email,
            };
            admin::add_user(store, session, &student, &password)?;
            eprintln!("added {} ({})", student.name, student.student_id);
        }
        UsersSub::ResetPassword {
            student_id,
            new_password,
        } => {
            let name = admin::reset_password(store, session, &student_id, &new_password)?;
            eprintln!("password reset for {} ({})", name, student_id);
        }
        UsersSub::Delete { student_id } => {
            if !admin::delete_user(store, session, &student_id)? {
                eprintln!("no student with id {}", student_id);
                return Ok(exit_codes::REJECTED);
            }
            eprintln!("deleted {}", student_id);
        }
    }
    Ok(exit_codes::OK)
}
