use super::{exit_codes, load_config_or_default, open_store, student_session, Context};
use crate::cli::args::{EmailArgs, PasswdArgs, StudentAuth};
use sqlgrade_core::auth::{change_password, register_email};
use sqlgrade_core::service::QuotaStatus;

/// Dashboard: who is logged in and how many submissions each assignment has left.
pub fn whoami(ctx: &Context, auth: StudentAuth) -> anyhow::Result<i32> {
    let cfg = load_config_or_default(ctx)?;
    let store = open_store(&ctx.db)?;
    let session = student_session(&store, &auth)?;
    let student = session.student();

    println!("{} ({})", student.name, student.student_id);
    println!("track: {}", student.track);
    println!("email: {}", student.email.as_deref().unwrap_or("-"));

    let usage = store.usage_for(&student.student_id)?;
    let limit = cfg.settings.max_submissions;
    for hw in &cfg.assignments {
        let used = usage
            .iter()
            .find(|(a, _)| a == hw)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        let quota = QuotaStatus { used, limit };
        println!(
            "hw{:<4} {}/{} used, {} remaining",
            hw,
            quota.used,
            quota.limit,
            quota.remaining()
        );
    }
    Ok(exit_codes::OK)
}

pub fn passwd(ctx: &Context, args: PasswdArgs) -> anyhow::Result<i32> {
    let store = open_store(&ctx.db)?;
    let session = student_session(&store, &args.auth)?;
    change_password(&store, &session, &args.old, &args.new, &args.confirm)?;
    eprintln!("password changed");
    Ok(exit_codes::OK)
}

pub fn email(ctx: &Context, args: EmailArgs) -> anyhow::Result<i32> {
    let store = open_store(&ctx.db)?;
    let session = student_session(&store, &args.auth)?;
    match args.set {
        Some(addr) => {
            register_email(&store, &session, &addr)?;
            eprintln!("e-mail saved");
        }
        None => println!("{}", session.student().email.as_deref().unwrap_or("-")),
    }
    Ok(exit_codes::OK)
}
