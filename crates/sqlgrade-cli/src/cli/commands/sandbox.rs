use super::{exit_codes, load_config_or_default, open_store, student_session, Context};
use crate::cli::args::TestQueryArgs;
use sqlgrade_core::grading::SqliteExecutor;
use sqlgrade_core::report::console;
use sqlgrade_core::sandbox::{run_test_query, send_to_teacher};

pub fn run(ctx: &Context, args: TestQueryArgs) -> anyhow::Result<i32> {
    let cfg = load_config_or_default(ctx)?;
    let store = open_store(&ctx.db)?;
    let session = student_session(&store, &args.auth)?;
    let executor = SqliteExecutor::open_read_only(&ctx.db, cfg.limits())?;

    let result = run_test_query(&executor, &cfg, &args.query);
    let code = match &result {
        Ok(rows) => {
            print!("{}", console::format_rowset(rows));
            exit_codes::OK
        }
        Err(e) => {
            eprintln!("query error: {:#}", e);
            exit_codes::REJECTED
        }
    };

    if args.send {
        let id = send_to_teacher(&store, &session, &args.query, result.as_ref().ok())?;
        eprintln!("sent to instructor (#{})", id);
    }
    Ok(code)
}
