use super::{exit_codes, load_config_or_default, open_store, student_session, Context};
use crate::cli::args::SubmitArgs;
use anyhow::Context as _;
use sqlgrade_core::errors::SubmitError;
use sqlgrade_core::grading::SqliteExecutor;
use sqlgrade_core::model::Receipt;
use sqlgrade_core::report::{console, json};
use sqlgrade_core::service::{SubmissionService, SubmissionSource};

pub async fn run(ctx: Context, args: SubmitArgs) -> anyhow::Result<i32> {
    let cfg = load_config_or_default(&ctx)?;
    let json_out = args.json.clone();

    // Grading holds a SQLite connection for the whole submission.
    let outcome = tokio::task::spawn_blocking(move || grade_and_record(&ctx, &cfg, &args))
        .await
        .context("grading task panicked")??;

    match outcome {
        Ok(receipt) => {
            console::print_receipt(&receipt);
            if let Some(path) = json_out {
                json::write_json(&receipt, &path)?;
                eprintln!("wrote {}", path.display());
            }
            Ok(exit_codes::OK)
        }
        Err(e) if e.is_rejection() => {
            eprintln!("rejected: {}", e);
            Ok(exit_codes::REJECTED)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}

fn grade_and_record(
    ctx: &Context,
    cfg: &sqlgrade_core::config::CourseConfig,
    args: &SubmitArgs,
) -> anyhow::Result<Result<Receipt, SubmitError>> {
    let store = open_store(&ctx.db)?;
    let session = student_session(&store, &args.auth)?;
    let executor = SqliteExecutor::open_read_only(&ctx.db, cfg.limits())?;

    let source = match (&args.text, &args.file) {
        (Some(text), _) => SubmissionSource::Text(text),
        (None, Some(path)) => SubmissionSource::File(path),
        (None, None) => anyhow::bail!("either --text or --file is required"),
    };

    Ok(SubmissionService::new(&store, &executor, cfg).submit(
        &session,
        &args.assignment,
        source,
    ))
}
