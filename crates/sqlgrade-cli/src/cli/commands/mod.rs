use super::args::*;
use sqlgrade_core::auth::{login, Session};
use sqlgrade_core::config::CourseConfig;
use sqlgrade_core::errors::{AuthError, ConfigError};
use sqlgrade_core::storage::Store;
use std::path::{Path, PathBuf};

pub mod account;
pub mod admin;
pub mod sandbox;
pub mod submit;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const REJECTED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

/// Global flags every command needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: PathBuf,
    pub db: PathBuf,
    pub strict_config: bool,
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let ctx = Context {
        config: cli.config,
        db: cli.db,
        strict_config: cli.strict_config,
    };
    let result = match cli.cmd {
        Command::Init(args) => cmd_init(&ctx, args),
        Command::Submit(args) => submit::run(ctx, args).await,
        Command::Whoami(auth) => account::whoami(&ctx, auth),
        Command::Passwd(args) => account::passwd(&ctx, args),
        Command::Email(args) => account::email(&ctx, args),
        Command::TestQuery(args) => sandbox::run(&ctx, args),
        Command::Admin(args) => admin::run(&ctx, args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    };
    result.or_else(classify_error)
}

/// Known failures become exit codes; anything else is fatal.
fn classify_error(e: anyhow::Error) -> anyhow::Result<i32> {
    if let Some(auth) = e.downcast_ref::<AuthError>() {
        eprintln!("error: {}", auth);
        return Ok(exit_codes::REJECTED);
    }
    if let Some(cfg) = e.downcast_ref::<ConfigError>() {
        eprintln!("{}", cfg);
        return Ok(exit_codes::CONFIG_ERROR);
    }
    Err(e)
}

fn cmd_init(ctx: &Context, args: InitArgs) -> anyhow::Result<i32> {
    write_sample_config_if_missing(&ctx.config)?;
    write_file_if_missing(Path::new(".gitignore"), crate::templates::GITIGNORE)?;

    let store = open_store(&ctx.db)?;
    eprintln!("schema ready in {}", ctx.db.display());

    if args.demo {
        store.execute_batch(crate::templates::DEMO_COURSEWORK)?;
        write_file_if_missing(
            Path::new("demo/hw3.sql"),
            crate::templates::DEMO_SUBMISSION,
        )?;
        eprintln!("seeded demo student 40001 (password: demo)");
    }
    Ok(exit_codes::OK)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::write(path, content)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists (skipped)", path.display());
    }
    Ok(())
}

fn write_sample_config_if_missing(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        ensure_parent_dir(path)?;
        sqlgrade_core::config::write_sample_config(path)?;
        eprintln!("created {}", path.display());
    } else {
        eprintln!("note: {} already exists", path.display());
    }
    Ok(())
}

/// A missing config file means the built-in course layout.
pub(crate) fn load_config_or_default(ctx: &Context) -> anyhow::Result<CourseConfig> {
    if !ctx.config.exists() {
        tracing::debug!(path = %ctx.config.display(), "no config file, using defaults");
        return Ok(CourseConfig::default());
    }
    Ok(sqlgrade_core::config::load_config(
        &ctx.config,
        ctx.strict_config,
    )?)
}

pub(crate) fn open_store(db: &Path) -> anyhow::Result<Store> {
    ensure_parent_dir(db)?;
    let store = Store::open(db)?;
    store.init_schema()?;
    Ok(store)
}

pub(crate) fn student_session(store: &Store, auth: &StudentAuth) -> anyhow::Result<Session> {
    login(store, &auth.student_id, &auth.password)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
