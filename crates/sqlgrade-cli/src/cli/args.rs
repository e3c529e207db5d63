use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlgrade",
    version,
    about = "Grades SQL homework against instructor reference tables"
)]
pub struct Cli {
    #[arg(long, global = true, default_value = "sqlgrade.yaml", env = "SQLGRADE_CONFIG")]
    pub config: PathBuf,

    #[arg(long, global = true, default_value = ".sqlgrade/course.db", env = "SQLGRADE_DB")]
    pub db: PathBuf,

    /// fail on unknown config keys instead of warning
    #[arg(long, global = true)]
    pub strict_config: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample config and create the database schema
    Init(InitArgs),
    /// Grade a submission and record it
    Submit(SubmitArgs),
    /// Show your account and submission usage
    Whoami(StudentAuth),
    /// Change your password
    Passwd(PasswdArgs),
    /// Show or register your e-mail address
    Email(EmailArgs),
    /// Run a practice SELECT against the sandbox table
    TestQuery(TestQueryArgs),
    /// Instructor commands
    Admin(AdminArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StudentAuth {
    #[arg(long, env = "SQLGRADE_STUDENT_ID")]
    pub student_id: String,

    #[arg(long, env = "SQLGRADE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    /// also seed a demo student, sandbox table and hw3 reference tables
    #[arg(long)]
    pub demo: bool,
}

#[derive(Parser, Clone)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub auth: StudentAuth,

    /// assignment code, e.g. 3
    #[arg(long)]
    pub assignment: String,

    /// SQL text with `# number N` markers between answers
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// .sql file to upload instead of --text
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// also write the receipt as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct PasswdArgs {
    #[command(flatten)]
    pub auth: StudentAuth,

    #[arg(long)]
    pub old: String,

    #[arg(long)]
    pub new: String,

    #[arg(long)]
    pub confirm: String,
}

#[derive(Parser, Clone)]
pub struct EmailArgs {
    #[command(flatten)]
    pub auth: StudentAuth,

    /// new address; without it the current one is printed
    #[arg(long)]
    pub set: Option<String>,
}

#[derive(Parser, Clone)]
pub struct TestQueryArgs {
    #[command(flatten)]
    pub auth: StudentAuth,

    #[arg(long)]
    pub query: String,

    /// forward the query and its output to the instructor
    #[arg(long)]
    pub send: bool,
}

#[derive(Parser, Clone)]
pub struct AdminArgs {
    #[arg(long, env = "SQLGRADE_ADMIN_USERNAME")]
    pub username: String,

    #[arg(long, env = "SQLGRADE_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(subcommand)]
    pub cmd: AdminSub,
}

#[derive(Subcommand, Clone)]
pub enum AdminSub {
    /// Submissions and average correct count per track and assignment
    Stats,
    /// List recorded submissions, newest first
    Submissions {
        #[arg(long)]
        track: Option<String>,
        #[arg(long)]
        assignment: Option<String>,
        #[arg(long)]
        student_id: Option<String>,
    },
    /// Run arbitrary SQL against the course database
    Query {
        #[arg(long)]
        sql: String,
    },
    /// Queries students sent from the practice runner
    TeacherQueries {
        #[arg(long)]
        track: Option<String>,
    },
    Users {
        #[command(subcommand)]
        cmd: UsersSub,
    },
}

#[derive(Subcommand, Clone)]
pub enum UsersSub {
    List,
    Add {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        track: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },
    ResetPassword {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        new_password: String,
    },
    Delete {
        #[arg(long)]
        student_id: String,
    },
}
