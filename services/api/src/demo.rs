use chrono::{Local, NaiveDate};
use clap::Args;
use jobboard::applications::{ApplicationDraft, ApplicationStatus};
use jobboard::config::AuthConfig;
use jobboard::identity::{Principal, Registration};
use jobboard::jobs::{JobDraft, JobType};
use jobboard::storage::MemoryStore;
use jobboard::{AppError, BoardError, JobBoard};
use std::sync::Arc;

const DEMO_PASSWORD: &str = "demo-password";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Posting deadline (YYYY-MM-DD). Defaults to today + 30 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) deadline: Option<NaiveDate>,
    /// Print the final JSON payloads for the job and the applicant's applications.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { deadline, json } = args;
    let deadline =
        deadline.unwrap_or_else(|| Local::now().date_naive() + chrono::Duration::days(30));

    let board = JobBoard::new(Arc::new(MemoryStore::default()), &AuthConfig::ephemeral());

    println!("Job board hiring demo");
    let owner = register(&board, "Erin Employer", "e1@acme.test", Some("Acme"))?;
    let rival = register(&board, "Evan Elsewhere", "e2@globex.test", Some("Globex"))?;
    let applicant = register(&board, "Ada Applicant", "a1@mail.test", None)?;
    println!(
        "- Registered {} ({}), {} ({}), {} ({})",
        owner.name,
        owner.role(),
        rival.name,
        rival.role(),
        applicant.name,
        applicant.role()
    );

    let job = board.catalog().create(
        &owner,
        JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the hiring pipeline services".to_string(),
            requirements: "Rust, SQL".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            salary_min: 50_000,
            salary_max: 90_000,
            deadline,
        },
    )?;
    println!(
        "- {} posted '{}' at {} ({}-{}), deadline {}",
        owner.name, job.title, job.company_name, job.salary_min, job.salary_max, job.deadline
    );

    let inverted = board.catalog().create(
        &owner,
        JobDraft {
            title: "Inverted Salary".to_string(),
            description: "Should never be stored".to_string(),
            requirements: "None".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::PartTime,
            salary_min: 100_000,
            salary_max: 50_000,
            deadline,
        },
    );
    report("Posting with salary_min > salary_max", inverted.map(|_| ()));

    let draft = ApplicationDraft {
        job_id: job.id.clone(),
        resume_url: "http://x".to_string(),
        cover_letter: None,
    };
    let application = board.ledger().submit(&applicant, draft.clone())?;
    println!(
        "- {} applied -> status {} | applications for job: {}",
        applicant.name,
        application.status,
        board.aggregation().application_count(&job.id)?
    );

    report(
        "Second submission for the same job",
        board.ledger().submit(&applicant, draft).map(|_| ()),
    );

    let accepted =
        board
            .ledger()
            .set_status(&owner, &application.id, ApplicationStatus::Accepted)?;
    println!("- {} accepted the application -> status {}", owner.name, accepted.status);

    report(
        "Owner tries to reject the settled application",
        board
            .ledger()
            .set_status(&owner, &application.id, ApplicationStatus::Rejected)
            .map(|_| ()),
    );
    report(
        "Non-owning employer tries to change the status",
        board
            .ledger()
            .set_status(&rival, &application.id, ApplicationStatus::Rejected)
            .map(|_| ()),
    );

    let summary = board.summary(&applicant)?;
    println!(
        "- {} summary: total {} | pending {} | accepted {} | rejected {}",
        applicant.name, summary.total, summary.pending, summary.accepted, summary.rejected
    );

    if json {
        match serde_json::to_string_pretty(&board.get_job(&job.id)?) {
            Ok(rendered) => println!("  Job payload:\n{rendered}"),
            Err(err) => println!("  Job payload unavailable: {err}"),
        }
        match serde_json::to_string_pretty(&board.my_applications(&applicant)?) {
            Ok(rendered) => println!("  My applications payload:\n{rendered}"),
            Err(err) => println!("  My applications payload unavailable: {err}"),
        }
    }

    board.catalog().delete(&owner, &job.id)?;
    let after_delete = board.ledger().list_for_job(&owner, &job.id).map(|_| ());
    report("Listing applications for the deleted job", after_delete);
    println!(
        "- {} now has {} application(s) on record",
        applicant.name,
        board.ledger().list_mine(&applicant)?.len()
    );

    Ok(())
}

fn register(
    board: &JobBoard<MemoryStore>,
    name: &str,
    email: &str,
    company: Option<&str>,
) -> Result<Principal, BoardError> {
    let role = if company.is_some() {
        "employer"
    } else {
        "applicant"
    };
    board.identity().register(Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: role.to_string(),
        company: company.map(str::to_string),
        phone: None,
        location: None,
    })
}

fn report(step: &str, outcome: Result<(), BoardError>) {
    match outcome {
        Ok(()) => println!("- {step}: unexpectedly succeeded"),
        Err(err) => println!("- {step}: rejected as {} ({err})", err.kind()),
    }
}
