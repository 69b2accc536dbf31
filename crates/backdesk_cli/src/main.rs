//! Command-line admin console for the backdesk API.

use backdesk_client::{ApiClient, ListSession};
use backdesk_core::models::resource::{
    ContactSubmission, EmployeeReferral, HospitalPartner, JobApplication, JobPosting,
    MediaArticle, Publication,
};
use backdesk_core::{
    ApiError, Config, FetchPhase, ListController, Resource, SortDirection, SortSpec,
};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bdesk", about = "Backdesk admin console", version)]
struct Cli {
    /// API base URL (can also be set via BACKDESK_SERVER env var)
    #[arg(short, long, env = "BACKDESK_SERVER")]
    server: Option<String>,

    /// Bearer token attached to every request
    #[arg(long, env = "BACKDESK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds (defaults to BACKDESK_TIMEOUT_SECS, then 30)
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List rows of an admin resource
    List {
        resource: ResourceArg,
        /// Search term
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// Filter as key=value; repeatable
        #[arg(short, long = "filter")]
        filters: Vec<String>,
        /// Page to fetch
        #[arg(long, default_value = "1")]
        page: u32,
        /// Rows per page (defaults to BACKDESK_PAGE_SIZE, then 10)
        #[arg(long)]
        limit: Option<u32>,
        /// Sort as field:asc or field:desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Update the status of several rows in one request
    BulkStatus {
        resource: ResourceArg,
        /// Comma-separated row IDs
        ids: String,
        status: String,
    },
    /// Update the status of one row
    SetStatus {
        resource: ResourceArg,
        id: String,
        status: String,
        /// Optional note stored with the change
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete one row (asks for confirmation unless --yes)
    Delete {
        resource: ResourceArg,
        id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResourceArg {
    Media,
    Publications,
    Careers,
    Contacts,
    Applications,
    Hospitals,
    Referrals,
}

/// Run `$body` with `R` bound to the row type behind the resource argument.
macro_rules! with_resource {
    ($resource:expr, $run:ident($($arg:expr),*)) => {
        match $resource {
            ResourceArg::Media => $run::<MediaArticle>($($arg),*).await,
            ResourceArg::Publications => $run::<Publication>($($arg),*).await,
            ResourceArg::Careers => $run::<JobPosting>($($arg),*).await,
            ResourceArg::Contacts => $run::<ContactSubmission>($($arg),*).await,
            ResourceArg::Applications => $run::<JobApplication>($($arg),*).await,
            ResourceArg::Hospitals => $run::<HospitalPartner>($($arg),*).await,
            ResourceArg::Referrals => $run::<EmployeeReferral>($($arg),*).await,
        }
    };
}

fn parse_filter_arg(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("filter '{}' is not key=value", raw));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter '{}' has an empty key", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_sort_arg(raw: &str) -> Result<SortSpec, String> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => (field, direction),
        None => (raw, "asc"),
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("sort '{}' has an empty field", raw));
    }
    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => return Err(format!("sort direction '{}' is not asc or desc", other)),
    };
    Ok(SortSpec::new(field, direction))
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn format_row<R: Resource>(row: &R) -> String {
    format!(
        "{:<36} {:<12} {:<40} {}",
        row.id(),
        row.status(),
        row.label(),
        row.created_at().format("%Y-%m-%d")
    )
}

fn fail(action: &str, err: &ApiError) -> ! {
    eprintln!("{} failed: {}", action, err);
    std::process::exit(1);
}

fn build_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if cli.token.is_some() {
        config.token = cli.token.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config
}

async fn run_list<R: Resource>(
    config: Config,
    json: bool,
    search: Option<String>,
    filters: Vec<String>,
    page: u32,
    limit: Option<u32>,
    sort: Option<String>,
) -> anyhow::Result<()> {
    let client = ApiClient::new(&config).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let limit = limit.unwrap_or(config.page_size);
    let mut controller: ListController<R> = ListController::new(limit, config.debounce_window());

    if let Some(search) = search {
        controller.set_search_immediate(search);
    }
    for raw in &filters {
        let (key, value) = parse_filter_arg(raw).map_err(|message| anyhow::anyhow!(message))?;
        controller
            .set_filter(&key, value)
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }
    if let Some(raw) = sort {
        controller.set_sort(parse_sort_arg(&raw).map_err(|message| anyhow::anyhow!(message))?);
    }
    controller.set_page(page);

    let mut session = ListSession::new(client, controller);
    session.run_until_idle().await;

    let controller = session.controller();
    match controller.phase() {
        FetchPhase::Ready => {
            if json {
                println!("{}", serde_json::to_string_pretty(controller.items())?);
            } else {
                for row in controller.items() {
                    println!("{}", format_row(row));
                }
                let page = controller.page();
                println!(
                    "page {} of {} ({} total)",
                    page.current_page, page.total_pages, page.total_items
                );
            }
        }
        FetchPhase::Empty => {
            if json {
                println!("[]");
            } else {
                println!("No results. Try clearing filters or broadening the search.");
            }
        }
        FetchPhase::Unreachable { message } => {
            fail("List", &ApiError::Network(message.clone()));
        }
        FetchPhase::AuthRequired => fail("List", &ApiError::Auth),
        FetchPhase::Rejected { message } => {
            fail("List", &ApiError::Server(message.clone()));
        }
        FetchPhase::Idle | FetchPhase::Loading => {
            anyhow::bail!("list fetch never resolved");
        }
    }
    Ok(())
}

async fn run_bulk_status<R: Resource>(
    config: Config,
    json: bool,
    ids_raw: String,
    status: String,
) -> anyhow::Result<()> {
    let ids = parse_id_list(&ids_raw);
    if ids.is_empty() {
        anyhow::bail!("no IDs given");
    }
    let client = ApiClient::new(&config).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    match client.bulk_update_status(R::BASE_PATH, &ids, &status).await {
        Ok(report) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "requested": report.requested,
                        "succeeded": report.succeeded,
                        "failedIds": report.failed_ids,
                    })
                );
            } else if report.is_full_success() {
                println!("Updated {} {}(s) to '{}'", report.succeeded, R::DISPLAY_NAME, status);
            } else {
                println!(
                    "Updated {} of {}; failed: {}",
                    report.succeeded,
                    report.requested,
                    report.failed_ids.iter().cloned().collect::<Vec<_>>().join(", ")
                );
            }
            if !report.is_full_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(err) => fail("Bulk update", &err),
    }
}

async fn run_set_status<R: Resource>(
    config: Config,
    _json: bool,
    id: String,
    status: String,
    note: Option<String>,
) -> anyhow::Result<()> {
    let client = ApiClient::new(&config).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    match client
        .update_status(R::BASE_PATH, &id, &status, note.as_deref())
        .await
    {
        Ok(()) => {
            println!("Updated {} '{}' to '{}'", R::DISPLAY_NAME, id, status);
            Ok(())
        }
        Err(err) => fail("Status update", &err),
    }
}

fn confirm_delete(display_name: &str, id: &str) -> io::Result<bool> {
    eprint!("Delete {} '{}'? This cannot be undone. [y/N] ", display_name, id);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

async fn run_delete<R: Resource>(
    config: Config,
    _json: bool,
    id: String,
    yes: bool,
) -> anyhow::Result<()> {
    if !yes && !confirm_delete(R::DISPLAY_NAME, &id)? {
        eprintln!("Aborted.");
        std::process::exit(1);
    }
    let client = ApiClient::new(&config).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    match client.delete_one(R::BASE_PATH, &id).await {
        Ok(()) => {
            println!("Deleted {}: {}", R::DISPLAY_NAME, id);
            Ok(())
        }
        Err(err) => fail("Delete", &err),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config = build_config(&cli);
    let json = cli.json;

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled before dispatch"),
        Commands::List {
            resource,
            search,
            filters,
            page,
            limit,
            sort,
        } => {
            with_resource!(
                resource,
                run_list(config, json, search, filters, page, limit, sort)
            )
        }
        Commands::BulkStatus {
            resource,
            ids,
            status,
        } => with_resource!(resource, run_bulk_status(config, json, ids, status)),
        Commands::SetStatus {
            resource,
            id,
            status,
            note,
        } => with_resource!(resource, run_set_status(config, json, id, status, note)),
        Commands::Delete { resource, id, yes } => {
            with_resource!(resource, run_delete(config, json, id, yes))
        }
    }
}
