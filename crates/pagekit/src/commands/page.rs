//! `pagekit page` command implementations.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use pagekit_config::CliSettings;
use pagekit_confluence::repository::PageRepository;
use pagekit_confluence::types::Page;
use pagekit_confluence::updater::{DryRunResult, PageUpdater, UpdateOutcome, UpdateRequest};
use pagekit_confluence::{ConfluenceClient, NewPage};
use tokio::runtime::Runtime;

use super::{ConnectionArgs, client_from_config, retry_config};
use crate::error::CliError;
use crate::output::Output;

/// Page commands.
#[derive(Subcommand)]
pub(crate) enum PageCommand {
    /// Show a page.
    Get(GetArgs),
    /// Create a page.
    Create(CreateArgs),
    /// Update a page, retrying on version conflicts.
    Update(UpdateArgs),
    /// Move a page to the trash.
    Delete(DeleteArgs),
}

impl PageCommand {
    /// Execute the page subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Get(args) => args.execute(),
            Self::Create(args) => args.execute(),
            Self::Update(args) => args.execute(),
            Self::Delete(args) => args.execute(),
        }
    }
}

/// Arguments for `page get`.
#[derive(Args)]
pub(crate) struct GetArgs {
    /// Page ID.
    page_id: String,

    /// Print the storage-format body after the summary.
    #[arg(long)]
    body: bool,

    /// Print the raw page as JSON.
    #[arg(long, conflicts_with = "body")]
    json: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl GetArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let client = self.connection.connect()?;
        let page = client.get_page(&self.page_id, &["body.storage", "version", "space"])?;

        if self.json {
            output.data(&serde_json::to_string_pretty(&page)?);
            return Ok(());
        }

        print_page(&output, &client, &page);
        if self.body {
            output.data("");
            output.data(page.content());
        }
        Ok(())
    }
}

/// Arguments for `page create`.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Space key to create the page in.
    #[arg(short, long)]
    space: String,

    /// Page title.
    #[arg(short, long)]
    title: String,

    /// File with the body in Confluence storage format.
    #[arg(long)]
    content_file: PathBuf,

    /// Parent page ID.
    #[arg(long)]
    parent: Option<String>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl CreateArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let client = self.connection.connect()?;
        let body = std::fs::read_to_string(&self.content_file)?;

        let page = client.create_page(&NewPage {
            space_key: &self.space,
            title: &self.title,
            body: &body,
            parent_id: self.parent.as_deref(),
        })?;

        output.success("Page created.");
        print_page(&output, &client, &page);
        Ok(())
    }
}

/// Arguments for `page update`.
#[derive(Args)]
pub(crate) struct UpdateArgs {
    /// Page ID.
    page_id: String,

    /// Version the update is based on (the version you last read).
    #[arg(long = "version", value_name = "N")]
    expected_version: u32,

    /// New title.
    #[arg(short, long)]
    title: Option<String>,

    /// File with the new body in Confluence storage format.
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// New status (e.g. "current", "draft").
    #[arg(long)]
    status: Option<String>,

    /// Version message for the update.
    #[arg(short, long)]
    message: Option<String>,

    /// Maximum attempts on version conflicts (overrides config).
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Backoff unit in milliseconds (overrides config).
    #[arg(long)]
    base_delay_ms: Option<u64>,

    /// Abandon the update after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Preview changes without updating Confluence.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl UpdateArgs {
    /// Execute the update command.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or the update fails.
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.connection.load_config(CliSettings {
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            ..Default::default()
        })?;
        let client = client_from_config(&config)?;
        let request = self.build_request()?;

        let runtime = Runtime::new()?;
        let updater = PageUpdater::new(&client, retry_config(&config));

        if self.dry_run {
            let result = runtime.block_on(updater.dry_run(&request))?;
            print_dry_run_result(&output, &result);
            return Ok(());
        }

        let limit = self.timeout.map(Duration::from_secs);
        let outcome = run_update(runtime, &updater, &request, limit)?;
        print_update_result(&output, &client, &outcome);
        Ok(())
    }

    fn build_request(&self) -> Result<UpdateRequest, CliError> {
        if self.title.is_none() && self.content_file.is_none() && self.status.is_none() {
            return Err(CliError::Validation(
                "nothing to update: pass --title, --content-file or --status".to_owned(),
            ));
        }

        let mut request = UpdateRequest::new(self.page_id.as_str(), self.expected_version)?;
        if let Some(title) = &self.title {
            request = request.with_title(title.as_str());
        }
        if let Some(path) = &self.content_file {
            request = request.with_content(std::fs::read_to_string(path)?);
        }
        if let Some(status) = &self.status {
            request = request.with_status(status.as_str());
        }
        if let Some(message) = &self.message {
            request = request.with_version_message(message.as_str());
        }
        Ok(request)
    }
}

/// Run `update` on `runtime`, giving up after `limit`.
///
/// Requests run on tokio's blocking pool and cannot be interrupted, so on
/// timeout the runtime is shut down in the background instead of waiting
/// for an in-flight request to return.
fn run_update<R: PageRepository>(
    runtime: Runtime,
    updater: &PageUpdater<'_, R>,
    request: &UpdateRequest,
    limit: Option<Duration>,
) -> Result<UpdateOutcome, CliError> {
    let Some(limit) = limit else {
        return Ok(runtime.block_on(updater.update(request))?);
    };

    let result =
        runtime.block_on(async { tokio::time::timeout(limit, updater.update(request)).await });
    match result {
        Ok(outcome) => Ok(outcome?),
        Err(_) => {
            runtime.shutdown_background();
            Err(CliError::Timeout(limit))
        }
    }
}

/// Arguments for `page delete`.
#[derive(Args)]
pub(crate) struct DeleteArgs {
    /// Page ID.
    page_id: String,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl DeleteArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let client = self.connection.connect()?;
        client.delete_page(&self.page_id)?;
        output.success(&format!("Page {} moved to trash.", self.page_id));
        Ok(())
    }
}

fn print_page(output: &Output, client: &ConfluenceClient, page: &Page) {
    output.data(&format!("ID: {}", page.id));
    output.data(&format!("Title: {}", page.title));
    if let Some(space_key) = page.space_key() {
        output.data(&format!("Space: {space_key}"));
    }
    output.data(&format!("Status: {}", page.status));
    output.data(&format!("Version: {}", page.version.number));
    output.data(&format!("URL: {}", client.web_url(page)));
}

fn print_dry_run_result(output: &Output, result: &DryRunResult) {
    output.highlight("\n[DRY RUN] No changes made.");
    output.info(&format!(
        "Current page: \"{}\" (v{})",
        result.current_title, result.current_version
    ));

    if result.is_stale() {
        output.warning(&format!(
            "Expected version {} is stale; the update would be rebased onto v{}.",
            result.expected_version, result.current_version
        ));
    }

    if result.changes.is_empty() {
        output.success("\nNo field changes.");
    } else {
        output.info(&format!("\nChanges ({}):", result.changes.len()));
        for change in &result.changes {
            output.info(&format!("  - {change}"));
        }
    }
}

fn print_update_result(output: &Output, client: &ConfluenceClient, outcome: &UpdateOutcome) {
    output.success(&format!("\n{}", outcome.message));
    output.info(&format!("ID: {}", outcome.page.id));
    output.info(&format!(
        "Version: {} -> {}",
        outcome.previous_version, outcome.current_version
    ));
    output.info(&format!("URL: {}", client.web_url(&outcome.page)));

    if outcome.attempts > 1 {
        output.warning(&format!(
            "Resolved {} version conflict(s) before the update applied.",
            outcome.attempts - 1
        ));
    }
    for change in &outcome.changes {
        output.info(&format!("  - {change}"));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    use clap::Parser;
    use pagekit_confluence::ConfluenceError;
    use pagekit_confluence::repository::{MockRepository, fixture_page};
    use pagekit_confluence::updater::{RetryConfig, UpdatePayload};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Repository whose submit occupies a blocking-pool thread, like
    /// `ConfluenceClient` waiting on a slow server.
    struct SlowSubmitRepository {
        page: Page,
        delay: Duration,
        applied: Arc<AtomicBool>,
    }

    impl PageRepository for SlowSubmitRepository {
        async fn fetch_page(&self, _page_id: &str) -> Result<Page, ConfluenceError> {
            Ok(self.page.clone())
        }

        async fn submit_update(
            &self,
            _page_id: &str,
            _payload: &UpdatePayload,
        ) -> Result<Page, ConfluenceError> {
            let delay = self.delay;
            let applied = Arc::clone(&self.applied);
            let mut page = self.page.clone();
            tokio::task::spawn_blocking(move || {
                std::thread::sleep(delay);
                applied.store(true, Ordering::SeqCst);
                page.version.number += 1;
                page
            })
            .await
            .map_err(ConfluenceError::from)
        }

        async fn find_page_by_title(
            &self,
            _space_key: &str,
            _title: &str,
        ) -> Result<Option<Page>, ConfluenceError> {
            Ok(None)
        }
    }

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: PageCommand,
    }

    fn parse_update(args: &[&str]) -> UpdateArgs {
        let cli = TestCli::try_parse_from(["pagekit"].iter().chain(args)).unwrap();
        match cli.command {
            PageCommand::Update(args) => args,
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_update_builds_request() {
        let args = parse_update(&[
            "update", "42", "--version", "3", "--title", "Runbook v2", "--status", "draft", "-m",
            "tidy",
        ]);

        let request = args.build_request().unwrap();

        assert_eq!(request.page_id(), "42");
        assert_eq!(request.expected_version(), 3);
        assert_eq!(request.title(), Some("Runbook v2"));
        assert_eq!(request.status(), Some("draft"));
        assert_eq!(request.content(), None);
        assert_eq!(request.version_message(), Some("tidy"));
    }

    #[test]
    fn test_update_without_fields_is_rejected() {
        let args = parse_update(&["update", "42", "--version", "3"]);
        assert!(matches!(args.build_request(), Err(CliError::Validation(_))));
    }

    #[test]
    fn test_update_version_zero_is_rejected() {
        let args = parse_update(&["update", "42", "--version", "0", "--title", "x"]);
        assert!(matches!(args.build_request(), Err(CliError::Update(_))));
    }

    #[test]
    fn test_update_requires_version() {
        assert!(TestCli::try_parse_from(["pagekit", "update", "42", "--title", "x"]).is_err());
    }

    #[test]
    fn test_timeout_returns_without_waiting_for_in_flight_request() {
        let repo = SlowSubmitRepository {
            page: fixture_page("42", "OPS", "Runbook", 1),
            delay: Duration::from_millis(1500),
            applied: Arc::new(AtomicBool::new(false)),
        };
        let updater = PageUpdater::new(&repo, RetryConfig::default());
        let request = UpdateRequest::new("42", 1).unwrap().with_title("Runbook v2");

        let started = Instant::now();
        let result = run_update(
            Runtime::new().unwrap(),
            &updater,
            &request,
            Some(Duration::from_millis(100)),
        );
        let elapsed = started.elapsed();

        let err = result.unwrap_err();
        assert!(matches!(err, CliError::Timeout(limit) if limit == Duration::from_millis(100)));
        assert!(elapsed < Duration::from_millis(1000), "took {elapsed:?}");
        assert!(!repo.applied.load(Ordering::SeqCst));
        assert!(err.to_string().contains("re-fetch the page"));
    }

    #[test]
    fn test_run_update_within_limit_returns_outcome() {
        let repo = MockRepository::new().with_page(fixture_page("42", "OPS", "Runbook", 1));
        let updater = PageUpdater::new(&repo, RetryConfig::default());
        let request = UpdateRequest::new("42", 1).unwrap().with_status("draft");

        let outcome = run_update(
            Runtime::new().unwrap(),
            &updater,
            &request,
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        assert_eq!(outcome.previous_version, 1);
        assert_eq!(outcome.current_version, 2);
    }

    #[test]
    fn test_run_update_propagates_update_errors() {
        let repo = MockRepository::new();
        let updater = PageUpdater::new(&repo, RetryConfig::default());
        let request = UpdateRequest::new("42", 1).unwrap().with_status("draft");

        let err = run_update(Runtime::new().unwrap(), &updater, &request, None).unwrap_err();

        assert!(matches!(err, CliError::Update(_)));
    }
}
