mod config;
mod github;
mod reconcile;
mod trello;

use clap::Parser;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use github::PullRequestSource;

/// gitrello — mirror a GitHub Pull Request onto a Trello card: one card per PR,
/// labelled with the repository name, with a checklist of every URL referenced
/// in the PR's commits and commit comments.
#[derive(Parser, Debug)]
#[command(name = "gitrello", version, about)]
struct Cli {
    /// Pull request number
    #[arg(long = "pr-id", alias = "pr_id")]
    pr_id: u64,

    /// Repository name (owned by or shared with the authenticated user)
    #[arg(long)]
    repo: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let span = info_span!("gitrello", repo = %cli.repo, pr = cli.pr_id);
    run(cli).instrument(span).await
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("loading configuration");
    let config = config::Config::load()?;
    let trello_settings = config.trello_settings()?;

    let hosting = github::GitHubClient::new(&config)?;
    let repo = github::find_repository(&hosting, &cli.repo).await?;
    debug!(full_name = %repo.full_name, "resolved repository");

    info!("fetching pull request from GitHub");
    let pull = hosting.pull_request(&repo, cli.pr_id).await?;
    info!(commits = pull.commits.len(), "fetched pull request");

    let board = trello::TrelloClient::new(trello_settings.clone());
    let mut reconciler = reconcile::Reconciler::new(&board, &trello_settings);
    let card = reconciler.reconcile(&pull).await?;

    let items: usize = card.checklists.iter().map(|c| c.items.len()).sum();
    info!(card = %card.name, url = %card.url, checklist_items = items, "done");

    Ok(())
}
