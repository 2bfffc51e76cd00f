pub mod urls;

pub use urls::extract_urls;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::TrelloSettings;
use crate::github::{self, GitHubError, PullRequest};
use crate::trello::{self, BoardError, BoardStore, Card, Checklist, Color, Label, LabelOutcome};

/// Name of the checklist URLs are collected into.
pub const CHECKLIST_NAME: &str = "commits";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Failed to apply label to card {card}: {reason}")]
    LabelNotApplied { card: String, reason: String },
}

/// Card title for a pull request, e.g. "Pull Request 1 - my_repo".
pub fn card_name(number: u64, label_name: &str) -> String {
    format!("Pull Request {number} - {label_name}")
}

/// Uniform pick from `palette`. An empty palette yields the default color.
pub fn pick_color<R: Rng + ?Sized>(palette: &[Color], rng: &mut R) -> Color {
    palette.choose(rng).copied().unwrap_or_default()
}

/// Add every URL the checklist does not already name, unchecked.
/// Existing items are never touched. Returns how many items were added.
#[instrument(skip(store, checklist, urls), fields(checklist = %checklist.name))]
pub async fn merge_checklist(
    store: &dyn BoardStore,
    checklist: &Checklist,
    urls: &HashSet<String>,
) -> Result<usize, BoardError> {
    let existing: HashSet<&str> = checklist.items.iter().map(|item| item.name.as_str()).collect();
    let mut missing: Vec<&String> = urls
        .iter()
        .filter(|url| !existing.contains(url.as_str()))
        .collect();
    missing.sort();

    for url in &missing {
        store.add_checklist_item(&checklist.id, url).await?;
    }
    debug!(added = missing.len(), kept = existing.len(), "merged checklist");
    Ok(missing.len())
}

/// Brings one Trello card in line with one pull request.
///
/// Every step looks up by name before creating, so running it again for the
/// same pull request converges on the same card, label and checklist items.
/// Overlapping runs are not coordinated and can still duplicate.
pub struct Reconciler<'a> {
    store: &'a dyn BoardStore,
    settings: &'a TrelloSettings,
    rng: StdRng,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn BoardStore, settings: &'a TrelloSettings) -> Self {
        Self::with_rng(store, settings, StdRng::from_entropy())
    }

    pub fn with_rng(store: &'a dyn BoardStore, settings: &'a TrelloSettings, rng: StdRng) -> Self {
        Self {
            store,
            settings,
            rng,
        }
    }

    /// Board label named after the pull request's repository, created with a
    /// random palette color the first time that repository is seen.
    #[instrument(skip(self, pull), fields(pr = pull.number))]
    pub async fn get_or_create_label(&mut self, pull: &PullRequest) -> Result<Label, ReconcileError> {
        let name = github::repository_name(&pull.url)?;

        if let Some(label) = self
            .store
            .labels()
            .await?
            .into_iter()
            .find(|label| label.name == name)
        {
            debug!(label = %label.name, "reusing existing label");
            return Ok(label);
        }

        let color = pick_color(&Color::PALETTE, &mut self.rng);
        info!(label = %name, %color, "creating label");
        Ok(self.store.add_label(&name, color).await?)
    }

    /// Find or create the pull request's card, then bring its checklist,
    /// attachment and label up to date. Returns the card as the board now has it.
    #[instrument(skip(self, pull), fields(pr = pull.number))]
    pub async fn reconcile(&mut self, pull: &PullRequest) -> Result<Card, ReconcileError> {
        let label = self.get_or_create_label(pull).await?;
        let urls = extract_urls(pull);
        let name = card_name(pull.number, &label.name);
        debug!(card = %name, urls = urls.len(), "reconciling card");

        let list = trello::find_list(self.store, &self.settings.list_name).await?;
        let existing = self
            .store
            .list_cards(&list)
            .await?
            .into_iter()
            .find(|card| card.name == name);

        let card = match existing {
            None => {
                info!(card = %name, list = %list.name, "creating card");
                let card = self.store.add_card(&list, &name).await?;
                self.add_url_checklist(&card, &urls).await?;
                card
            }
            Some(listed) => {
                let card = self.store.fetch_card(&listed.id).await?;
                if card.checklists.is_empty() {
                    self.add_url_checklist(&card, &urls).await?;
                }
                for checklist in &card.checklists {
                    merge_checklist(self.store, checklist, &urls).await?;
                }
                card
            }
        };

        if card
            .attachments
            .iter()
            .any(|a| a.name == name || a.url == pull.html_url)
        {
            debug!("pull request already attached");
        } else {
            self.store.attach(&card.id, &name, &pull.html_url).await?;
        }

        if !card.labels.iter().any(|l| l.id == label.id) {
            match self.store.apply_label(&card.id, &label).await {
                LabelOutcome::Applied | LabelOutcome::AlreadyApplied => {}
                LabelOutcome::Failed(reason) => {
                    return Err(ReconcileError::LabelNotApplied { card: name, reason });
                }
            }
        }

        Ok(self.store.fetch_card(&card.id).await?)
    }

    async fn add_url_checklist(
        &self,
        card: &Card,
        urls: &HashSet<String>,
    ) -> Result<Checklist, BoardError> {
        let mut items: Vec<String> = urls.iter().cloned().collect();
        items.sort();
        self.store.add_checklist(&card.id, CHECKLIST_NAME, &items).await
    }
}
