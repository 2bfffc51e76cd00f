pub mod types;

pub use types::{Attachment, BoardList, Card, CheckItem, Checklist, Color, Label, LabelOutcome};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::TrelloSettings;

/// Trello pages board labels at 50 unless asked for more; 1000 is the cap.
const LABEL_QUERY: &[(&str, &str)] = &[("limit", "1000")];

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Trello API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("No open list named {0:?} on the board")]
    ListNotFound(String),

    #[error("Trello resource not found: {0}")]
    NotFound(String),
}

/// Board-scoped operations on the task tracker. Implementations are bound to
/// one board when constructed.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn open_lists(&self) -> Result<Vec<BoardList>, BoardError>;

    async fn labels(&self) -> Result<Vec<Label>, BoardError>;

    async fn add_label(&self, name: &str, color: Color) -> Result<Label, BoardError>;

    /// Cards in a list, without checklists or attachments.
    async fn list_cards(&self, list: &BoardList) -> Result<Vec<Card>, BoardError>;

    async fn add_card(&self, list: &BoardList, name: &str) -> Result<Card, BoardError>;

    /// Refresh a card from the server, including checklists, attachments and labels.
    async fn fetch_card(&self, card_id: &str) -> Result<Card, BoardError>;

    /// Create a checklist whose items start out unchecked, in the given order.
    async fn add_checklist(
        &self,
        card_id: &str,
        name: &str,
        items: &[String],
    ) -> Result<Checklist, BoardError>;

    async fn add_checklist_item(
        &self,
        checklist_id: &str,
        name: &str,
    ) -> Result<CheckItem, BoardError>;

    async fn attach(&self, card_id: &str, name: &str, url: &str)
        -> Result<Attachment, BoardError>;

    async fn apply_label(&self, card_id: &str, label: &Label) -> LabelOutcome;
}

/// Look up an open list by exact name.
#[instrument(skip(store))]
pub async fn find_list(store: &dyn BoardStore, name: &str) -> Result<BoardList, BoardError> {
    store
        .open_lists()
        .await?
        .into_iter()
        .find(|list| list.name == name)
        .ok_or_else(|| BoardError::ListNotFound(name.to_string()))
}

/// Trello answers 400 with a plain-text body when the label is already on the card.
fn is_already_applied(status: StatusCode, body: &str) -> bool {
    status == StatusCode::BAD_REQUEST && body.to_lowercase().contains("already")
}

pub struct TrelloClient {
    http: reqwest::Client,
    settings: TrelloSettings,
}

impl TrelloClient {
    pub fn new(settings: TrelloSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_url.trim_end_matches('/'), path)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .query(&[
                ("key", self.settings.api_key.as_str()),
                ("token", self.settings.api_token.as_str()),
            ])
            .query(query)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.request(method, path, query).send().await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BoardError> {
        let response = self.send(method, path, query).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BoardError::NotFound(path.to_string()));
        }
        Ok(response.error_for_status()?.json::<T>().await?)
    }
}

#[async_trait]
impl BoardStore for TrelloClient {
    #[instrument(skip(self), fields(board = %self.settings.board_id))]
    async fn open_lists(&self) -> Result<Vec<BoardList>, BoardError> {
        let path = format!("/boards/{}/lists", self.settings.board_id);
        self.call(Method::GET, &path, &[("filter", "open")]).await
    }

    #[instrument(skip(self), fields(board = %self.settings.board_id))]
    async fn labels(&self) -> Result<Vec<Label>, BoardError> {
        let path = format!("/boards/{}/labels", self.settings.board_id);
        self.call(Method::GET, &path, LABEL_QUERY).await
    }

    #[instrument(skip(self), fields(board = %self.settings.board_id))]
    async fn add_label(&self, name: &str, color: Color) -> Result<Label, BoardError> {
        self.call(
            Method::POST,
            "/labels",
            &[
                ("name", name),
                ("color", color.as_str()),
                ("idBoard", self.settings.board_id.as_str()),
            ],
        )
        .await
    }

    #[instrument(skip(self, list), fields(list = %list.name))]
    async fn list_cards(&self, list: &BoardList) -> Result<Vec<Card>, BoardError> {
        let path = format!("/lists/{}/cards", list.id);
        self.call(Method::GET, &path, &[]).await
    }

    #[instrument(skip(self, list), fields(list = %list.name))]
    async fn add_card(&self, list: &BoardList, name: &str) -> Result<Card, BoardError> {
        self.call(
            Method::POST,
            "/cards",
            &[("idList", list.id.as_str()), ("name", name)],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_card(&self, card_id: &str) -> Result<Card, BoardError> {
        let path = format!("/cards/{card_id}");
        self.call(
            Method::GET,
            &path,
            &[("checklists", "all"), ("attachments", "true")],
        )
        .await
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn add_checklist(
        &self,
        card_id: &str,
        name: &str,
        items: &[String],
    ) -> Result<Checklist, BoardError> {
        let path = format!("/cards/{card_id}/checklists");
        let mut checklist: Checklist = self.call(Method::POST, &path, &[("name", name)]).await?;
        for item in items {
            let added = self.add_checklist_item(&checklist.id, item).await?;
            checklist.items.push(added);
        }
        Ok(checklist)
    }

    #[instrument(skip(self))]
    async fn add_checklist_item(
        &self,
        checklist_id: &str,
        name: &str,
    ) -> Result<CheckItem, BoardError> {
        let path = format!("/checklists/{checklist_id}/checkItems");
        self.call(
            Method::POST,
            &path,
            &[("name", name), ("checked", "false")],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn attach(
        &self,
        card_id: &str,
        name: &str,
        url: &str,
    ) -> Result<Attachment, BoardError> {
        let path = format!("/cards/{card_id}/attachments");
        self.call(Method::POST, &path, &[("name", name), ("url", url)])
            .await
    }

    #[instrument(skip(self, label), fields(label = %label.name))]
    async fn apply_label(&self, card_id: &str, label: &Label) -> LabelOutcome {
        let path = format!("/cards/{card_id}/idLabels");
        let response = match self
            .send(Method::POST, &path, &[("value", label.id.as_str())])
            .await
        {
            Ok(response) => response,
            Err(err) => return LabelOutcome::Failed(err.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            debug!("label applied");
            return LabelOutcome::Applied;
        }
        let body = response.text().await.unwrap_or_default();
        if is_already_applied(status, &body) {
            debug!("label already on card");
            LabelOutcome::AlreadyApplied
        } else {
            warn!(%status, body = %body, "label could not be applied");
            LabelOutcome::Failed(format!("{status}: {body}"))
        }
    }
}
