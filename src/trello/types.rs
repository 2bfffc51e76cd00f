use serde::Deserialize;

/// Label colors a new repository label is drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Blue,
    Sky,
    Lime,
    Pink,
    Black,
}

impl Color {
    pub const PALETTE: [Color; 10] = [
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Red,
        Color::Purple,
        Color::Blue,
        Color::Sky,
        Color::Lime,
        Color::Pink,
        Color::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Red => "red",
            Color::Purple => "purple",
            Color::Blue => "blue",
            Color::Sky => "sky",
            Color::Lime => "lime",
            Color::Pink => "pink",
            Color::Black => "black",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Kept as text: boards can hold colors outside the palette, or none at all.
    #[allow(dead_code)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[allow(dead_code)] // id and name are returned by the API but only url drives reconciliation
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Complete,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckItem {
    pub id: String,
    pub name: String,
    pub state: CheckState,
}

impl CheckItem {
    pub fn checked(&self) -> bool {
        self.state == CheckState::Complete
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Checklist {
    pub id: String,
    pub name: String,
    #[serde(rename = "checkItems", default)]
    pub items: Vec<CheckItem>,
}

/// A card as returned by GET /cards/{id} with checklists and attachments expanded.
/// Cards listed from a list carry no checklists or attachments; call
/// `BoardStore::fetch_card` for the full state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(rename = "idList")]
    pub list_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
}

/// Result of putting a label on a card. Only `AlreadyApplied` is a
/// recoverable non-success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    Applied,
    AlreadyApplied,
    Failed(String),
}
