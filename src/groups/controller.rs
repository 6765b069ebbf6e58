//! Display-independent state and flows behind the groups page.
//!
//! The widgets in `crate::ui` own no state of their own beyond what GTK needs;
//! everything they show comes from [`GroupList`] and [`GroupEditor`], and every
//! network round trip goes through a [`GroupsApi`].

use thiserror::Error;

use crate::api::client::GroupsApi;
use crate::api::models::{Group, GroupPayload, GroupSummaries, GroupSummary, Target};
use crate::error::ApiError;
use crate::groups::markup::escape;
use crate::groups::targets::TargetRowStore;
use crate::groups::template::is_importable;

pub const LIST_FETCH_ERROR: &str = "Error fetching groups";
pub const GROUP_FETCH_ERROR: &str = "Error fetching group";
pub const UNSUPPORTED_EXTENSION: &str = "Unsupported file extension (use .csv or .txt)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    New,
    Existing(i64),
}

impl EditMode {
    pub fn title(&self) -> &'static str {
        match self {
            EditMode::New => "New Group",
            EditMode::Existing(_) => "Edit Group",
        }
    }
}

/// One line of the summary table, text already escaped for markup.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub name: String,
    pub num_targets: String,
    pub modified: String,
    pub group: GroupSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Empty,
    Groups(Vec<GroupRow>),
}

/// The summaries from the last successful list load.
#[derive(Debug, Default)]
pub struct GroupList {
    groups: Vec<GroupSummary>,
}

impl GroupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded groups and returns what the table should show.
    pub fn apply(&mut self, summaries: GroupSummaries) -> ListState {
        if summaries.total <= 0 {
            self.groups.clear();
            return ListState::Empty;
        }
        self.groups = summaries.groups;
        ListState::Groups(
            self.groups
                .iter()
                .map(|g| GroupRow {
                    name: escape(&g.name),
                    num_targets: g.num_targets.to_string(),
                    modified: crate::utils::format_modified_date(g.modified_date.as_ref()),
                    group: g.clone(),
                })
                .collect(),
        )
    }

    pub fn find(&self, id: i64) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn reset(&mut self) {
        self.groups.clear();
    }
}

/// Identifies one opening of the edit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTicket(u64);

/// State of the edit dialog. Each [`open`](GroupEditor::open) starts a new
/// generation; fetch results carrying an older ticket are dropped.
#[derive(Debug)]
pub struct GroupEditor {
    generation: u64,
    mode: EditMode,
    name: String,
    targets: TargetRowStore,
    // An existing group must be fetched before saving, or the update wipes its targets.
    ready: bool,
}

impl Default for GroupEditor {
    fn default() -> Self {
        Self {
            generation: 0,
            mode: EditMode::New,
            name: String::new(),
            targets: TargetRowStore::new(),
            ready: true,
        }
    }
}

impl GroupEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, mode: EditMode) -> EditTicket {
        self.dismiss();
        self.mode = mode;
        self.ready = matches!(mode, EditMode::New);
        EditTicket(self.generation)
    }

    pub fn is_current(&self, ticket: EditTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Fills the dialog from a fetched group. Returns false for a stale ticket.
    pub fn apply_loaded(&mut self, ticket: EditTicket, group: &Group) -> bool {
        if !self.is_current(ticket) {
            log::debug!("Dropping stale fetch of group {}", group.id);
            return false;
        }
        self.name = group.name.clone();
        self.targets.load(&group.targets);
        self.ready = true;
        true
    }

    pub fn can_save(&self) -> bool {
        self.ready
    }

    /// Clears everything so the next open starts empty.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.name.clear();
        self.targets.clear();
        self.ready = false;
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn targets(&self) -> &TargetRowStore {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetRowStore {
        &mut self.targets
    }

    pub fn payload(&self) -> GroupPayload {
        GroupPayload {
            id: match self.mode {
                EditMode::New => None,
                EditMode::Existing(id) => Some(id),
            },
            name: self.name.clone(),
            targets: self.targets.to_targets(),
        }
    }
}

#[derive(Debug)]
pub enum SaveOutcome {
    Created(Group),
    Updated(Group),
}

impl SaveOutcome {
    pub fn success_message(&self) -> &'static str {
        match self {
            SaveOutcome::Created(_) => "Group added successfully!",
            SaveOutcome::Updated(_) => "Group updated successfully!",
        }
    }
}

/// Creates or updates depending on `mode`.
pub async fn save_group(api: &dyn GroupsApi, mode: EditMode, payload: GroupPayload) -> Result<SaveOutcome, ApiError> {
    match mode {
        EditMode::New => {
            let payload = GroupPayload { id: None, ..payload };
            let group = api.create_group(&payload).await?;
            log::info!("Created group {} ({})", group.id, group.name);
            Ok(SaveOutcome::Created(group))
        }
        EditMode::Existing(id) => {
            let payload = GroupPayload { id: Some(id), ..payload };
            let group = api.update_group(id, &payload).await?;
            log::info!("Updated group {} ({})", id, payload.name);
            Ok(SaveOutcome::Updated(group))
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file extension (use .csv or .txt)")]
    UnsupportedExtension,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ImportError {
    pub fn user_message(&self) -> String {
        match self {
            ImportError::UnsupportedExtension => UNSUPPORTED_EXTENSION.to_string(),
            ImportError::Api(e) => e.user_message(),
        }
    }
}

pub fn check_import_file(file_name: &str) -> Result<(), ImportError> {
    if is_importable(file_name) { Ok(()) } else { Err(ImportError::UnsupportedExtension) }
}

/// Uploads a CSV and returns the parsed targets; rejected files never reach the server.
pub async fn import_targets(api: &dyn GroupsApi, file_name: &str, contents: Vec<u8>) -> Result<Vec<Target>, ImportError> {
    check_import_file(file_name)?;
    let targets = api.import_group(file_name, contents).await?;
    log::info!("Imported {} targets from {}", targets.len(), file_name);
    Ok(targets)
}

/// Text of the delete confirmation for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: i64,
    pub heading: String,
    pub body: String,
    pub confirm_label: String,
}

pub const DELETED_HEADING: &str = "Group Deleted!";
pub const DELETED_BODY: &str = "This group has been deleted!";

impl DeletePrompt {
    /// `None` when the group is no longer in the loaded list.
    pub fn for_group(list: &GroupList, group: &GroupSummary) -> Option<Self> {
        list.find(group.id)?;
        Some(Self {
            id: group.id,
            heading: "Are you sure?".into(),
            body: "This will delete the group. This can't be undone!".into(),
            confirm_label: format!("Delete {}", group.name),
        })
    }
}

/// What the page has to do once a delete went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterDelete {
    ReloadPage,
}

pub async fn confirm_delete(api: &dyn GroupsApi, prompt: &DeletePrompt) -> Result<AfterDelete, ApiError> {
    api.delete_group(prompt.id).await?;
    log::info!("Deleted group {}", prompt.id);
    Ok(AfterDelete::ReloadPage)
}
