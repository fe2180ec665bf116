//! The workspace aggregate: per-owner collection of shared folder and
//! form references plus a set of (user, permission) grants. This is
//! the one stateful part of the system — upserts merge rather than
//! replace, and every merge is idempotent so a retried request
//! converges to the same state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::model::{Folder, Form, UserSummary};
use crate::store::Store;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Edit => "edit",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Permission::View),
            "edit" => Ok(Permission::Edit),
            _ => Err(CoreError::InvalidArgument(
                "Invalid mode. Mode must be 'view' or 'edit'.".to_string(),
            )),
        }
    }
}

/// How the owner last shared the workspace.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShareOrigin {
    Link,
    Email,
}

impl FromStr for ShareOrigin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(ShareOrigin::Link),
            "email" => Ok(ShareOrigin::Email),
            _ => Err(CoreError::InvalidArgument(
                "Invalid sharedBy value. It must be either \"link\" or \"email\".".to_string(),
            )),
        }
    }
}

/// One user's access level to a workspace. At most one grant per user.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grant {
    pub user: Uuid,
    pub permission: Permission,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub owner: Uuid,
    #[serde(default)]
    pub folders: Vec<Uuid>,
    #[serde(default)]
    pub forms: Vec<Uuid>,
    #[serde(default)]
    pub shared_with: Vec<Grant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<ShareOrigin>,
}

impl Workspace {
    pub fn new(owner: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            owner,
            folders: Vec::new(),
            forms: Vec::new(),
            shared_with: Vec::new(),
            shared_by: None,
        }
    }

    /// Set-union keyed by structural `Uuid` equality; existing order is
    /// kept, repeated merges are no-ops.
    fn merge_refs(existing: &mut Vec<Uuid>, incoming: &[Uuid]) {
        let mut seen: HashSet<Uuid> = existing.iter().copied().collect();
        for id in incoming {
            if seen.insert(*id) {
                existing.push(*id);
            }
        }
    }

    /// Replace the user's grant if present, append otherwise. Grants
    /// for other users are untouched.
    pub fn upsert_grant(&mut self, grant: Grant) {
        match self.shared_with.iter_mut().find(|g| g.user == grant.user) {
            Some(existing) => existing.permission = grant.permission,
            None => self.shared_with.push(grant),
        }
    }

    pub fn grant_for(&self, user: Uuid) -> Option<&Grant> {
        self.shared_with.iter().find(|g| g.user == user)
    }

    /// Prune `item` from whichever reference set holds it. Returns
    /// false when it is in neither.
    pub fn remove_ref(&mut self, item: Uuid) -> bool {
        let before = self.folders.len() + self.forms.len();
        self.folders.retain(|id| *id != item);
        self.forms.retain(|id| *id != item);
        self.folders.len() + self.forms.len() < before
    }
}

/// A share target as supplied by the caller: resolved to a user id
/// during upsert validation.
#[derive(Clone, Debug)]
pub struct ShareTarget {
    pub email: String,
    pub permission: Permission,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertStatus {
    Created,
    Updated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantStatus {
    Granted,
    Updated,
    Already,
}

/// Create-or-merge the owner's single workspace.
///
/// Validation runs before any write: the owner must resolve to a user,
/// and every share-target email must resolve. Folder and form
/// references are accepted without an existence check — dangling
/// references are tolerated. On merge, folder/form sets take the
/// set-union and incoming grants are superimposed per user.
pub fn upsert_workspace(
    store: &mut Store,
    owner: Uuid,
    folders: &[Uuid],
    forms: &[Uuid],
    shared_by: Option<ShareOrigin>,
    share_targets: &[ShareTarget],
) -> CoreResult<(UpsertStatus, Workspace)> {
    let owner_name = store
        .user(owner)
        .map(|u| u.name.clone())
        .ok_or_else(|| CoreError::NotFound("Owner not found.".to_string()))?;

    let mut resolved = Vec::with_capacity(share_targets.len());
    for target in share_targets {
        let user = store.user_by_email(&target.email).ok_or_else(|| {
            CoreError::NotFound(format!("User with email {} not found.", target.email))
        })?;
        if user.id == owner {
            return Err(CoreError::InvalidArgument(
                "You cannot share the workspace with yourself.".to_string(),
            ));
        }
        resolved.push(Grant {
            user: user.id,
            permission: target.permission,
        });
    }

    let (status, mut workspace) = match store.workspace_by_owner(owner) {
        Some(existing) => (UpsertStatus::Updated, existing.clone()),
        None => (UpsertStatus::Created, Workspace::new(owner, owner_name)),
    };

    Workspace::merge_refs(&mut workspace.folders, folders);
    Workspace::merge_refs(&mut workspace.forms, forms);
    if shared_by.is_some() {
        workspace.shared_by = shared_by;
    }
    for grant in resolved {
        workspace.upsert_grant(grant);
    }

    store.put_workspace(workspace.clone())?;
    Ok((status, workspace))
}

/// Grant or update the requester's own access to a workspace.
///
/// Absent -> granted, different mode -> updated, same mode -> already
/// (no write). A requester who owns the workspace is rejected before
/// any state transition.
pub fn grant_share(
    store: &mut Store,
    workspace_id: Uuid,
    requester: Uuid,
    mode: Permission,
) -> CoreResult<(GrantStatus, Workspace)> {
    let mut workspace = store
        .workspace(workspace_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Workspace not found.".to_string()))?;

    if workspace.owner == requester {
        return Err(CoreError::InvalidArgument(
            "You cannot share the workspace with yourself.".to_string(),
        ));
    }

    let status = match workspace.grant_for(requester) {
        Some(grant) if grant.permission == mode => return Ok((GrantStatus::Already, workspace)),
        Some(_) => GrantStatus::Updated,
        None => GrantStatus::Granted,
    };
    workspace.upsert_grant(Grant {
        user: requester,
        permission: mode,
    });
    store.put_workspace(workspace.clone())?;
    Ok((status, workspace))
}

/// Remove an item reference from the owner's workspace. The underlying
/// folder/form document is untouched.
pub fn remove_item(store: &mut Store, owner: Uuid, item: Uuid) -> CoreResult<Workspace> {
    let mut workspace = store
        .workspace_by_owner(owner)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Workspace not found.".to_string()))?;
    if !workspace.remove_ref(item) {
        return Err(CoreError::NotFound(
            "Item not found in workspace.".to_string(),
        ));
    }
    store.put_workspace(workspace.clone())?;
    Ok(workspace)
}

/// Deterministic shareable locator for a workspace; no state mutation.
pub fn shareable_link(frontend_url: &str, workspace_id: Uuid, mode: Permission) -> String {
    format!("{frontend_url}/share/dashboard/{workspace_id}?mode={mode}")
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedGrant {
    pub user: UserSummary,
    pub permission: Permission,
}

/// A workspace with its references resolved to full records. Dangling
/// references are skipped rather than surfaced.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub id: Uuid,
    pub name: String,
    pub owner: Uuid,
    pub folders: Vec<Folder>,
    pub forms: Vec<Form>,
    pub shared_with: Vec<ResolvedGrant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<ShareOrigin>,
}

/// Every workspace in which the user appears in the grant set.
pub fn workspaces_for_user(store: &Store, user: Uuid) -> Vec<WorkspaceView> {
    store
        .workspaces_shared_with(user)
        .into_iter()
        .map(|workspace| resolve(store, workspace))
        .collect()
}

fn resolve(store: &Store, workspace: Workspace) -> WorkspaceView {
    let folders = workspace
        .folders
        .iter()
        .filter_map(|id| store.folder(*id).cloned())
        .collect();
    let forms = workspace
        .forms
        .iter()
        .filter_map(|id| store.form(*id).cloned())
        .collect();
    let shared_with = workspace
        .shared_with
        .iter()
        .filter_map(|grant| {
            store.user(grant.user).map(|user| ResolvedGrant {
                user: user.into(),
                permission: grant.permission,
            })
        })
        .collect();
    WorkspaceView {
        id: workspace.id,
        name: workspace.name,
        owner: workspace.owner,
        folders,
        forms,
        shared_with,
        shared_by: workspace.shared_by,
    }
}
