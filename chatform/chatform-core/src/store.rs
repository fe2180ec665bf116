//! File-backed document store. Each record is one JSON file under
//! `<data_dir>/<collection>/<id>.json`; every collection is loaded
//! into an in-memory map at startup and written back on mutation.
//! Only per-record write atomicity is provided — there are no
//! multi-record transactions.

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::design::FormDesign;
use crate::model::{FilledForm, Folder, Form, User, ViewCounter};
use crate::workspace::Workspace;

struct Collection<T> {
    dir: PathBuf,
    records: HashMap<Uuid, T>,
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        let mut records = HashMap::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(id) = Uuid::parse_str(stem) else {
                continue;
            };
            match serde_json::from_slice(&fs::read(&path)?) {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable record");
                }
            }
        }
        Ok(Self { dir, records })
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn save(&mut self, id: Uuid, record: T) -> Result<()> {
        fs::write(self.path(id), serde_json::to_vec_pretty(&record)?)?;
        self.records.insert(id, record);
        Ok(())
    }

    fn remove(&mut self, id: Uuid) -> Option<T> {
        let record = self.records.remove(&id);
        if record.is_some() {
            let _ = fs::remove_file(self.path(id));
        }
        record
    }

    fn get(&self, id: Uuid) -> Option<&T> {
        self.records.get(&id)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }
}

/// Explicitly constructed store handle; the API layer shares it behind
/// an `Arc<RwLock<_>>`.
pub struct Store {
    users: Collection<User>,
    folders: Collection<Folder>,
    forms: Collection<Form>,
    designs: Collection<FormDesign>,
    filled: Collection<FilledForm>,
    views: Collection<ViewCounter>,
    workspaces: Collection<Workspace>,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let store = Self {
            users: Collection::open(dir.join("users"))?,
            folders: Collection::open(dir.join("folders"))?,
            forms: Collection::open(dir.join("forms"))?,
            designs: Collection::open(dir.join("designs"))?,
            filled: Collection::open(dir.join("filled"))?,
            views: Collection::open(dir.join("views"))?,
            workspaces: Collection::open(dir.join("workspaces"))?,
        };
        tracing::info!(
            dir = %dir.display(),
            users = store.users.records.len(),
            forms = store.forms.records.len(),
            workspaces = store.workspaces.records.len(),
            "store opened"
        );
        Ok(store)
    }

    // users

    pub fn put_user(&mut self, user: User) -> Result<()> {
        self.users.save(user.id, user)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.get(id)
    }

    /// Lookup by case-normalized email; emails are stored lowercased.
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    // folders

    pub fn put_folder(&mut self, folder: Folder) -> Result<()> {
        self.folders.save(folder.id, folder)
    }

    pub fn folder(&self, id: Uuid) -> Option<&Folder> {
        self.folders.get(id)
    }

    pub fn folder_by_name(&self, user_id: Uuid, name: &str) -> Option<&Folder> {
        self.folders
            .iter()
            .find(|f| f.user_id == user_id && f.name == name)
    }

    pub fn folders_for_user(&self, user_id: Uuid) -> Vec<Folder> {
        self.folders
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Deleting a folder cascades: every form referencing it goes too,
    /// along with each form's design document.
    pub fn delete_folder(&mut self, id: Uuid) -> Result<Option<Folder>> {
        let Some(folder) = self.folders.remove(id) else {
            return Ok(None);
        };
        let orphaned: Vec<Uuid> = self
            .forms
            .iter()
            .filter(|f| f.folder_id == Some(id))
            .map(|f| f.id)
            .collect();
        for form_id in orphaned {
            self.forms.remove(form_id);
            self.remove_design_for_form(form_id);
        }
        Ok(Some(folder))
    }

    // forms

    pub fn put_form(&mut self, form: Form) -> Result<()> {
        self.forms.save(form.id, form)
    }

    pub fn form(&self, id: Uuid) -> Option<&Form> {
        self.forms.get(id)
    }

    pub fn form_by_name(&self, user_id: Uuid, name: &str) -> Option<&Form> {
        self.forms
            .iter()
            .find(|f| f.user_id == user_id && f.name == name)
    }

    /// `folder_id = None` selects root-level forms only, matching the
    /// listing contract.
    pub fn forms_for_user(&self, user_id: Uuid, folder_id: Option<Uuid>) -> Vec<Form> {
        self.forms
            .iter()
            .filter(|f| f.user_id == user_id && f.folder_id == folder_id)
            .cloned()
            .collect()
    }

    /// Removes the form and its design document. Scoped to the owner:
    /// a mismatched `user_id` behaves like a missing form.
    pub fn delete_form(&mut self, user_id: Uuid, form_id: Uuid) -> Result<Option<Form>> {
        match self.forms.get(form_id) {
            Some(form) if form.user_id == user_id => {}
            _ => return Ok(None),
        }
        let form = self.forms.remove(form_id);
        self.remove_design_for_form(form_id);
        Ok(form)
    }

    fn remove_design_for_form(&mut self, form_id: Uuid) {
        let design_id = self
            .designs
            .iter()
            .find(|d| d.form_id == form_id)
            .map(|d| d.id);
        if let Some(design_id) = design_id {
            self.designs.remove(design_id);
        }
    }

    // form designs

    pub fn put_design(&mut self, design: FormDesign) -> Result<()> {
        self.designs.save(design.id, design)
    }

    pub fn design(&self, id: Uuid) -> Option<&FormDesign> {
        self.designs.get(id)
    }

    pub fn design_by_form(&self, form_id: Uuid) -> Option<&FormDesign> {
        self.designs.iter().find(|d| d.form_id == form_id)
    }

    // filled forms

    pub fn put_filled(&mut self, filled: FilledForm) -> Result<()> {
        self.filled.save(filled.id, filled)
    }

    pub fn filled(&self, id: Uuid) -> Option<&FilledForm> {
        self.filled.get(id)
    }

    pub fn filled_for_form(&self, form_id: Uuid) -> Vec<FilledForm> {
        self.filled
            .iter()
            .filter(|f| f.form_id == form_id)
            .cloned()
            .collect()
    }

    // view counters

    /// Upsert-increment: the first view creates the counter at 1.
    pub fn record_view(&mut self, form_id: Uuid) -> Result<ViewCounter> {
        let views = self.views.get(form_id).map(|v| v.views + 1).unwrap_or(1);
        let counter = ViewCounter { form_id, views };
        self.views.save(form_id, counter.clone())?;
        Ok(counter)
    }

    pub fn view(&self, form_id: Uuid) -> Option<&ViewCounter> {
        self.views.get(form_id)
    }

    // workspaces

    pub fn put_workspace(&mut self, workspace: Workspace) -> Result<()> {
        self.workspaces.save(workspace.id, workspace)
    }

    pub fn workspace(&self, id: Uuid) -> Option<&Workspace> {
        self.workspaces.get(id)
    }

    /// Owner is a uniqueness key: at most one workspace per owner.
    pub fn workspace_by_owner(&self, owner: Uuid) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.owner == owner)
    }

    pub fn workspaces_shared_with(&self, user: Uuid) -> Vec<Workspace> {
        self.workspaces
            .iter()
            .filter(|w| w.shared_with.iter().any(|g| g.user == user))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(name: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn records_survive_reopen() {
        let tempdir = tempfile::tempdir().unwrap();
        let owner = user("alice", "alice@example.com");
        let owner_id = owner.id;
        {
            let mut store = Store::open(tempdir.path()).unwrap();
            store.put_user(owner).unwrap();
            store
                .put_folder(Folder {
                    id: Uuid::new_v4(),
                    name: "surveys".to_string(),
                    user_id: owner_id,
                })
                .unwrap();
        }

        let store = Store::open(tempdir.path()).unwrap();
        assert_eq!(store.user(owner_id).unwrap().name, "alice");
        assert_eq!(store.folders_for_user(owner_id).len(), 1);
        assert!(store.user_by_email("alice@example.com").is_some());
    }

    #[test]
    fn folder_delete_cascades_to_forms_and_designs() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut store = Store::open(tempdir.path()).unwrap();
        let owner_id = Uuid::new_v4();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: "surveys".to_string(),
            user_id: owner_id,
        };
        let form = Form {
            id: Uuid::new_v4(),
            name: "feedback".to_string(),
            user_id: owner_id,
            folder_id: Some(folder.id),
        };
        let rooted = Form {
            id: Uuid::new_v4(),
            name: "standalone".to_string(),
            user_id: owner_id,
            folder_id: None,
        };
        store.put_folder(folder.clone()).unwrap();
        store.put_form(form.clone()).unwrap();
        store.put_form(rooted.clone()).unwrap();
        let design = crate::design::FormDesign {
            id: Uuid::new_v4(),
            form_id: form.id,
            name: "feedback".to_string(),
            elements: Vec::new(),
        };
        store.put_design(design).unwrap();

        let removed = store.delete_folder(folder.id).unwrap();
        assert_eq!(removed.unwrap().id, folder.id);
        assert!(store.form(form.id).is_none());
        assert!(store.design_by_form(form.id).is_none());
        assert!(store.form(rooted.id).is_some());
    }

    #[test]
    fn form_delete_is_owner_scoped_and_removes_design() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut store = Store::open(tempdir.path()).unwrap();
        let owner_id = Uuid::new_v4();
        let form = Form {
            id: Uuid::new_v4(),
            name: "quiz".to_string(),
            user_id: owner_id,
            folder_id: None,
        };
        store.put_form(form.clone()).unwrap();
        let design = crate::design::FormDesign {
            id: Uuid::new_v4(),
            form_id: form.id,
            name: "quiz".to_string(),
            elements: Vec::new(),
        };
        store.put_design(design).unwrap();

        assert!(store
            .delete_form(Uuid::new_v4(), form.id)
            .unwrap()
            .is_none());
        assert!(store.form(form.id).is_some());

        let removed = store.delete_form(owner_id, form.id).unwrap();
        assert_eq!(removed.unwrap().id, form.id);
        assert!(store.design_by_form(form.id).is_none());
    }

    #[test]
    fn view_counter_auto_creates_then_increments() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut store = Store::open(tempdir.path()).unwrap();
        let form_id = Uuid::new_v4();

        assert!(store.view(form_id).is_none());
        assert_eq!(store.record_view(form_id).unwrap().views, 1);
        assert_eq!(store.record_view(form_id).unwrap().views, 2);
        assert_eq!(store.view(form_id).unwrap().views, 2);
    }

    #[test]
    fn root_level_form_listing_excludes_foldered_forms() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut store = Store::open(tempdir.path()).unwrap();
        let owner_id = Uuid::new_v4();
        let folder_id = Uuid::new_v4();
        store
            .put_form(Form {
                id: Uuid::new_v4(),
                name: "inside".to_string(),
                user_id: owner_id,
                folder_id: Some(folder_id),
            })
            .unwrap();
        store
            .put_form(Form {
                id: Uuid::new_v4(),
                name: "outside".to_string(),
                user_id: owner_id,
                folder_id: None,
            })
            .unwrap();

        let root = store.forms_for_user(owner_id, None);
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].name, "outside");
        assert_eq!(store.forms_for_user(owner_id, Some(folder_id)).len(), 1);
    }
}
