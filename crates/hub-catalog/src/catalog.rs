use std::collections::HashMap;

use chrono::Utc;
use cloudhub_protocol::{
    CloudAccount, CloudProvider, FileItem, FileType, OrganizationAction, OrganizationPlan,
};
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::seed;

/// Accounts and their file listings.
#[derive(Debug, Clone)]
pub struct CloudCatalog {
    accounts: Vec<CloudAccount>,
    files: HashMap<String, Vec<FileItem>>,
    next_id: u64,
}

impl Default for CloudCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CloudCatalog {
    /// A catalog with no accounts.
    pub fn empty() -> Self {
        Self {
            accounts: Vec::new(),
            files: HashMap::new(),
            next_id: 1,
        }
    }

    /// A catalog populated with the demo accounts and files.
    pub fn seeded() -> Self {
        let mut catalog = Self::empty();
        for account in seed::accounts() {
            catalog.files.insert(account.id.clone(), Vec::new());
            catalog.accounts.push(account);
        }
        for (account_id, file) in seed::files() {
            catalog
                .files
                .entry(account_id.to_string())
                .or_default()
                .push(file);
        }
        catalog.next_id = catalog.accounts.len() as u64 + 1;
        catalog
    }

    pub fn accounts(&self) -> &[CloudAccount] {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<&CloudAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Registers a new account with an empty drive.
    pub fn add_account(&mut self, provider: CloudProvider, email: &str) -> CloudAccount {
        let account = CloudAccount {
            id: format!("acc_{}", self.allocate_id()),
            provider,
            email: email.to_string(),
        };
        self.files.insert(account.id.clone(), Vec::new());
        self.accounts.push(account.clone());
        info!(account = %account.id, provider = %provider, "account added");
        account
    }

    /// Lists the entries directly inside `path`, folders first, then by name.
    ///
    /// The local pseudo-account and unknown accounts list nothing.
    pub fn files(&self, account_id: &str, path: &str) -> Vec<FileItem> {
        let Some(files) = self.files.get(account_id) else {
            return Vec::new();
        };
        let mut listing: Vec<FileItem> = files.iter().filter(|f| f.path == path).cloned().collect();
        listing.sort_by(|a, b| match (a.file_type, b.file_type) {
            (FileType::Folder, FileType::File) => std::cmp::Ordering::Less,
            (FileType::File, FileType::Folder) => std::cmp::Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });
        listing
    }

    pub fn create_folder(
        &mut self,
        account_id: &str,
        path: &str,
        name: &str,
    ) -> Result<FileItem, CatalogError> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(CatalogError::InvalidName(name.to_string()));
        }
        let id = format!("folder_{}", self.allocate_id());
        let files = self.drive_mut(account_id)?;
        let folder = FileItem {
            id,
            name: name.to_string(),
            file_type: FileType::Folder,
            size: 0,
            modified: Utc::now(),
            path: path.to_string(),
        };
        files.push(folder.clone());
        debug!(account = %account_id, folder = %folder.full_path(), "folder created");
        Ok(folder)
    }

    pub fn rename_file(
        &mut self,
        account_id: &str,
        file_id: &str,
        new_name: &str,
    ) -> Result<(), CatalogError> {
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name.contains('/') {
            return Err(CatalogError::InvalidName(new_name.to_string()));
        }
        let file = self
            .drive_mut(account_id)?
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| CatalogError::FileNotFound(file_id.to_string()))?;
        debug!(account = %account_id, from = %file.name, to = %new_name, "file renamed");
        file.name = new_name.to_string();
        file.modified = Utc::now();
        Ok(())
    }

    /// Deletes the given entries. Deleting a folder also deletes everything
    /// beneath it. Unknown ids are ignored.
    pub fn delete_files(&mut self, account_id: &str, file_ids: &[String]) -> Result<(), CatalogError> {
        let files = self.drive_mut(account_id)?;
        let prefixes: Vec<String> = files
            .iter()
            .filter(|f| f.is_folder() && file_ids.contains(&f.id))
            .map(|f| format!("{}/", f.full_path()))
            .collect();
        let before = files.len();
        files.retain(|f| {
            !file_ids.contains(&f.id) && !prefixes.iter().any(|p| f.path.starts_with(p.as_str()))
        });
        debug!(account = %account_id, removed = before - files.len(), "files deleted");
        Ok(())
    }

    /// Applies a plan to the entries directly inside `current_path`.
    ///
    /// All folder creations run before any move, so a plan may move files
    /// into folders it creates regardless of action order.
    pub fn apply_organization_plan(
        &mut self,
        account_id: &str,
        current_path: &str,
        plan: &OrganizationPlan,
    ) -> Result<(), CatalogError> {
        if !self.files.contains_key(account_id) {
            return Err(CatalogError::AccountNotFound(account_id.to_string()));
        }

        for action in plan {
            if let OrganizationAction::CreateFolder { folder_name } = action {
                let exists = self.files[account_id]
                    .iter()
                    .any(|f| f.path == current_path && f.name == *folder_name);
                if !exists {
                    self.create_folder(account_id, current_path, folder_name)?;
                }
            }
        }

        let files = self.drive_mut(account_id)?;
        let mut moved = 0usize;
        for action in plan {
            if let OrganizationAction::MoveFile {
                file_name,
                new_folder_name,
            } = action
                && let Some(file) = files
                    .iter_mut()
                    .find(|f| f.path == current_path && f.name == *file_name)
            {
                file.path = format!("{current_path}{new_folder_name}/");
                moved += 1;
            }
        }
        info!(account = %account_id, path = %current_path, moved, "organization plan applied");
        Ok(())
    }

    /// Lands a transferred file at the root of `account_id`, replacing any
    /// root entry with the same name.
    pub fn receive_file(&mut self, account_id: &str, file: &FileItem) -> Result<FileItem, CatalogError> {
        let id = format!("recv_{}", self.allocate_id());
        let files = self.drive_mut(account_id)?;
        files.retain(|f| !(f.path == "/" && f.name == file.name));
        let landed = FileItem {
            id,
            name: file.name.clone(),
            file_type: file.file_type,
            size: file.size,
            modified: Utc::now(),
            path: "/".into(),
        };
        files.push(landed.clone());
        debug!(account = %account_id, file = %landed.name, "file received");
        Ok(landed)
    }

    fn drive_mut(&mut self, account_id: &str) -> Result<&mut Vec<FileItem>, CatalogError> {
        self.files
            .get_mut(account_id)
            .ok_or_else(|| CatalogError::AccountNotFound(account_id.to_string()))
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(files: &[FileItem]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn seeded_listing_sorts_folders_first() {
        let catalog = CloudCatalog::seeded();
        let root = catalog.files("acc_1", "/");
        assert_eq!(
            names(&root),
            vec![
                "Documents",
                "Photos",
                "family_video_2023.mp4",
                "project_brief.docx",
                "screenshot-1.png",
            ]
        );
    }

    #[test]
    fn listing_is_scoped_to_path() {
        let catalog = CloudCatalog::seeded();
        let docs = catalog.files("acc_1", "/Documents/");
        assert_eq!(names(&docs), vec!["Reports", "financials_q3.xlsx"]);
    }

    #[test]
    fn local_and_unknown_accounts_list_nothing() {
        let catalog = CloudCatalog::seeded();
        assert!(catalog.files("local", "/").is_empty());
        assert!(catalog.files("acc_404", "/").is_empty());
    }

    #[test]
    fn add_account_gets_fresh_id_and_empty_drive() {
        let mut catalog = CloudCatalog::seeded();
        let before = catalog.accounts().len();
        let account = catalog.add_account(CloudProvider::Mega, "me@mega.nz");
        assert_eq!(catalog.accounts().len(), before + 1);
        assert!(catalog.account(&account.id).is_some());
        assert!(catalog.accounts()[..before].iter().all(|a| a.id != account.id));
        assert!(catalog.files(&account.id, "/").is_empty());
    }

    #[test]
    fn create_folder_appears_in_listing() {
        let mut catalog = CloudCatalog::seeded();
        let folder = catalog.create_folder("acc_2", "/", "Invoices").unwrap();
        assert!(folder.is_folder());
        assert_eq!(names(&catalog.files("acc_2", "/")), vec!["Invoices", "Work"]);
    }

    #[test]
    fn create_folder_rejects_blank_name() {
        let mut catalog = CloudCatalog::seeded();
        assert!(matches!(
            catalog.create_folder("acc_2", "/", "   "),
            Err(CatalogError::InvalidName(_))
        ));
    }

    #[test]
    fn create_folder_unknown_account() {
        let mut catalog = CloudCatalog::seeded();
        assert_eq!(
            catalog.create_folder("acc_404", "/", "x"),
            Err(CatalogError::AccountNotFound("acc_404".into()))
        );
    }

    #[test]
    fn rename_updates_name() {
        let mut catalog = CloudCatalog::seeded();
        catalog.rename_file("acc_1", "f1_3", "brief.docx").unwrap();
        assert!(names(&catalog.files("acc_1", "/")).contains(&"brief.docx"));
    }

    #[test]
    fn rename_missing_file() {
        let mut catalog = CloudCatalog::seeded();
        assert_eq!(
            catalog.rename_file("acc_1", "nope", "x"),
            Err(CatalogError::FileNotFound("nope".into()))
        );
    }

    #[test]
    fn delete_folder_cascades() {
        let mut catalog = CloudCatalog::seeded();
        catalog
            .delete_files("acc_1", &["f1_1".to_string(), "missing".to_string()])
            .unwrap();
        assert!(!names(&catalog.files("acc_1", "/")).contains(&"Documents"));
        assert!(catalog.files("acc_1", "/Documents/").is_empty());
        assert!(catalog.files("acc_1", "/Documents/Reports/").is_empty());
        // Siblings untouched.
        assert_eq!(catalog.files("acc_1", "/Photos/").len(), 1);
    }

    #[test]
    fn organization_plan_creates_then_moves() {
        let mut catalog = CloudCatalog::seeded();
        let plan = vec![
            OrganizationAction::MoveFile {
                file_name: "screenshot-1.png".into(),
                new_folder_name: "Images".into(),
            },
            OrganizationAction::CreateFolder {
                folder_name: "Images".into(),
            },
            OrganizationAction::CreateFolder {
                folder_name: "Photos".into(),
            },
        ];
        catalog.apply_organization_plan("acc_1", "/", &plan).unwrap();

        let root_files = catalog.files("acc_1", "/");
        let root = names(&root_files);
        assert!(root.contains(&"Images"));
        assert!(!root.contains(&"screenshot-1.png"));
        assert_eq!(root.iter().filter(|n| **n == "Photos").count(), 1);
        assert_eq!(names(&catalog.files("acc_1", "/Images/")), vec!["screenshot-1.png"]);
    }

    #[test]
    fn organization_plan_unknown_account() {
        let mut catalog = CloudCatalog::seeded();
        assert_eq!(
            catalog.apply_organization_plan("acc_404", "/", &Vec::new()),
            Err(CatalogError::AccountNotFound("acc_404".into()))
        );
    }

    #[test]
    fn receive_file_lands_at_root_once() {
        let mut catalog = CloudCatalog::seeded();
        let source = catalog.files("acc_1", "/Photos/").remove(0);
        catalog.receive_file("acc_3", &source).unwrap();
        catalog.receive_file("acc_3", &source).unwrap();

        let root = catalog.files("acc_3", "/");
        assert_eq!(names(&root), vec!["Personal", "vacation_photo_01.jpg"]);
        assert_eq!(root[1].size, source.size);
    }
}
