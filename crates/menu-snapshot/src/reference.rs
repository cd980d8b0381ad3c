use std::collections::HashMap;
use std::sync::RwLock;

use menu_types::{Category, CategoryId, ItemId, MenuItem, MenuTree, Organization, OrganizationId};

/// Failure of the reference-data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),

    #[error("unknown organization {0}")]
    UnknownOrganization(OrganizationId),

    #[error("unknown category {0}")]
    UnknownCategory(CategoryId),
}

/// Read access to the menu data owned by the surrounding application.
pub trait ReferenceDataReader: Send + Sync {
    fn organization(&self, id: &OrganizationId) -> Result<Option<Organization>, ReferenceError>;

    /// Full category/item tree of an organization, hidden entries included.
    fn menu_tree(&self, id: &OrganizationId) -> Result<MenuTree, ReferenceError>;

    /// Organization and tree from a single point-in-time view.
    ///
    /// The default reads the two separately; backends that can must override
    /// this with a consistent read.
    fn read_menu(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<(Organization, MenuTree)>, ReferenceError> {
        let Some(org) = self.organization(id)? else {
            return Ok(None);
        };
        let tree = self.menu_tree(id)?;
        Ok(Some((org, tree)))
    }

    /// Organization an item belongs to, if the item exists.
    fn organization_of_item(&self, item: &ItemId) -> Result<Option<OrganizationId>, ReferenceError>;
}

#[derive(Default)]
struct ReferenceState {
    menus: HashMap<OrganizationId, (Organization, MenuTree)>,
    item_owner: HashMap<ItemId, OrganizationId>,
}

impl ReferenceState {
    /// Record `owner` for `item`, removing it from a previous owner's tree.
    fn claim(&mut self, item: &ItemId, owner: &OrganizationId) {
        let Some(previous) = self.item_owner.insert(item.clone(), owner.clone()) else {
            return;
        };
        if &previous == owner {
            return;
        }
        if let Some((_, tree)) = self.menus.get_mut(&previous) {
            tree.items.retain(|i| &i.id != item);
        }
    }
}

/// In-memory reference data, for tests, demos, and fixtures.
#[derive(Default)]
pub struct InMemoryReferenceData {
    state: RwLock<ReferenceState>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an organization, keeping its existing menu.
    pub fn put_organization(&self, org: Organization) -> Result<(), ReferenceError> {
        let mut state = self.write()?;
        match state.menus.get_mut(&org.id) {
            Some((existing, _)) => *existing = org,
            None => {
                state.menus.insert(org.id.clone(), (org, MenuTree::default()));
            }
        }
        Ok(())
    }

    /// Insert or replace a category.
    pub fn put_category(&self, org: &OrganizationId, category: Category) -> Result<(), ReferenceError> {
        let mut state = self.write()?;
        let (_, tree) = state
            .menus
            .get_mut(org)
            .ok_or_else(|| ReferenceError::UnknownOrganization(org.clone()))?;
        tree.categories.retain(|c| c.id != category.id);
        tree.categories.push(category);
        Ok(())
    }

    /// Insert or replace an item. Its category must already exist. An item
    /// that belonged to another organization moves here.
    pub fn put_item(&self, org: &OrganizationId, item: MenuItem) -> Result<(), ReferenceError> {
        let mut state = self.write()?;
        let (_, tree) = state
            .menus
            .get(org)
            .ok_or_else(|| ReferenceError::UnknownOrganization(org.clone()))?;
        if !tree.categories.iter().any(|c| c.id == item.category_id) {
            return Err(ReferenceError::UnknownCategory(item.category_id.clone()));
        }
        state.claim(&item.id, org);
        if let Some((_, tree)) = state.menus.get_mut(org) {
            tree.items.retain(|i| i.id != item.id);
            tree.items.push(item);
        }
        Ok(())
    }

    /// Set an item's visibility. Returns `false` if the item is unknown.
    pub fn set_item_visible(&self, item: &ItemId, visible: bool) -> Result<bool, ReferenceError> {
        let mut state = self.write()?;
        let Some(org) = state.item_owner.get(item).cloned() else {
            return Ok(false);
        };
        let found = state
            .menus
            .get_mut(&org)
            .and_then(|(_, tree)| tree.items.iter_mut().find(|i| &i.id == item))
            .map(|i| i.visible = visible)
            .is_some();
        Ok(found)
    }

    /// Load a whole organization with its tree, replacing anything present.
    /// Items missing from the new tree no longer resolve to this organization.
    pub fn load(&self, org: Organization, tree: MenuTree) -> Result<(), ReferenceError> {
        let mut state = self.write()?;
        state.item_owner.retain(|_, owner| owner != &org.id);
        for item in &tree.items {
            state.claim(&item.id, &org.id);
        }
        state.menus.insert(org.id.clone(), (org, tree));
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, ReferenceState>, ReferenceError> {
        self.state
            .read()
            .map_err(|_| ReferenceError::Unavailable("reference data lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, ReferenceState>, ReferenceError> {
        self.state
            .write()
            .map_err(|_| ReferenceError::Unavailable("reference data lock poisoned".into()))
    }
}

impl ReferenceDataReader for InMemoryReferenceData {
    fn organization(&self, id: &OrganizationId) -> Result<Option<Organization>, ReferenceError> {
        Ok(self.read()?.menus.get(id).map(|(org, _)| org.clone()))
    }

    fn menu_tree(&self, id: &OrganizationId) -> Result<MenuTree, ReferenceError> {
        self.read()?
            .menus
            .get(id)
            .map(|(_, tree)| tree.clone())
            .ok_or_else(|| ReferenceError::UnknownOrganization(id.clone()))
    }

    fn read_menu(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<(Organization, MenuTree)>, ReferenceError> {
        Ok(self.read()?.menus.get(id).cloned())
    }

    fn organization_of_item(&self, item: &ItemId) -> Result<Option<OrganizationId>, ReferenceError> {
        Ok(self.read()?.item_owner.get(item).cloned())
    }
}

impl std::fmt::Debug for InMemoryReferenceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let organizations = self.state.read().map(|s| s.menus.len()).unwrap_or(0);
        f.debug_struct("InMemoryReferenceData")
            .field("organizations", &organizations)
            .finish()
    }
}
