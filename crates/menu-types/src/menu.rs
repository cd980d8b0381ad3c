//! Reference menu data.
//!
//! Organizations, categories and items are owned by the surrounding CRUD
//! application. The ledger only reads point-in-time copies of them when it
//! builds a snapshot.

use serde::{Deserialize, Serialize};

use crate::identity::{CategoryId, ItemId, OrganizationId};
use crate::money::Currency;

/// A restaurant organization (tenant) as seen by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub slug: String,
    /// Currency prices are normally quoted in.
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub position: u32,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub position: u32,
    pub visible: bool,
}

/// One visible category with its visible items, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuSection<'a> {
    pub category: &'a Category,
    pub items: Vec<&'a MenuItem>,
}

/// Point-in-time copy of an organization's category/item tree, including
/// hidden entries and their visibility flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTree {
    pub categories: Vec<Category>,
    pub items: Vec<MenuItem>,
}

impl MenuTree {
    /// Visible categories and their visible items, ordered by
    /// `(position, id)` at both levels.
    ///
    /// An item is published only when both it and its category are visible.
    /// Items pointing at an unknown category are never published.
    pub fn visible_sections(&self) -> Vec<MenuSection<'_>> {
        let mut categories: Vec<&Category> =
            self.categories.iter().filter(|c| c.visible).collect();
        categories.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));

        categories
            .into_iter()
            .map(|category| {
                let mut items: Vec<&MenuItem> = self
                    .items
                    .iter()
                    .filter(|item| item.visible && item.category_id == category.id)
                    .collect();
                items.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));
                MenuSection { category, items }
            })
            .collect()
    }
}
