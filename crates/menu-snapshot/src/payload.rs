//! The hashed content of a snapshot.
//!
//! Field names are camelCase and the document is hashed through
//! `menu_crypto::to_canonical_bytes`, so the hash is reproducible by any
//! implementation that sorts keys and formats prices the same way.

use serde::{Deserialize, Serialize};

use menu_ledger::CurrentPrice;
use menu_types::{format_timestamp, Category, MenuItem, Money, Organization};

use crate::error::SnapshotError;

/// Schema tag carried in every payload.
pub const SCHEMA: &str = "menu-snapshot/v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub schema: String,
    pub organization: OrganizationEntry,
    pub categories: Vec<CategoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationEntry {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub position: u32,
    pub items: Vec<ItemEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub position: u32,
    /// `None` serializes as an explicit `null`: the item was shown unpriced.
    pub price: Option<PublishedPrice>,
}

/// A price as displayed, with the fact it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPrice {
    /// Fixed-scale decimal text, e.g. `"120.00"`.
    pub amount: String,
    pub currency: String,
    pub recorded_at: String,
    pub fact_id: u64,
}

impl OrganizationEntry {
    pub fn from_organization(org: &Organization) -> Self {
        Self {
            id: org.id.to_string(),
            name: org.name.clone(),
            slug: org.slug.clone(),
            currency: org.currency.code().to_string(),
        }
    }
}

impl CategoryEntry {
    pub fn from_category(category: &Category, items: Vec<ItemEntry>) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone(),
            position: category.position,
            items,
        }
    }
}

impl ItemEntry {
    pub fn from_item(item: &MenuItem, price: Option<PublishedPrice>) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            position: item.position,
            price,
        }
    }
}

impl PublishedPrice {
    pub fn from_current(current: &CurrentPrice) -> Result<Self, SnapshotError> {
        let money: Money = current.money()?;
        Ok(Self {
            amount: money.canonical_amount(),
            currency: money.currency().code().to_string(),
            recorded_at: format_timestamp(&current.recorded_at),
            fact_id: current.fact_id.get(),
        })
    }
}

impl SnapshotPayload {
    pub fn new(organization: OrganizationEntry, categories: Vec<CategoryEntry>) -> Self {
        Self {
            schema: SCHEMA.to_string(),
            organization,
            categories,
        }
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn unpriced_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.items)
            .filter(|i| i.price.is_none())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_crypto::to_canonical_string;

    #[test]
    fn unpriced_item_serializes_explicit_null() {
        let payload = SnapshotPayload::new(
            OrganizationEntry {
                id: "org".into(),
                name: "Cafe".into(),
                slug: "cafe".into(),
                currency: "TRY".into(),
            },
            vec![CategoryEntry {
                id: "drinks".into(),
                name: "Drinks".into(),
                description: None,
                position: 0,
                items: vec![ItemEntry {
                    id: "tea".into(),
                    name: "Tea".into(),
                    description: None,
                    position: 0,
                    price: None,
                }],
            }],
        );
        let text = to_canonical_string(&payload).unwrap();
        assert!(text.contains(r#""price":null"#));
        assert!(text.starts_with(r#"{"categories":"#));
        assert!(text.ends_with(r#""schema":"menu-snapshot/v1"}"#));
        assert_eq!(payload.unpriced_count(), 1);
        assert_eq!(payload.item_count(), 1);
    }
}
