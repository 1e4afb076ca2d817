//! Categories and the repository over them.
//!
//! Categories are a flat named list. Tasks store the category *name*, not
//! its id, and nothing cascades if the list changes, so the repository
//! exposes no rename and no delete.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{Store, CATEGORIES, CATEGORY_SEED};

/// A named tag applied to tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Persisted form of the category list plus its id counter.
#[derive(Debug, Serialize, Deserialize)]
struct CategoryLedger {
    next_category_id: u64,
    categories: Vec<Category>,
}

/// Owns the category list and the store it persists to.
#[derive(Debug)]
pub struct CategoryRepository {
    store: Store,
    ledger: CategoryLedger,
}

impl CategoryRepository {
    /// Load the repository from `store`, serving seed data on first use.
    pub fn open(store: Store) -> Result<Self> {
        let ledger = store.load(CATEGORIES, CATEGORY_SEED)?;
        Ok(CategoryRepository { store, ledger })
    }

    /// All categories, in insertion order.
    pub fn all(&self) -> Vec<Category> {
        self.ledger.categories.clone()
    }

    /// Create a category and persist the list.
    pub fn create(&mut self, name: impl Into<String>) -> Result<Category> {
        let category = Category { id: self.ledger.next_category_id, name: name.into() };
        self.ledger.next_category_id += 1;
        self.ledger.categories.push(category.clone());
        self.store.save(CATEGORIES, &self.ledger)?;
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn create_assigns_increasing_ids_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store
            .save(CATEGORIES, &CategoryLedger { next_category_id: 1, categories: Vec::new() })
            .unwrap();
        let mut repo = CategoryRepository::open(store.clone()).unwrap();
        let a = repo.create("Work").unwrap();
        let b = repo.create("Home").unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        drop(repo);
        let reopened = CategoryRepository::open(store).unwrap();
        assert_eq!(reopened.all(), vec![a, b]);
    }

    #[test]
    fn fresh_directory_serves_the_bundled_seed() {
        let dir = TempDir::new().unwrap();
        let repo = CategoryRepository::open(Store::open(dir.path()).unwrap()).unwrap();
        assert!(repo.all().iter().any(|c| c.name == "Work"));
        assert!(!dir.path().join("categories.json").exists());
    }
}
