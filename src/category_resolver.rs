use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::models::{NewCategory, TransactionType};
use crate::store::Storage;

pub const FALLBACK_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_ICON: &str = "circle-help";
pub const DEFAULT_COLOR: &str = "#94a3b8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub category_id: i64,
    pub existed: bool,
}

fn effective_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() {
        FALLBACK_CATEGORY
    } else {
        name
    }
}

/// Find the user's category by case-insensitive name and exact type, or
/// create it with the default icon and color.
pub fn resolve_category(
    store: &impl Storage,
    name: &str,
    category_type: TransactionType,
    user_id: &str,
) -> Result<Resolved> {
    let name = effective_name(name);
    if let Some(existing) = store.find_category(user_id, name, category_type)? {
        debug!(
            "matched '{name}' to {} category '{}' ({}) for user {}",
            existing.category_type, existing.name, existing.id, existing.user_id
        );
        return Ok(Resolved {
            category_id: existing.id,
            existed: true,
        });
    }
    let created = store.create_category(&NewCategory {
        user_id,
        name,
        category_type,
        icon: DEFAULT_ICON,
        color: DEFAULT_COLOR,
    })?;
    debug!(
        "created {} category '{}' ({}) for user {} with icon {} and color {}",
        created.category_type, created.name, created.id, created.user_id, created.icon, created.color
    );
    Ok(Resolved {
        category_id: created.id,
        existed: false,
    })
}

/// Memoizes resolutions for one import run, keyed by lowercased name and
/// type. Never outlives the run.
#[derive(Default)]
pub struct CategoryCache {
    resolved: HashMap<(String, TransactionType), i64>,
}

impl CategoryCache {
    /// A cache hit reports `existed = true`: the category was found or
    /// created earlier in this run.
    pub fn resolve(
        &mut self,
        store: &impl Storage,
        name: &str,
        category_type: TransactionType,
        user_id: &str,
    ) -> Result<Resolved> {
        let key = (effective_name(name).to_lowercase(), category_type);
        if let Some(&category_id) = self.resolved.get(&key) {
            return Ok(Resolved {
                category_id,
                existed: true,
            });
        }
        let resolved = resolve_category(store, name, category_type, user_id)?;
        self.resolved.insert(key, resolved.category_id);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn test_creates_with_defaults_when_missing() {
        let store = MemoryStore::default();
        let resolved = resolve_category(&store, "Food", TransactionType::Expense, "alice").unwrap();
        assert!(!resolved.existed);
        let cats = store.categories();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Food");
        assert_eq!(cats[0].icon, "circle-help");
        assert_eq!(cats[0].color, "#94a3b8");
        assert_eq!(cats[0].category_type, TransactionType::Expense);
    }

    #[test]
    fn test_finds_existing_case_insensitively() {
        let store = MemoryStore::default();
        let id = store.seed_category("alice", "Food", TransactionType::Expense);
        let resolved = resolve_category(&store, "fOOD", TransactionType::Expense, "alice").unwrap();
        assert_eq!(resolved, Resolved { category_id: id, existed: true });
        assert_eq!(store.calls().category_creates, 0);
    }

    #[test]
    fn test_same_name_other_type_is_distinct() {
        let store = MemoryStore::default();
        let income = store.seed_category("alice", "Salary", TransactionType::Income);
        let resolved = resolve_category(&store, "Salary", TransactionType::Expense, "alice").unwrap();
        assert!(!resolved.existed);
        assert_ne!(resolved.category_id, income);
    }

    #[test]
    fn test_blank_name_falls_back() {
        let store = MemoryStore::default();
        resolve_category(&store, "   ", TransactionType::Expense, "alice").unwrap();
        assert_eq!(store.categories()[0].name, FALLBACK_CATEGORY);
    }

    #[test]
    fn test_cache_hits_storage_once_per_key() {
        let store = MemoryStore::default();
        let mut cache = CategoryCache::default();
        let first = cache.resolve(&store, "Food", TransactionType::Expense, "alice").unwrap();
        let again = cache.resolve(&store, "FOOD", TransactionType::Expense, "alice").unwrap();
        assert!(!first.existed);
        assert!(again.existed);
        assert_eq!(first.category_id, again.category_id);
        let calls = store.calls();
        assert_eq!(calls.category_lookups, 1);
        assert_eq!(calls.category_creates, 1);

        cache.resolve(&store, "Food", TransactionType::Income, "alice").unwrap();
        assert_eq!(store.calls().category_creates, 2);
    }
}
