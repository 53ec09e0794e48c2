//! Category records, keyed by category name

use qss_common::models::{Category, CATEGORIES};
use qss_common::store::{get_record, list_records, set_record};
use qss_common::time::now;
use qss_common::{Error, RecordFilter, RecordStore, Result};
use serde::Deserialize;
use tracing::info;

pub const MSG_NAME_REQUIRED: &str = "Category name is required.";
pub const MSG_DESCRIPTION_REQUIRED: &str = "Category description is required.";
pub const MSG_DESCRIPTION_EMPTY: &str = "Category description cannot be empty.";
pub const MSG_NAME_IMMUTABLE: &str = "Category name cannot be changed.";

/// Body of a create request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    pub category_name: Option<String>,
    pub category_description: Option<String>,
}

/// Body of a partial update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub category_name: Option<String>,
    pub category_description: Option<String>,
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::InvalidInput(message.to_string())),
    }
}

pub async fn create_category(store: &dyn RecordStore, input: CategoryInput) -> Result<Category> {
    let name = required(input.category_name, MSG_NAME_REQUIRED)?;
    let description = required(input.category_description, MSG_DESCRIPTION_REQUIRED)?;

    if store.get(CATEGORIES, &name).await?.is_some() {
        return Err(Error::InvalidInput(format!("Category '{}' already exists.", name)));
    }

    let timestamp = now();
    let category = Category {
        category_name: name,
        category_description: description,
        created_at: timestamp,
        updated_at: timestamp,
    };
    set_record(store, CATEGORIES, &category.category_name, &category).await?;

    info!(category = %category.category_name, "Category created");
    Ok(category)
}

pub async fn list_categories(store: &dyn RecordStore) -> Result<Vec<Category>> {
    list_records(store, CATEGORIES, &RecordFilter::All).await
}

pub async fn get_category(store: &dyn RecordStore, name: &str) -> Result<Option<Category>> {
    get_record(store, CATEGORIES, name).await
}

/// Apply a partial update; `None` when the category is absent.
///
/// The name is the record key and cannot be changed; an empty description
/// is rejected.
pub async fn update_category(
    store: &dyn RecordStore,
    name: &str,
    update: CategoryUpdate,
) -> Result<Option<Category>> {
    let Some(mut category) = get_record::<Category>(store, CATEGORIES, name).await? else {
        return Ok(None);
    };

    if let Some(new_name) = update.category_name {
        if new_name != category.category_name {
            return Err(Error::InvalidInput(MSG_NAME_IMMUTABLE.to_string()));
        }
    }
    if let Some(description) = update.category_description {
        category.category_description = required(Some(description), MSG_DESCRIPTION_EMPTY)?;
    }

    category.updated_at = now();
    set_record(store, CATEGORIES, name, &category).await?;

    info!(category = %name, "Category updated");
    Ok(Some(category))
}

/// Returns whether the category existed
pub async fn delete_category(store: &dyn RecordStore, name: &str) -> Result<bool> {
    let deleted = store.delete(CATEGORIES, name).await?;
    if deleted {
        info!(category = %name, "Category deleted");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qss_common::store::MemoryStore;

    fn input(name: Option<&str>, description: Option<&str>) -> CategoryInput {
        CategoryInput {
            category_name: name.map(str::to_string),
            category_description: description.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_requires_name_and_description() {
        let store = MemoryStore::new();

        let err = create_category(&store, input(Some("Test-Category"), None)).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid input: {}", MSG_DESCRIPTION_REQUIRED));

        let err = create_category(&store, input(None, Some("d"))).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(m) if m == MSG_NAME_REQUIRED));

        let err = create_category(&store, input(Some("  "), Some("d"))).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(m) if m == MSG_NAME_REQUIRED));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let store = MemoryStore::new();
        create_category(&store, input(Some("A"), Some("first"))).await.unwrap();
        assert!(create_category(&store, input(Some("A"), Some("second"))).await.is_err());
        assert_eq!(list_categories(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = MemoryStore::new();
        let created = create_category(&store, input(Some("Test-Category"), Some("Initial")))
            .await
            .unwrap();

        let update = CategoryUpdate {
            category_name: None,
            category_description: Some("Partially Updated Description".into()),
        };
        let updated = update_category(&store, "Test-Category", update).await.unwrap().unwrap();
        assert_eq!(updated.category_name, "Test-Category");
        assert_eq!(updated.category_description, "Partially Updated Description");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_changes() {
        let store = MemoryStore::new();
        create_category(&store, input(Some("A"), Some("d"))).await.unwrap();

        let empty = CategoryUpdate {
            category_name: None,
            category_description: Some(String::new()),
        };
        assert!(matches!(
            update_category(&store, "A", empty).await,
            Err(Error::InvalidInput(m)) if m == MSG_DESCRIPTION_EMPTY
        ));

        let rename = CategoryUpdate {
            category_name: Some("B".into()),
            category_description: None,
        };
        assert!(update_category(&store, "A", rename).await.is_err());

        let missing = update_category(&store, "Nope", CategoryUpdate::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        create_category(&store, input(Some("A"), Some("d"))).await.unwrap();
        assert!(delete_category(&store, "A").await.unwrap());
        assert!(!delete_category(&store, "A").await.unwrap());
        assert!(get_category(&store, "A").await.unwrap().is_none());
    }
}
