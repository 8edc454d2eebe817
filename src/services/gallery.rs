use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::dto::{GalleryInput, GalleryPatch};
use crate::entities::{LocalizedText, gallery_item};
use crate::error::AppError;
use crate::services::courses::validate_price;
use crate::services::uploads::is_image_reference;

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_CATEGORY_LEN: usize = 100;

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_title(title: &LocalizedText) -> Result<(), AppError> {
    title
        .validate("title", MAX_TITLE_LEN)
        .map_err(AppError::UnprocessableEntity)
}

fn check_description(description: Option<&LocalizedText>) -> Result<(), AppError> {
    description.map_or(Ok(()), |d| {
        d.validate("description", MAX_DESCRIPTION_LEN)
            .map_err(AppError::UnprocessableEntity)
    })
}

fn check_image_url(url: &str) -> Result<(), AppError> {
    if is_image_reference(url) {
        Ok(())
    } else {
        Err(AppError::UnprocessableEntity(
            "Image URL must be a valid URL or relative path starting with /".to_string(),
        ))
    }
}

fn check_price(price: Option<&str>) -> Result<(), AppError> {
    price
        .map_or(Ok(()), validate_price)
        .map_err(AppError::UnprocessableEntity)
}

fn check_category(category: Option<&str>) -> Result<(), AppError> {
    if category.is_some_and(|c| c.chars().count() > MAX_CATEGORY_LEN) {
        return Err(AppError::UnprocessableEntity(format!(
            "Category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }
    Ok(())
}

pub struct GalleryService;

impl GalleryService {
    /// Gallery items, newest first, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        db: &DatabaseConnection,
        category: Option<&str>,
    ) -> Result<Vec<gallery_item::Model>, AppError> {
        let mut query = gallery_item::Entity::find().order_by_desc(gallery_item::Column::CreatedAt);
        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            query = query.filter(gallery_item::Column::Category.eq(category));
        }
        Ok(query.all(db).await?)
    }

    /// # Errors
    ///
    /// `UnprocessableEntity` on invalid input.
    pub async fn create(
        db: &DatabaseConnection,
        input: GalleryInput,
    ) -> Result<gallery_item::Model, AppError> {
        let image_url = input.image_url.trim().to_string();
        let price = clean(input.price);
        let category = clean(input.category);

        check_title(&input.title)?;
        check_description(input.description.as_ref())?;
        check_image_url(&image_url)?;
        check_price(price.as_deref())?;
        check_category(category.as_deref())?;

        let created = gallery_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            description: Set(input.description),
            image_url: Set(image_url),
            price: Set(price),
            category: Set(category),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(db)
        .await?;

        tracing::info!(item_id = %created.id, "Gallery item created");
        Ok(created)
    }

    /// # Errors
    ///
    /// `NotFound` if the item does not exist, `UnprocessableEntity` on invalid input.
    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: GalleryPatch,
    ) -> Result<gallery_item::Model, AppError> {
        let existing = gallery_item::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;

        let mut active: gallery_item::ActiveModel = existing.into();

        if let Some(title) = patch.title {
            check_title(&title)?;
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            check_description(description.as_ref())?;
            active.description = Set(description);
        }
        if let Some(image_url) = patch.image_url {
            let image_url = image_url.trim().to_string();
            check_image_url(&image_url)?;
            active.image_url = Set(image_url);
        }
        if let Some(price) = patch.price {
            let price = clean(price);
            check_price(price.as_deref())?;
            active.price = Set(price);
        }
        if let Some(category) = patch.category {
            let category = clean(category);
            check_category(category.as_deref())?;
            active.category = Set(category);
        }

        Ok(active.update(db).await?)
    }

    /// Deleting an item that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AppError> {
        gallery_item::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }
}
