use sqlx::{PgExecutor, Result as SqlxResult};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{
    models::{
        AttributeOptionGroupRow, AttributeOptionRow, CategoryRow, OptionRow,
        ProductAttributeRow, ProductAttributeValueRow, ProductCategoryRow, ProductClassRow,
        ProductImageRow, ProductRecommendationRow, ProductRow,
    },
    pagination::LimitOffset,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStructure {
    Standalone,
    Parent,
    Child,
}

impl ProductStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStructure::Standalone => "standalone",
            ProductStructure::Parent => "parent",
            ProductStructure::Child => "child",
        }
    }

    /// Variants stay variants and top-level products never become variants.
    /// Standalone and parent may be swapped freely.
    pub fn transition_to(self, next: ProductStructure) -> Result<ProductStructure, StructureError> {
        match (self, next) {
            (from, to) if from == to => Ok(to),
            (ProductStructure::Child, _) => Err(StructureError::VariantToTopLevel),
            (_, ProductStructure::Child) => Err(StructureError::TopLevelToVariant),
            (_, to) => Ok(to),
        }
    }
}

impl FromStr for ProductStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standalone" => Ok(ProductStructure::Standalone),
            "parent" => Ok(ProductStructure::Parent),
            "child" => Ok(ProductStructure::Child),
            _ => Err(format!("Unknown product structure: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureError {
    VariantToTopLevel,
    TopLevelToVariant,
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::VariantToTopLevel => {
                write!(f, "Cannot change a variant to a standalone or parent product.")
            }
            StructureError::TopLevelToVariant => {
                write!(f, "Cannot change a standalone or parent product to a variant.")
            }
        }
    }
}

impl std::error::Error for StructureError {}

#[derive(Debug, Clone)]
pub struct CreateProductData {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub product_class_id: Uuid,
    pub structure: ProductStructure,
    pub parent_id: Option<Uuid>,
    pub upc: Option<String>,
    pub is_public: bool,
    pub is_discountable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductData {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub is_discountable: Option<bool>,
    pub structure: Option<ProductStructure>,
}

// ── Product classes ──

pub async fn list_product_classes<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<ProductClassRow>> {
    sqlx::query_as::<_, ProductClassRow>(
        r#"
        SELECT id, name, slug, requires_shipping, track_stock
        FROM product_classes
        ORDER BY name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_product_classes<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM product_classes")
        .fetch_one(executor)
        .await
}

pub async fn get_product_class<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ProductClassRow>> {
    sqlx::query_as::<_, ProductClassRow>(
        r#"
        SELECT id, name, slug, requires_shipping, track_stock
        FROM product_classes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_product_classes_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<ProductClassRow>> {
    sqlx::query_as::<_, ProductClassRow>(
        r#"
        SELECT id, name, slug, requires_shipping, track_stock
        FROM product_classes
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn list_options_for_class<'e>(
    executor: impl PgExecutor<'e>,
    product_class_id: Uuid,
) -> SqlxResult<Vec<OptionRow>> {
    sqlx::query_as::<_, OptionRow>(
        r#"
        SELECT o.id, o.name, o.code, o.type, o.required, o.option_group_id
        FROM options o
        JOIN product_class_options pco ON pco.option_id = o.id
        WHERE pco.product_class_id = $1
        ORDER BY o.name ASC
        "#,
    )
    .bind(product_class_id)
    .fetch_all(executor)
    .await
}

pub async fn get_options_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<OptionRow>> {
    sqlx::query_as::<_, OptionRow>(
        r#"
        SELECT id, name, code, type, required, option_group_id
        FROM options
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

// ── Attributes ──

pub async fn get_attributes_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<ProductAttributeRow>> {
    sqlx::query_as::<_, ProductAttributeRow>(
        r#"
        SELECT id, product_class_id, name, code, type, required, option_group_id
        FROM product_attributes
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn list_attribute_values_for_product<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<Vec<ProductAttributeValueRow>> {
    sqlx::query_as::<_, ProductAttributeValueRow>(
        r#"
        SELECT id, product_id, attribute_id, value_as_text
        FROM product_attribute_values
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_all(executor)
    .await
}

pub async fn get_option_group<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<AttributeOptionGroupRow>> {
    sqlx::query_as::<_, AttributeOptionGroupRow>(
        "SELECT id, name, code FROM attribute_option_groups WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_group_options<'e>(
    executor: impl PgExecutor<'e>,
    group_id: Uuid,
) -> SqlxResult<Vec<AttributeOptionRow>> {
    sqlx::query_as::<_, AttributeOptionRow>(
        r#"
        SELECT id, group_id, option, code
        FROM attribute_options
        WHERE group_id = $1
        ORDER BY option ASC
        "#,
    )
    .bind(group_id)
    .fetch_all(executor)
    .await
}

// ── Categories ──

pub async fn list_public_categories<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<CategoryRow>> {
    sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, parent_id, name, code, description, slug, is_public, meta_title,
               meta_description, image, full_name, full_slug
        FROM category_paths
        WHERE is_public
        ORDER BY full_name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_public_categories<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE is_public")
        .fetch_one(executor)
        .await
}

pub async fn get_category<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<CategoryRow>> {
    sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, parent_id, name, code, description, slug, is_public, meta_title,
               meta_description, image, full_name, full_slug
        FROM category_paths
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_public_children<'e>(
    executor: impl PgExecutor<'e>,
    parent_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<CategoryRow>> {
    sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, parent_id, name, code, description, slug, is_public, meta_title,
               meta_description, image, full_name, full_slug
        FROM category_paths
        WHERE parent_id = $1 AND is_public
        ORDER BY name ASC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(parent_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_public_children<'e>(
    executor: impl PgExecutor<'e>,
    parent_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1 AND is_public")
        .bind(parent_id)
        .fetch_one(executor)
        .await
}

/// All children, public or not.
pub async fn count_children<'e>(executor: impl PgExecutor<'e>, parent_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
        .bind(parent_id)
        .fetch_one(executor)
        .await
}

pub async fn list_categories_for_product<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<Vec<CategoryRow>> {
    sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT cp.id, cp.parent_id, cp.name, cp.code, cp.description, cp.slug, cp.is_public,
               cp.meta_title, cp.meta_description, cp.image, cp.full_name, cp.full_slug
        FROM category_paths cp
        JOIN product_categories pc ON pc.category_id = cp.id
        WHERE pc.product_id = $1
        ORDER BY cp.full_name ASC
        "#,
    )
    .bind(product_id)
    .fetch_all(executor)
    .await
}

// ── Products ──

pub async fn list_product_categories<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<Vec<ProductCategoryRow>> {
    sqlx::query_as::<_, ProductCategoryRow>(
        r#"
        SELECT id, product_id, category_id
        FROM product_categories
        WHERE product_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(product_id)
    .fetch_all(executor)
    .await
}

/// Public products restricted to the given structures.
pub async fn list_public_products<'e>(
    executor: impl PgExecutor<'e>,
    structures: &[ProductStructure],
    page: LimitOffset,
) -> SqlxResult<Vec<ProductRow>> {
    let structures: Vec<&str> = structures.iter().map(|s| s.as_str()).collect();
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, structure, parent_id, upc, title, slug, description, product_class_id,
               is_public, is_discountable, date_created, date_updated
        FROM products
        WHERE is_public AND structure = ANY($1)
        ORDER BY date_created DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&structures)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_public_products<'e>(
    executor: impl PgExecutor<'e>,
    structures: &[ProductStructure],
) -> SqlxResult<i64> {
    let structures: Vec<&str> = structures.iter().map(|s| s.as_str()).collect();
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_public AND structure = ANY($1)")
        .bind(&structures)
        .fetch_one(executor)
        .await
}

pub async fn get_product<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, structure, parent_id, upc, title, slug, description, product_class_id,
               is_public, is_discountable, date_created, date_updated
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Same as `get_product`, holding a row lock until the transaction ends.
/// Demoting a parent and attaching a variant to it both take this lock.
pub async fn lock_product<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, structure, parent_id, upc, title, slug, description, product_class_id,
               is_public, is_discountable, date_created, date_updated
        FROM products
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_products_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, structure, parent_id, upc, title, slug, description, product_class_id,
               is_public, is_discountable, date_created, date_updated
        FROM products
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn list_public_variants_of<'e>(
    executor: impl PgExecutor<'e>,
    parent_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, structure, parent_id, upc, title, slug, description, product_class_id,
               is_public, is_discountable, date_created, date_updated
        FROM products
        WHERE parent_id = $1 AND is_public
        ORDER BY date_created ASC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(parent_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_public_variants_of<'e>(
    executor: impl PgExecutor<'e>,
    parent_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE parent_id = $1 AND is_public")
        .bind(parent_id)
        .fetch_one(executor)
        .await
}

pub async fn count_variants_of<'e>(executor: impl PgExecutor<'e>, parent_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE parent_id = $1")
        .bind(parent_id)
        .fetch_one(executor)
        .await
}

pub async fn create_product<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateProductData,
) -> SqlxResult<ProductRow> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO products (title, slug, description, product_class_id, structure, parent_id,
                              upc, is_public, is_discountable)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, structure, parent_id, upc, title, slug, description, product_class_id,
                  is_public, is_discountable, date_created, date_updated
        "#,
    )
    .bind(&data.title)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(data.product_class_id)
    .bind(data.structure.as_str())
    .bind(data.parent_id)
    .bind(&data.upc)
    .bind(data.is_public)
    .bind(data.is_discountable)
    .fetch_one(executor)
    .await
}

pub async fn update_product<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateProductData,
) -> SqlxResult<Option<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        UPDATE products
        SET title = COALESCE($2, title),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            is_public = COALESCE($5, is_public),
            is_discountable = COALESCE($6, is_discountable),
            structure = COALESCE($7, structure),
            date_updated = NOW()
        WHERE id = $1
        RETURNING id, structure, parent_id, upc, title, slug, description, product_class_id,
                  is_public, is_discountable, date_created, date_updated
        "#,
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(data.is_public)
    .bind(data.is_discountable)
    .bind(data.structure.map(|s| s.as_str()))
    .fetch_optional(executor)
    .await
}

pub async fn delete_product<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Images & recommendations ──

pub async fn list_images_for_product<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<Vec<ProductImageRow>> {
    sqlx::query_as::<_, ProductImageRow>(
        r#"
        SELECT id, product_id, original, caption, display_order, date_created
        FROM product_images
        WHERE product_id = $1
        ORDER BY display_order ASC, date_created ASC
        "#,
    )
    .bind(product_id)
    .fetch_all(executor)
    .await
}

pub async fn list_recommendations_for_product<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<Vec<ProductRecommendationRow>> {
    sqlx::query_as::<_, ProductRecommendationRow>(
        r#"
        SELECT id, primary_id, recommendation_id, ranking
        FROM product_recommendations
        WHERE primary_id = $1
        ORDER BY ranking DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_transitions() {
        use ProductStructure::*;

        assert_eq!(Standalone.transition_to(Parent), Ok(Parent));
        assert_eq!(Parent.transition_to(Standalone), Ok(Standalone));
        assert_eq!(Child.transition_to(Child), Ok(Child));
        assert_eq!(
            Child.transition_to(Standalone),
            Err(StructureError::VariantToTopLevel)
        );
        assert_eq!(
            Parent.transition_to(Child),
            Err(StructureError::TopLevelToVariant)
        );
    }

    #[test]
    fn structure_parses_any_case() {
        assert_eq!("PARENT".parse::<ProductStructure>(), Ok(ProductStructure::Parent));
        assert!("variant".parse::<ProductStructure>().is_err());
    }
}
