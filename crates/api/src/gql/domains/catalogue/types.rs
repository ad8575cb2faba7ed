use async_graphql::connection::Connection;
use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{
    AttributeOptionGroupRow, AttributeOptionRow, CategoryRow, OptionRow, ProductAttributeRow,
    ProductAttributeValueRow, ProductCategoryRow, ProductClassRow, ProductImageRow,
    ProductRecommendationRow, ProductRow,
};
use infra::repos::{catalogue, ProductStructure};
use uuid::Uuid;

use crate::gql::common::paginate;
use crate::gql::error::{DbResultExt, ResultExt};
use crate::gql::loaders::{ProductClassLoader, ProductLoader};
use crate::state::AppState;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "ProductStructure")]
pub enum Structure {
    Standalone,
    Parent,
    Child,
}

impl From<ProductStructure> for Structure {
    fn from(value: ProductStructure) -> Self {
        match value {
            ProductStructure::Standalone => Structure::Standalone,
            ProductStructure::Parent => Structure::Parent,
            ProductStructure::Child => Structure::Child,
        }
    }
}

impl From<Structure> for ProductStructure {
    fn from(value: Structure) -> Self {
        match value {
            Structure::Standalone => ProductStructure::Standalone,
            Structure::Parent => ProductStructure::Parent,
            Structure::Child => ProductStructure::Child,
        }
    }
}

/// Stored structures are constrained by the schema; anything else reads
/// as standalone.
fn structure_of(row: &ProductRow) -> ProductStructure {
    row.structure.parse().unwrap_or(ProductStructure::Standalone)
}

// ── Product classes & options ──

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductClass {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub requires_shipping: bool,
    pub track_stock: bool,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<ProductClassRow> for ProductClass {
    fn from(row: ProductClassRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            slug: row.slug,
            requires_shipping: row.requires_shipping,
            track_stock: row.track_stock,
            uuid: row.id,
        }
    }
}

#[ComplexObject]
impl ProductClass {
    async fn options(&self, ctx: &Context<'_>) -> Result<Vec<ProductOption>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_options_for_class(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ProductOption::from).collect())
    }
}

impl ProductClass {
    pub async fn load(ctx: &Context<'_>, id: Option<Uuid>) -> Result<Option<ProductClass>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let loader = ctx.data::<DataLoader<ProductClassLoader>>()?;
        let row = loader
            .load_one(id)
            .await
            .gql_err("Loading product class failed")?;
        Ok(row.map(ProductClass::from))
    }
}

/// A customisation a shopper can supply for a line (engraving text and the like).
#[derive(SimpleObject, Clone)]
#[graphql(name = "Option", complex)]
pub struct ProductOption {
    pub id: ID,
    pub name: String,
    pub code: String,
    #[graphql(name = "type")]
    pub option_type: String,
    pub required: bool,
    #[graphql(skip)]
    pub option_group_id: Option<Uuid>,
}

impl From<OptionRow> for ProductOption {
    fn from(row: OptionRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
            option_type: row.option_type,
            required: row.required,
            option_group_id: row.option_group_id,
        }
    }
}

#[ComplexObject]
impl ProductOption {
    async fn option_group(&self, ctx: &Context<'_>) -> Result<Option<AttributeOptionGroup>> {
        AttributeOptionGroup::load(ctx, self.option_group_id).await
    }
}

impl ProductOption {
    pub async fn load(ctx: &Context<'_>, id: Uuid) -> Result<Option<ProductOption>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::get_options_by_ids(&state.db, &[id])
            .await
            .db_err()?;
        Ok(rows.into_iter().next().map(ProductOption::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct AttributeOptionGroup {
    pub id: ID,
    pub name: String,
    pub code: Option<String>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<AttributeOptionGroupRow> for AttributeOptionGroup {
    fn from(row: AttributeOptionGroupRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
            uuid: row.id,
        }
    }
}

#[ComplexObject]
impl AttributeOptionGroup {
    async fn options(&self, ctx: &Context<'_>) -> Result<Vec<AttributeOption>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_group_options(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(AttributeOption::from).collect())
    }
}

impl AttributeOptionGroup {
    pub async fn load(ctx: &Context<'_>, id: Option<Uuid>) -> Result<Option<Self>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let state = ctx.data::<AppState>()?;
        let row = catalogue::get_option_group(&state.db, id).await.db_err()?;
        Ok(row.map(Self::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct AttributeOption {
    pub id: ID,
    pub option: String,
    pub code: Option<String>,
    #[graphql(skip)]
    pub group_id: Uuid,
}

impl From<AttributeOptionRow> for AttributeOption {
    fn from(row: AttributeOptionRow) -> Self {
        Self {
            id: row.id.into(),
            option: row.option,
            code: row.code,
            group_id: row.group_id,
        }
    }
}

#[ComplexObject]
impl AttributeOption {
    async fn group(&self, ctx: &Context<'_>) -> Result<Option<AttributeOptionGroup>> {
        AttributeOptionGroup::load(ctx, Some(self.group_id)).await
    }
}

// ── Attributes ──

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductAttribute {
    pub id: ID,
    pub name: String,
    pub code: String,
    #[graphql(name = "type")]
    pub attribute_type: String,
    pub required: bool,
    #[graphql(skip)]
    pub option_group_id: Option<Uuid>,
}

impl From<ProductAttributeRow> for ProductAttribute {
    fn from(row: ProductAttributeRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
            attribute_type: row.attribute_type,
            required: row.required,
            option_group_id: row.option_group_id,
        }
    }
}

#[ComplexObject]
impl ProductAttribute {
    async fn option_group(&self, ctx: &Context<'_>) -> Result<Option<AttributeOptionGroup>> {
        AttributeOptionGroup::load(ctx, self.option_group_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductAttributeValue {
    pub id: ID,
    pub value_as_text: String,
    #[graphql(skip)]
    pub product_id: Uuid,
    #[graphql(skip)]
    pub attribute_id: Uuid,
}

impl From<ProductAttributeValueRow> for ProductAttributeValue {
    fn from(row: ProductAttributeValueRow) -> Self {
        Self {
            id: row.id.into(),
            value_as_text: row.value_as_text,
            product_id: row.product_id,
            attribute_id: row.attribute_id,
        }
    }
}

#[ComplexObject]
impl ProductAttributeValue {
    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }

    async fn attribute(&self, ctx: &Context<'_>) -> Result<Option<ProductAttribute>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::get_attributes_by_ids(&state.db, &[self.attribute_id])
            .await
            .db_err()?;
        Ok(rows.into_iter().next().map(ProductAttribute::from))
    }
}

// ── Categories ──

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Category {
    pub id: ID,
    pub name: String,
    pub code: Option<String>,
    pub description: String,
    pub slug: String,
    pub is_public: bool,
    /// Ancestor names joined with " > ".
    pub full_name: String,
    /// Ancestor slugs joined with "/".
    pub full_slug: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub image: Option<String>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
            description: row.description,
            slug: row.slug,
            is_public: row.is_public,
            full_name: row.full_name,
            full_slug: row.full_slug,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            image: row.image,
            uuid: row.id,
        }
    }
}

#[ComplexObject]
impl Category {
    async fn public_children(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Category>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            catalogue::count_public_children(&state.db, self.uuid),
            |page| catalogue::list_public_children(&state.db, self.uuid, page),
        )
        .await
    }

    async fn has_children(&self, ctx: &Context<'_>) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let count = catalogue::count_children(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(count > 0)
    }
}

// ── Products ──

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Product {
    pub id: ID,
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub is_discountable: bool,
    pub upc: Option<String>,
    pub structure: Structure,
    pub slug: String,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub product_class_id: Option<Uuid>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id.into(),
            structure: structure_of(&row).into(),
            title: row.title,
            description: row.description,
            is_public: row.is_public,
            date_created: row.date_created,
            date_updated: row.date_updated,
            is_discountable: row.is_discountable,
            upc: row.upc,
            slug: row.slug,
            uuid: row.id,
            product_class_id: row.product_class_id,
        }
    }
}

impl Product {
    /// Batch-load a related product through the request's `ProductLoader`.
    pub async fn load(ctx: &Context<'_>, id: Uuid) -> Result<Option<Product>> {
        let loader = ctx.data::<DataLoader<ProductLoader>>()?;
        let row = loader.load_one(id).await.gql_err("Loading product failed")?;
        Ok(row.map(Product::from))
    }

    pub async fn load_opt(ctx: &Context<'_>, id: Option<Uuid>) -> Result<Option<Product>> {
        match id {
            Some(id) => Product::load(ctx, id).await,
            None => Ok(None),
        }
    }
}

#[ComplexObject]
impl Product {
    async fn product_class(&self, ctx: &Context<'_>) -> Result<Option<ProductClass>> {
        ProductClass::load(ctx, self.product_class_id).await
    }

    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<Category>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_categories_for_product(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn product_categories(&self, ctx: &Context<'_>) -> Result<Vec<ProductCategory>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_product_categories(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ProductCategory::from).collect())
    }

    async fn is_standalone(&self) -> bool {
        self.structure == Structure::Standalone
    }

    async fn is_parent(&self) -> bool {
        self.structure == Structure::Parent
    }

    /// Public variants of a parent product; empty for other structures.
    async fn variants(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Variant>> {
        if self.structure != Structure::Parent {
            return Ok(Connection::new(false, false));
        }

        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            catalogue::count_public_variants_of(&state.db, self.uuid),
            |page| catalogue::list_public_variants_of(&state.db, self.uuid, page),
        )
        .await
    }

    /// URL of the first image by display order.
    async fn primary_image(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let state = ctx.data::<AppState>()?;
        let images = catalogue::list_images_for_product(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(images.into_iter().next().map(|image| image.original))
    }

    async fn images(&self, ctx: &Context<'_>) -> Result<Vec<ProductImage>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_images_for_product(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ProductImage::from).collect())
    }

    async fn attribute_values(&self, ctx: &Context<'_>) -> Result<Vec<ProductAttributeValue>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_attribute_values_for_product(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ProductAttributeValue::from).collect())
    }

    async fn recommendations(&self, ctx: &Context<'_>) -> Result<Vec<ProductRecommendation>> {
        let state = ctx.data::<AppState>()?;
        let rows = catalogue::list_recommendations_for_product(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ProductRecommendation::from).collect())
    }
}

/// A child product, seen from the variant side.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Variant {
    pub id: ID,
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub is_discountable: bool,
    pub upc: Option<String>,
    pub structure: Structure,
    pub slug: String,
    #[graphql(skip)]
    pub parent_id: Option<Uuid>,
    #[graphql(skip)]
    pub product_class_id: Option<Uuid>,
}

impl From<ProductRow> for Variant {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id.into(),
            structure: structure_of(&row).into(),
            title: row.title,
            description: row.description,
            is_public: row.is_public,
            date_created: row.date_created,
            date_updated: row.date_updated,
            is_discountable: row.is_discountable,
            upc: row.upc,
            slug: row.slug,
            parent_id: row.parent_id,
            product_class_id: row.product_class_id,
        }
    }
}

#[ComplexObject]
impl Variant {
    async fn parent(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        if self.structure != Structure::Child {
            return Ok(None);
        }
        Product::load_opt(ctx, self.parent_id).await
    }

    async fn product_class(&self, ctx: &Context<'_>) -> Result<Option<ProductClass>> {
        ProductClass::load(ctx, self.product_class_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductCategory {
    pub id: ID,
    #[graphql(skip)]
    pub product_id: Uuid,
    #[graphql(skip)]
    pub category_id: Uuid,
}

impl From<ProductCategoryRow> for ProductCategory {
    fn from(row: ProductCategoryRow) -> Self {
        Self {
            id: row.id.into(),
            product_id: row.product_id,
            category_id: row.category_id,
        }
    }
}

#[ComplexObject]
impl ProductCategory {
    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }

    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        let state = ctx.data::<AppState>()?;
        let row = catalogue::get_category(&state.db, self.category_id)
            .await
            .db_err()?;
        Ok(row.map(Category::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductRecommendation {
    pub id: ID,
    pub ranking: i32,
    #[graphql(skip)]
    pub primary_id: Uuid,
    #[graphql(skip)]
    pub recommendation_id: Uuid,
}

impl From<ProductRecommendationRow> for ProductRecommendation {
    fn from(row: ProductRecommendationRow) -> Self {
        Self {
            id: row.id.into(),
            ranking: row.ranking.into(),
            primary_id: row.primary_id,
            recommendation_id: row.recommendation_id,
        }
    }
}

#[ComplexObject]
impl ProductRecommendation {
    async fn primary(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.primary_id).await
    }

    async fn recommendation(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.recommendation_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductImage {
    pub id: ID,
    pub original: String,
    pub caption: String,
    pub display_order: i32,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub product_id: Uuid,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: row.id.into(),
            original: row.original,
            caption: row.caption,
            display_order: row.display_order,
            date_created: row.date_created,
            product_id: row.product_id,
        }
    }
}

#[ComplexObject]
impl ProductImage {
    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }
}

// ── Inputs & payloads ──

#[derive(InputObject)]
pub struct CreateProductInput {
    pub title: String,
    pub description: Option<String>,
    pub product_class_id: ID,
    #[graphql(default = true)]
    pub is_public: bool,
    #[graphql(default = true)]
    pub is_discountable: bool,
    pub structure: Structure,
    /// Required for variants, ignored otherwise.
    pub parent_id: Option<ID>,
    pub upc: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateProductInput {
    pub id: ID,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub is_discountable: Option<bool>,
    pub structure: Option<Structure>,
}

#[derive(SimpleObject)]
pub struct ProductPayload {
    pub product: Product,
}
