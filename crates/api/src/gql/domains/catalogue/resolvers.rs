use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::keys::slugify;
use infra::repos::{
    catalogue::{self, CreateProductData, UpdateProductData},
    ProductStructure,
};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    Category, CreateProductInput, Product, ProductClass, ProductPayload, UpdateProductInput,
    Variant,
};

const TOP_LEVEL: [ProductStructure; 2] = [ProductStructure::Standalone, ProductStructure::Parent];
const VARIANTS: [ProductStructure; 1] = [ProductStructure::Child];

#[derive(Default)]
pub struct CatalogueQuery;

#[Object]
impl CatalogueQuery {
    /// Public standalone and parent products.
    async fn products(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Product>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            catalogue::count_public_products(&state.db, &TOP_LEVEL),
            |page| catalogue::list_public_products(&state.db, &TOP_LEVEL, page),
        )
        .await
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Product>> {
        let state = ctx.data::<AppState>()?;
        let product_id = parse_id(&id, "product")?;
        let row = catalogue::get_product(&state.db, product_id).await.db_err()?;
        Ok(row.map(Product::from))
    }

    /// Public child products.
    async fn variants(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Variant>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            catalogue::count_public_products(&state.db, &VARIANTS),
            |page| catalogue::list_public_products(&state.db, &VARIANTS, page),
        )
        .await
    }

    async fn categories(
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
            catalogue::count_public_categories(&state.db),
            |page| catalogue::list_public_categories(&state.db, page),
        )
        .await
    }

    async fn category(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Category>> {
        let state = ctx.data::<AppState>()?;
        let category_id = parse_id(&id, "category")?;
        let row = catalogue::get_category(&state.db, category_id)
            .await
            .db_err()?;
        Ok(row.map(Category::from))
    }

    async fn product_classes(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, ProductClass>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            catalogue::count_product_classes(&state.db),
            |page| catalogue::list_product_classes(&state.db, page),
        )
        .await
    }
}

#[derive(Default)]
pub struct CatalogueMutation;

#[Object]
impl CatalogueMutation {
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: CreateProductInput,
    ) -> Result<ProductPayload> {
        require_user(ctx, "create a product").await?;
        let state = ctx.data::<AppState>()?;

        let product_class_id = parse_id(&input.product_class_id, "product class")?;
        if catalogue::get_product_class(&state.db, product_class_id)
            .await
            .db_err()?
            .is_none()
        {
            return Err(Error::new("Product class not found."));
        }

        let structure = ProductStructure::from(input.structure);
        let mut tx = state.db.begin().await.db_err()?;
        let parent_id = match (structure, input.parent_id.as_ref()) {
            (ProductStructure::Child, Some(parent_id)) => {
                let parent_id = parse_id(parent_id, "parent product")?;
                let parent = catalogue::lock_product(&mut *tx, parent_id)
                    .await
                    .db_err()?
                    .ok_or_else(|| Error::new("Parent product not found."))?;
                if parent.structure != ProductStructure::Parent.as_str() {
                    return Err(Error::new("A variant's parent must be a parent product."));
                }
                Some(parent_id)
            }
            (ProductStructure::Child, None) => {
                return Err(Error::new("A variant requires a parent product."));
            }
            _ => None,
        };

        let row = catalogue::create_product(
            &mut *tx,
            CreateProductData {
                slug: slugify(&input.title),
                title: input.title,
                description: input.description.unwrap_or_default(),
                product_class_id,
                structure,
                parent_id,
                upc: input.upc,
                is_public: input.is_public,
                is_discountable: input.is_discountable,
            },
        )
        .await
        .db_err()?;
        tx.commit().await.db_err()?;

        tracing::info!(product_id = %row.id, structure = %row.structure, "Product created");
        Ok(ProductPayload {
            product: row.into(),
        })
    }

    /// Variants stay variants; standalone and parent products may swap.
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        input: UpdateProductInput,
    ) -> Result<ProductPayload> {
        require_user(ctx, "update a product").await?;
        let state = ctx.data::<AppState>()?;
        let product_id = parse_id(&input.id, "product")?;

        let mut tx = state.db.begin().await.db_err()?;
        let existing = catalogue::lock_product(&mut *tx, product_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product not found."))?;

        let structure = match input.structure {
            Some(next) => {
                let current: ProductStructure = existing
                    .structure
                    .parse()
                    .map_err(|e: String| Error::new(e))?;
                let next = current.transition_to(next.into())?;
                if current == ProductStructure::Parent
                    && next != ProductStructure::Parent
                    && catalogue::count_variants_of(&mut *tx, product_id)
                        .await
                        .db_err()?
                        > 0
                {
                    return Err(Error::new(
                        "Cannot change a parent product with variants to standalone. Delete the variants first.",
                    ));
                }
                Some(next)
            }
            None => None,
        };

        let data = UpdateProductData {
            title: input.title,
            slug: None,
            description: input.description,
            is_public: input.is_public,
            is_discountable: input.is_discountable,
            structure,
        };
        let row = catalogue::update_product(&mut *tx, product_id, data)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product not found."))?;
        tx.commit().await.db_err()?;

        Ok(ProductPayload {
            product: row.into(),
        })
    }

    async fn delete_product(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        require_user(ctx, "delete a product").await?;
        let state = ctx.data::<AppState>()?;
        let product_id = parse_id(&id, "product")?;

        catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product not found."))?;

        // Variants cascade with their parent, so any product that still has
        // them is refused whatever its stored structure says.
        if catalogue::count_variants_of(&state.db, product_id)
            .await
            .db_err()?
            > 0
        {
            return Err(Error::new(
                "Cannot delete a parent product with variants. Delete the variants first.",
            ));
        }

        catalogue::delete_product(&state.db, product_id)
            .await
            .db_err()?;

        tracing::info!(product_id = %product_id, "Product deleted");
        Ok(true.into())
    }
}
