use async_graphql::dataloader::Loader;
use infra::{
    db::Db,
    models::{CountryRow, OrderRow, PartnerRow, ProductClassRow, ProductRow, StockRecordRow, UserRow},
    repos::{address, catalogue, customer, order, partner},
};
use std::{collections::HashMap, future::Future, sync::Arc};
use uuid::Uuid;

// UserLoader - batch load users by ID
#[derive(Clone)]
pub struct UserLoader {
    pool: Db,
}

impl UserLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for UserLoader {
    type Value = UserRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = customer::get_users_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// ProductLoader - batch load products by ID
#[derive(Clone)]
pub struct ProductLoader {
    pool: Db,
}

impl ProductLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for ProductLoader {
    type Value = ProductRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = catalogue::get_products_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// ProductClassLoader - batch load product classes by ID
#[derive(Clone)]
pub struct ProductClassLoader {
    pool: Db,
}

impl ProductClassLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for ProductClassLoader {
    type Value = ProductClassRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = catalogue::get_product_classes_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// CountryLoader - batch load countries by ISO alpha-2 code
#[derive(Clone)]
pub struct CountryLoader {
    pool: Db,
}

impl CountryLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<String> for CountryLoader {
    type Value = CountryRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[String],
    ) -> impl Future<Output = std::result::Result<HashMap<String, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let codes: Vec<String> = keys.to_vec();

        async move {
            if codes.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = address::get_countries_by_codes(&pool, &codes)
                .await
                .map_err(Arc::new)?;

            Ok(rows
                .into_iter()
                .map(|r| (r.iso_3166_1_a2.clone(), r))
                .collect())
        }
    }
}

// PartnerLoader - batch load partners by ID
#[derive(Clone)]
pub struct PartnerLoader {
    pool: Db,
}

impl PartnerLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for PartnerLoader {
    type Value = PartnerRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = partner::get_partners_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// StockRecordLoader - batch load stock records by ID
#[derive(Clone)]
pub struct StockRecordLoader {
    pool: Db,
}

impl StockRecordLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for StockRecordLoader {
    type Value = StockRecordRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = partner::get_stock_records_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// OrderLoader - batch load orders by ID
#[derive(Clone)]
pub struct OrderLoader {
    pool: Db,
}

impl OrderLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for OrderLoader {
    type Value = OrderRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows = order::get_orders_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}
