//! In-memory [`CatalogApi`] for store tests.
//!
//! Serves a fixed product list, records every call, and can hold individual
//! requests open until a test releases them.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stockroom_core::ProductId;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::{CatalogApi, CatalogError, Category, Product, ProductPage, cancellable};

/// Everything the fake has been asked for, in order.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub pages: Vec<u32>,
    pub searches: Vec<(String, u32)>,
    pub categories: Vec<(String, u32)>,
    pub category_limits: Vec<u32>,
    pub category_lists: usize,
    pub singles: Vec<ProductId>,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.pages.len()
            + self.searches.len()
            + self.categories.len()
            + self.category_lists
            + self.singles.len()
    }
}

pub struct FakeCatalog {
    products: Vec<Product>,
    category_list: Vec<Category>,
    honor_cancellation: bool,
    calls: Mutex<Calls>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failures: Mutex<HashMap<String, CatalogError>>,
}

/// A product with a given id and category, price derived from the id.
pub fn product_in(id: u32, category: &str) -> Product {
    product(id, &format!("Product {id:03}"), i64::from(id) * 100, category)
}

/// A product with explicit title and price (in cents).
pub fn product(id: u32, title: &str, cents: i64, category: &str) -> Product {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "price": f64::from(i32::try_from(cents).unwrap()) / 100.0,
        "category": category,
        "stock": 25,
        "thumbnail": format!("https://cdn.example.com/{id}/thumbnail.webp"),
    }))
    .unwrap()
}

fn page_of(matches: Vec<Product>, limit: u32, skip: u32) -> ProductPage {
    let total = u32::try_from(matches.len()).unwrap();
    let products = matches
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect();
    ProductPage {
        products,
        total,
        skip,
        limit,
    }
}

impl FakeCatalog {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products: Vec<Product> = products.into_iter().collect();
        let mut slugs: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
        slugs.dedup();
        let category_list = slugs
            .into_iter()
            .map(|slug| Category {
                name: slug.replace('-', " "),
                url: format!("https://catalog.example.com/products/category/{slug}"),
                slug,
            })
            .collect();
        Self {
            products,
            category_list,
            honor_cancellation: true,
            calls: Mutex::new(Calls::default()),
            gates: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// `count` products in `category`, ids starting at 1.
    pub fn numbered(count: u32, category: &str) -> Self {
        Self::with_products((1..=count).map(|id| product_in(id, category)))
    }

    /// Keep returning search results even after the token fires.
    pub fn ignoring_cancellation(mut self) -> Self {
        self.honor_cancellation = false;
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    /// Hold requests with this key open until [`release`](Self::release).
    ///
    /// Keys: `page:{skip}`, `search:{query}:{skip}`, `category:{slug}:{skip}`,
    /// `categories`, `product:{id}`.
    pub fn hold(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(key) {
            gate.notify_one();
        }
    }

    /// Fail the next request with this key.
    pub fn fail(&self, key: &str, error: CatalogError) {
        self.failures.lock().unwrap().insert(key.to_string(), error);
    }

    async fn respond<T>(&self, key: String, value: impl FnOnce() -> T) -> Result<T, CatalogError> {
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.failures.lock().unwrap().remove(&key) {
            return Err(error);
        }
        Ok(value())
    }

    fn matching(&self, predicate: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.products.iter().filter(|p| predicate(p)).cloned().collect()
    }
}

impl CatalogApi for FakeCatalog {
    async fn fetch_page(&self, limit: u32, skip: u32) -> Result<ProductPage, CatalogError> {
        self.calls.lock().unwrap().pages.push(skip);
        self.respond(format!("page:{skip}"), || {
            page_of(self.products.clone(), limit, skip)
        })
        .await
    }

    async fn fetch_by_search(
        &self,
        query: &str,
        limit: u32,
        skip: u32,
        cancel: &CancellationToken,
    ) -> Result<ProductPage, CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .searches
            .push((query.to_string(), skip));
        let needle = query.to_lowercase();
        let response = self.respond(format!("search:{query}:{skip}"), || {
            page_of(
                self.matching(|p| p.title.to_lowercase().contains(&needle)),
                limit,
                skip,
            )
        });
        if self.honor_cancellation {
            cancellable(cancel, response).await
        } else {
            response.await
        }
    }

    async fn fetch_by_category(
        &self,
        slug: &str,
        limit: u32,
        skip: u32,
    ) -> Result<ProductPage, CatalogError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.categories.push((slug.to_string(), skip));
            calls.category_limits.push(limit);
        }
        self.respond(format!("category:{slug}:{skip}"), || {
            page_of(self.matching(|p| p.category == slug), limit, skip)
        })
        .await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.calls.lock().unwrap().category_lists += 1;
        self.respond("categories".to_string(), || self.category_list.clone())
            .await
    }

    async fn fetch_one(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.calls.lock().unwrap().singles.push(id);
        let found = self
            .respond(format!("product:{id}"), || {
                self.products.iter().find(|p| p.id == id).cloned()
            })
            .await?;
        found.ok_or(CatalogError::NotFound(id))
    }
}
