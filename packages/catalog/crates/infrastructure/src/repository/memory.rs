use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use domain::{
    CatalogRepository, Embedding, EmbeddingKind, ListFilter, Product, ProductDraft, ProductId,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: ProductId,
    products: BTreeMap<ProductId, Product>,
}

/// Catalog held in process memory. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryCatalogRepository {
    inner: RwLock<Inner>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn insert(&self, draft: ProductDraft) -> Result<Product> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();

        let product = Product {
            id,
            name: draft.product.name,
            description: draft.product.description,
            category: draft.product.category,
            price: draft.product.price,
            image: draft.image,
            text_embedding: draft.text_embedding,
            multimodal_embedding: draft.multimodal_embedding,
            created_at: now,
            updated_at: now,
        };
        inner.products.insert(id, product.clone());
        Ok(product)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .values()
            .filter(|p| match &filter.category {
                Some(c) => p.category.as_deref() == Some(c.as_str()),
                None => true,
            })
            .skip(filter.skip)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        Ok(self.inner.write().await.products.remove(&id).is_some())
    }

    async fn embeddings_for_kind(
        &self,
        kind: EmbeddingKind,
        exclude: Option<ProductId>,
    ) -> Result<Vec<(ProductId, Embedding)>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .values()
            .filter(|p| Some(p.id) != exclude)
            .filter_map(|p| p.embedding(kind).map(|e| (p.id, e.clone())))
            .collect())
    }

    async fn embedding_for_product(
        &self,
        id: ProductId,
        kind: EmbeddingKind,
    ) -> Result<Option<Embedding>> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .get(&id)
            .and_then(|p| p.embedding(kind).cloned()))
    }

    async fn materialize(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.products.get(id).cloned())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::NewProduct;

    fn draft(name: &str, category: Option<&str>, text: Option<Vec<f32>>) -> ProductDraft {
        let mut product = NewProduct::new(name, format!("{} description", name));
        product.category = category.map(str::to_string);
        ProductDraft {
            product,
            image: None,
            text_embedding: text.map(|v| Embedding::new(v).unwrap()),
            multimodal_embedding: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_not_reused() {
        let repo = MemoryCatalogRepository::new();
        let a = repo.insert(draft("a", None, None)).await.unwrap();
        let b = repo.insert(draft("b", None, None)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(repo.delete(b.id).await.unwrap());
        assert!(!repo.delete(b.id).await.unwrap());

        let c = repo.insert(draft("c", None, None)).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let repo = MemoryCatalogRepository::new();
        for (name, cat) in [("a", "x"), ("b", "y"), ("c", "x"), ("d", "x")] {
            repo.insert(draft(name, Some(cat), None)).await.unwrap();
        }

        let filter = ListFilter {
            skip: 1,
            limit: 1,
            category: Some("x".to_string()),
        };
        let page = repo.list(&filter).await.unwrap();
        let names: Vec<&str> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c"]);

        assert_eq!(repo.list(&ListFilter::default()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_embeddings_for_kind_excludes_and_skips_missing() {
        let repo = MemoryCatalogRepository::new();
        repo.insert(draft("a", None, Some(vec![1.0, 0.0]))).await.unwrap();
        repo.insert(draft("b", None, None)).await.unwrap();
        repo.insert(draft("c", None, Some(vec![0.0, 1.0]))).await.unwrap();

        let all = repo
            .embeddings_for_kind(EmbeddingKind::Text, None)
            .await
            .unwrap();
        let ids: Vec<ProductId> = all.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 3]);

        let without_first = repo
            .embeddings_for_kind(EmbeddingKind::Text, Some(1))
            .await
            .unwrap();
        assert_eq!(without_first.len(), 1);
        assert_eq!(without_first[0].0, 3);

        assert!(repo
            .embeddings_for_kind(EmbeddingKind::Multimodal, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_materialize_keeps_order_and_skips_gone() {
        let repo = MemoryCatalogRepository::new();
        for name in ["a", "b", "c"] {
            repo.insert(draft(name, None, None)).await.unwrap();
        }
        repo.delete(2).await.unwrap();

        let products = repo.materialize(&[3, 2, 1]).await.unwrap();
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
