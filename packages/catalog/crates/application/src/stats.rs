use domain::Product;
use shared::dto::{CatalogStats, CategoryCount, PriceBucket, PriceSummary};
use std::collections::HashMap;

pub const HISTOGRAM_BUCKETS: usize = 10;

/// Aggregates a full product listing into the `/stats` payload.
pub fn summarize(products: &[Product]) -> CatalogStats {
    let mut by_category: HashMap<&str, usize> = HashMap::new();
    let mut uncategorized = 0;
    for p in products {
        match p.category.as_deref() {
            Some(c) => *by_category.entry(c).or_default() += 1,
            None => uncategorized += 1,
        }
    }

    let mut categories: Vec<CategoryCount> = by_category
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

    let prices: Vec<f64> = products.iter().filter_map(|p| p.price).collect();

    CatalogStats {
        total_products: products.len(),
        with_text_embedding: products.iter().filter(|p| p.text_embedding.is_some()).count(),
        with_multimodal_embedding: products
            .iter()
            .filter(|p| p.multimodal_embedding.is_some())
            .count(),
        with_image: products.iter().filter(|p| p.image.is_some()).count(),
        uncategorized,
        categories,
        price: price_summary(&prices),
        price_histogram: histogram(&prices, HISTOGRAM_BUCKETS),
    }
}

fn price_summary(prices: &[f64]) -> Option<PriceSummary> {
    if prices.is_empty() {
        return None;
    }
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    Some(PriceSummary {
        count: prices.len(),
        min,
        max,
        mean,
    })
}

/// Fixed-width buckets over `[min, max]`. A single bucket when every price is
/// the same.
fn histogram(prices: &[f64], buckets: usize) -> Vec<PriceBucket> {
    let Some(summary) = price_summary(prices) else {
        return Vec::new();
    };
    let (min, max) = (summary.min, summary.max);

    if buckets == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![PriceBucket {
            lower: min,
            upper: max,
            count: prices.len(),
        }];
    }

    let width = (max - min) / buckets as f64;
    let mut out: Vec<PriceBucket> = (0..buckets)
        .map(|i| PriceBucket {
            lower: min + width * i as f64,
            upper: if i + 1 == buckets {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for price in prices {
        let slot = (((price - min) / width) as usize).min(buckets - 1);
        out[slot].count += 1;
    }
    out
}
