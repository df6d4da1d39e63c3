use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use shared::dto::{CatalogStats, ProductResponse, SearchHit};

const DESCRIPTION_WIDTH: usize = 48;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn price(p: Option<f64>) -> String {
    p.map(|p| format!("${:.2}", p)).unwrap_or_else(|| "-".to_string())
}

fn flag(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

pub fn products_table(products: &[ProductResponse]) -> Table {
    let mut t = table(vec!["ID", "Name", "Category", "Price", "Text", "Multimodal", "Image"]);
    for p in products {
        t.add_row(vec![
            Cell::new(p.id),
            Cell::new(&p.name),
            Cell::new(p.category.as_deref().unwrap_or("-")),
            Cell::new(price(p.price)),
            Cell::new(flag(p.has_text_embedding)),
            Cell::new(flag(p.has_multimodal_embedding)),
            Cell::new(flag(p.image_url.is_some())),
        ]);
    }
    t
}

pub fn product_detail(p: &ProductResponse) -> Table {
    let mut t = table(vec!["Field", "Value"]);
    t.add_row(vec!["ID".to_string(), p.id.to_string()]);
    t.add_row(vec!["Name".to_string(), p.name.clone()]);
    t.add_row(vec!["Description".to_string(), p.description.clone()]);
    t.add_row(vec![
        "Category".to_string(),
        p.category.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    t.add_row(vec!["Price".to_string(), price(p.price)]);
    t.add_row(vec![
        "Image".to_string(),
        p.image_url.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    t.add_row(vec![
        "Embeddings".to_string(),
        format!(
            "text: {}, multimodal: {}",
            flag(p.has_text_embedding),
            flag(p.has_multimodal_embedding)
        ),
    ]);
    t.add_row(vec!["Created".to_string(), p.created_at.to_rfc3339()]);
    t
}

pub fn hits_table(hits: &[SearchHit]) -> Table {
    let mut t = table(vec!["Rank", "Score", "ID", "Name", "Category", "Description"]);
    for (i, hit) in hits.iter().enumerate() {
        t.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:.4}", hit.similarity_score)),
            Cell::new(hit.product.id),
            Cell::new(&hit.product.name),
            Cell::new(hit.product.category.as_deref().unwrap_or("-")),
            Cell::new(truncate(&hit.product.description, DESCRIPTION_WIDTH)),
        ]);
    }
    t
}

pub fn summary_table(stats: &CatalogStats) -> Table {
    let mut t = table(vec!["Metric", "Value"]);
    let rows = [
        ("Products", stats.total_products.to_string()),
        ("With text embedding", stats.with_text_embedding.to_string()),
        (
            "With multimodal embedding",
            stats.with_multimodal_embedding.to_string(),
        ),
        ("With image", stats.with_image.to_string()),
        ("Uncategorized", stats.uncategorized.to_string()),
    ];
    for (k, v) in rows {
        t.add_row(vec![k.to_string(), v]);
    }
    if let Some(p) = &stats.price {
        t.add_row(vec!["Priced".to_string(), p.count.to_string()]);
        t.add_row(vec![
            "Price range".to_string(),
            format!("{} – {}", price(Some(p.min)), price(Some(p.max))),
        ]);
        t.add_row(vec!["Mean price".to_string(), price(Some(p.mean))]);
    }
    t
}

pub fn categories_table(stats: &CatalogStats) -> Table {
    let mut t = table(vec!["Category", "Products"]);
    for c in &stats.categories {
        t.add_row(vec![c.category.clone(), c.count.to_string()]);
    }
    t
}

/// Text bar chart of the price histogram.
pub fn histogram_lines(stats: &CatalogStats, width: usize) -> Vec<String> {
    let max = stats
        .price_histogram
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    stats
        .price_histogram
        .iter()
        .map(|b| {
            let bar = if max == 0 { 0 } else { b.count * width / max };
            format!(
                "{:>10} – {:<10} {} {}",
                price(Some(b.lower)),
                price(Some(b.upper)),
                "█".repeat(bar),
                b.count
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::{CategoryCount, PriceBucket};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_histogram_bars_scale_to_width() {
        let stats = CatalogStats {
            price_histogram: vec![
                PriceBucket { lower: 0.0, upper: 10.0, count: 4 },
                PriceBucket { lower: 10.0, upper: 20.0, count: 2 },
                PriceBucket { lower: 20.0, upper: 30.0, count: 0 },
            ],
            ..Default::default()
        };
        let lines = histogram_lines(&stats, 20);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].matches('█').count(), 20);
        assert_eq!(lines[1].matches('█').count(), 10);
        assert_eq!(lines[2].matches('█').count(), 0);
    }

    #[test]
    fn test_tables_render_rows() {
        let stats = CatalogStats {
            total_products: 3,
            categories: vec![CategoryCount {
                category: "Office".to_string(),
                count: 3,
            }],
            ..Default::default()
        };
        let rendered = categories_table(&stats).to_string();
        assert!(rendered.contains("Office"));
        assert!(summary_table(&stats).to_string().contains("Products"));
    }
}
