use crate::client::ApiClient;
use anyhow::Result;
use clap::Args;
use cliclack::{intro, log, outro};
use shared::dto::ProductResponse;

const PAGE_SIZE: usize = 100;

#[derive(Args, Debug)]
pub struct CheckEmbeddingsCommand {}

#[derive(Debug, Default, PartialEq)]
pub struct EmbeddingReport {
    pub total: usize,
    pub missing_text: Vec<(i32, String)>,
    pub missing_multimodal: Vec<(i32, String)>,
}

impl EmbeddingReport {
    pub fn from_products(products: &[ProductResponse]) -> Self {
        let mut report = EmbeddingReport {
            total: products.len(),
            ..Default::default()
        };
        for p in products {
            if !p.has_text_embedding {
                report.missing_text.push((p.id, p.name.clone()));
            }
            if !p.has_multimodal_embedding {
                report.missing_multimodal.push((p.id, p.name.clone()));
            }
        }
        report
    }
}

impl CheckEmbeddingsCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        intro(console::style("Embedding coverage").bold())?;

        let mut products = Vec::new();
        loop {
            let page = client.list_products(products.len(), PAGE_SIZE, None).await?;
            let done = page.len() < PAGE_SIZE;
            products.extend(page);
            if done {
                break;
            }
        }

        let report = EmbeddingReport::from_products(&products);
        log::info(format!("{} product(s) checked", report.total))?;

        for (label, missing) in [
            ("text", &report.missing_text),
            ("multimodal", &report.missing_multimodal),
        ] {
            if missing.is_empty() {
                log::success(format!("Every product has a {} embedding", label))?;
                continue;
            }
            let names: Vec<String> = missing
                .iter()
                .map(|(id, name)| format!("#{} {}", id, name))
                .collect();
            log::warning(format!(
                "{} product(s) without a {} embedding:\n{}",
                missing.len(),
                label,
                names.join("\n")
            ))?;
        }

        outro("Done")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, text: bool, multimodal: bool) -> ProductResponse {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Product {}", id),
            "description": "",
            "image_url": null,
            "category": null,
            "price": null,
            "created_at": "2024-01-01T00:00:00Z",
            "has_text_embedding": text,
            "has_multimodal_embedding": multimodal,
        }))
        .unwrap()
    }

    #[test]
    fn test_report_lists_missing_kinds() {
        let products = vec![
            product(1, true, true),
            product(2, true, false),
            product(3, false, false),
        ];
        let report = EmbeddingReport::from_products(&products);

        assert_eq!(report.total, 3);
        assert_eq!(report.missing_text, vec![(3, "Product 3".to_string())]);
        assert_eq!(
            report.missing_multimodal.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn test_empty_catalog() {
        assert_eq!(EmbeddingReport::from_products(&[]), EmbeddingReport::default());
    }
}
