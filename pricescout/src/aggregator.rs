use crate::domain::{AggregatedResult, Grouped, SourceGroup, SourceResult};
use chrono::Utc;
use shared::config::ProductOrdering;

/// Merges per-connector outputs into the grouped response shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultAggregator {
    ordering: ProductOrdering,
}

impl ResultAggregator {
    pub fn new(ordering: ProductOrdering) -> Self {
        Self { ordering }
    }

    /// `results` must already be in registry order. Failed and empty sources
    /// are left out of `grouped`.
    pub fn merge(&self, results: Vec<SourceResult>) -> AggregatedResult {
        let groups: Vec<SourceGroup> = results
            .into_iter()
            .filter(|r| !r.is_failure() && !r.products.is_empty())
            .map(|r| {
                let mut products = r.products;
                if self.ordering == ProductOrdering::PriceAscending {
                    products.sort_by(|a, b| a.price.total_cmp(&b.price));
                }
                SourceGroup {
                    source: r.source,
                    products,
                }
            })
            .collect();

        let grouped = Grouped::new(groups);
        AggregatedResult {
            count: grouped.product_count(),
            grouped,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use crate::testing::product;

    fn titles(result: &AggregatedResult, source: &str) -> Vec<String> {
        result
            .grouped
            .get(source)
            .unwrap()
            .iter()
            .map(|p| p.title.clone())
            .collect()
    }

    fn sample() -> Vec<SourceResult> {
        vec![
            SourceResult::success(
                "Daraz",
                vec![
                    product("Daraz", "d-expensive", 900.0),
                    product("Daraz", "d-cheap", 100.0),
                ],
            ),
            SourceResult::success("PriceOye", vec![]),
            SourceResult::failure("OLX", ConnectorError::Timeout(5)),
            SourceResult::success("Telemart", vec![product("Telemart", "t", 50.0)]),
        ]
    }

    #[test]
    fn test_merge_groups_non_empty_sources_in_given_order() {
        let result = ResultAggregator::default().merge(sample());

        let sources: Vec<&str> = result.grouped.sources().collect();
        assert_eq!(sources, vec!["Daraz", "Telemart"]);
        assert_eq!(result.count, 3);
        assert_eq!(result.count, result.grouped.product_count());
    }

    #[test]
    fn test_delivery_order_is_preserved() {
        let result = ResultAggregator::new(ProductOrdering::Delivery).merge(sample());
        assert_eq!(titles(&result, "Daraz"), vec!["d-expensive", "d-cheap"]);
    }

    #[test]
    fn test_price_ordering_sorts_within_source_only() {
        let result = ResultAggregator::new(ProductOrdering::PriceAscending).merge(sample());
        assert_eq!(titles(&result, "Daraz"), vec!["d-cheap", "d-expensive"]);

        // Telemart's cheaper item does not move ahead of the Daraz group
        let sources: Vec<&str> = result.grouped.sources().collect();
        assert_eq!(sources, vec!["Daraz", "Telemart"]);
    }

    #[test]
    fn test_merge_of_nothing() {
        let result = ResultAggregator::default().merge(Vec::new());
        assert_eq!(result.count, 0);
        assert!(result.grouped.is_empty());
    }
}
