use crate::{filter::FilterStrategy, sort::SortOption, SharedRestaurant};

/// Runs each filter in order, feeding one's output into the next, then sorts.
///
/// `restaurants` is only read; the result shares its elements.
pub fn process(
    restaurants: &[SharedRestaurant],
    filters: &[FilterStrategy],
    sort: SortOption,
) -> Vec<SharedRestaurant> {
    let _span = tracing::debug_span!(
        "process_restaurants",
        total = restaurants.len(),
        filters = filters.len(),
        %sort
    )
    .entered();

    let mut remaining: Option<Vec<SharedRestaurant>> = None;
    for filter in filters {
        let input = remaining.as_deref().unwrap_or(restaurants);
        remaining = Some(filter.apply(input));
    }
    let processed = sort.sort(remaining.as_deref().unwrap_or(restaurants));

    tracing::debug!(processed = processed.len(), "restaurants processed");
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filter::FilterOptions,
        test_support::{named, restaurant_ids},
    };
    use nosh_jet::{restaurant::Rating, Restaurant};
    use std::sync::Arc;

    fn fixture() -> Vec<SharedRestaurant> {
        let with = |id: &str, name: &str, stars: f64, open: bool, cost: f64| {
            Arc::new(Restaurant {
                id: id.to_string(),
                name: Some(name.to_string()),
                rating: Some(Rating {
                    star_rating: Some(stars),
                    count: Some(10),
                }),
                is_open_now_for_delivery: Some(open),
                delivery_cost: Some(cost),
                ..Default::default()
            })
        };
        vec![
            with("1", "Pizza Palace", 4.1, true, 0.0),
            with("2", "Pizza Hut", 4.7, true, 1.99),
            with("3", "Pizza Express", 4.9, false, 0.0),
            with("4", "Burger King", 3.2, true, 0.0),
        ]
    }

    #[test]
    fn filters_then_sorts() {
        let restaurants = fixture();
        let filters = FilterOptions {
            query: "pizza".to_string(),
            open_now: true,
            ..Default::default()
        }
        .strategies();

        let processed = process(&restaurants, &filters, SortOption::Reviews);

        assert_eq!(restaurant_ids(&processed), vec!["2", "1"]);
    }

    #[test]
    fn no_filters_and_best_match_is_identity() {
        let restaurants = fixture();
        let processed = process(&restaurants, &[], SortOption::BestMatch);
        assert_eq!(restaurant_ids(&processed), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn filter_order_does_not_change_result() {
        let restaurants = fixture();
        let forward = vec![
            FilterStrategy::search_query("pizza"),
            FilterStrategy::FreeDelivery,
        ];
        let backward: Vec<_> = forward.iter().rev().cloned().collect();

        assert_eq!(
            restaurant_ids(&process(&restaurants, &forward, SortOption::BestMatch)),
            restaurant_ids(&process(&restaurants, &backward, SortOption::BestMatch)),
        );
    }

    #[test]
    fn input_is_not_mutated_and_output_is_deterministic() {
        let restaurants = fixture();
        let snapshot: Vec<Restaurant> = restaurants.iter().map(|r| (**r).clone()).collect();
        let filters = vec![FilterStrategy::FreeDelivery];

        let first = process(&restaurants, &filters, SortOption::Reviews);
        let second = process(&restaurants, &filters, SortOption::Reviews);

        assert_eq!(first, second);
        assert_eq!(restaurant_ids(&restaurants), vec!["1", "2", "3", "4"]);
        assert!(restaurants.iter().zip(&snapshot).all(|(r, s)| **r == *s));
    }

    #[test]
    fn empty_collection() {
        let filters = vec![FilterStrategy::OpenNow];
        assert!(process(&[], &filters, SortOption::DeliveryCost).is_empty());
        assert!(process(&[named("1", None, None)], &filters, SortOption::Reviews).is_empty());
    }
}
