use std::{cmp::Ordering, fmt, str::FromStr};

use nosh_jet::Restaurant;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SharedRestaurant;

/// The orderings a user can pick. The serialized form is the URL token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    /// Upstream order, untouched.
    #[default]
    BestMatch,
    Reviews,
    EstimatedDeliveryTime,
    MinOrderAmount,
    DeliveryCost,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort option `{0}`")]
pub struct UnknownSortOption(pub String);

impl SortOption {
    pub const ALL: [SortOption; 5] = [
        SortOption::BestMatch,
        SortOption::Reviews,
        SortOption::EstimatedDeliveryTime,
        SortOption::MinOrderAmount,
        SortOption::DeliveryCost,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::BestMatch => "bestMatch",
            Self::Reviews => "reviews",
            Self::EstimatedDeliveryTime => "estimatedDeliveryTime",
            Self::MinOrderAmount => "minOrderAmount",
            Self::DeliveryCost => "deliveryCost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BestMatch => "Best Match",
            Self::Reviews => "Rating (High to Low)",
            Self::EstimatedDeliveryTime => "Delivery Time",
            Self::MinOrderAmount => "Min Order Amount",
            Self::DeliveryCost => "Delivery Cost",
        }
    }

    /// Registry lookup: unknown keys fall back to best match.
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or_default()
    }

    /// Returns a new, stably sorted list. Best match hands back the input order.
    pub fn sort(self, restaurants: &[SharedRestaurant]) -> Vec<SharedRestaurant> {
        let mut sorted = restaurants.to_vec();
        if self != Self::BestMatch {
            sorted.sort_by(|a, b| self.compare(a, b));
        }
        sorted
    }

    fn compare(self, a: &Restaurant, b: &Restaurant) -> Ordering {
        match self {
            Self::BestMatch => Ordering::Equal,
            Self::Reviews => b.star_rating_or_zero().total_cmp(&a.star_rating_or_zero()),
            Self::EstimatedDeliveryTime => a
                .eta_lower_or_infinity()
                .total_cmp(&b.eta_lower_or_infinity()),
            Self::MinOrderAmount => a
                .minimum_order_or_zero()
                .total_cmp(&b.minimum_order_or_zero()),
            Self::DeliveryCost => a
                .delivery_cost_or_zero()
                .total_cmp(&b.delivery_cost_or_zero()),
        }
    }
}

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.token() == s)
            .ok_or_else(|| UnknownSortOption(s.to_string()))
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
