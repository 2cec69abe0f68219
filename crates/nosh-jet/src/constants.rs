/// The default base URL for the Just Eat discovery service
pub const DEFAULT_BASE_URL: &str = "https://uk.api.just-eat.io";

/// The default path format for the restaurants-by-postcode lookup
pub const DEFAULT_RESTAURANTS_PATH_FORMAT: &str =
    "/discovery/$country/restaurants/enriched/bypostcode/$postcode";
pub const COUNTRY_REPLACE_TOKEN: &str = "$country";
pub const POSTCODE_REPLACE_TOKEN: &str = "$postcode";

/// Country segment used when none is configured
pub const DEFAULT_COUNTRY: &str = "uk";

/// Postcode used when none is configured
pub const DEFAULT_POSTCODE: &str = "CT12EH";

/// Request timeout for the aggregator, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
