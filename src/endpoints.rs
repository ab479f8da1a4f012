//! The API endpoints URIs.

/// The route for listing and searching a month's products.
pub const TRANSACTIONS: &str = "/transactions";
/// The route for a month's sales totals.
pub const STATISTICS: &str = "/statistics";
/// The route for a month's product counts per price range.
pub const BAR_CHART: &str = "/bar-chart";
/// The route for a month's product counts per category.
pub const PIE_CHART: &str = "/pie-chart";
/// The route that loads the product feed into the database.
pub const INITIALIZE_DATABASE: &str = "/initialize-database";
