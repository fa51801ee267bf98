/// PRODID written to every calendar this tool generates
pub const DEFAULT_PRODUCT_ID: &str = "-//sleepcal//oura-sleep-ical//EN";

/// iCalendar VERSION
pub const ICALENDAR_VERSION: &str = "2.0";

/// How many days of sleep data to fetch when no range is given
pub const DEFAULT_DAYS_BACK: i64 = 7;

/// Marker rendered in place of a value the session doesn't have
pub const NOT_APPLICABLE: &str = "N/A";

pub const DEFAULT_API_BASE_URL: &str = "https://api.ouraring.com";
