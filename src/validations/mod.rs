mod links;

pub use links::{parse_expiry, validate_alias, validate_expiry, validate_url, validation_message};
