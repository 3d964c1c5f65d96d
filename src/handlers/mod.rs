mod links;

pub use links::{analytics_handler, info_handler, redirect_handler, shorten_handler};
