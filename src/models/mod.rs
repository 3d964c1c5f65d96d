pub mod click_event;
pub mod short_link;

pub use click_event::{AnalyticsDto, AnalyticsQuery, ClickEvent, ClickSummary, NewClickEvent};
pub use short_link::{LinkInfoDto, NewShortLink, ShortLink, ShortenRequestDto, ShortenResponseDto};
