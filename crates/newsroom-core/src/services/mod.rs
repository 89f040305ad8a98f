//! Publishing workflows built on top of the repository ports.

mod daily_limit;
mod news;
mod subscriptions;

pub use daily_limit::{DEFAULT_DAILY_POST_LIMIT, DailyPostLimit};
pub use news::{CreateOutcome, LISTING_PAGE_SIZE, NewsService};
pub use subscriptions::SubscriptionService;
