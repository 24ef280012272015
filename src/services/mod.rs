/// Services module - business logic layer
///
/// Services sit between the API calls and whatever displays the results:
/// optimistic local updates, session bookkeeping and user notifications.

pub mod notifications;
pub mod session;
pub mod social;

// Re-export commonly used types
pub use notifications::{Notification, NotificationKind, Notifications};
pub use session::Session;
pub use social::{remove_histories, toggle_favorite, toggle_follow, FollowState};
