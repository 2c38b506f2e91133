//! Visibility registry handlers.

mod browse_share;
mod deactivate_share;
mod list_shares;
mod locator;
mod publish_share;
mod resolve_share;
mod update_field_visibility;

pub use browse_share::{BrowseShareHandler, BrowseShareQuery, BrowseShareResult};
pub use deactivate_share::{DeactivateShareCommand, DeactivateShareHandler};
pub use list_shares::{
    ListPublicSharesHandler, ListPublicSharesQuery, ListUserSharesHandler, ListUserSharesQuery,
    MAX_PUBLIC_PAGE,
};
pub use locator::ShareLocator;
pub use publish_share::{PublishShareCommand, PublishShareHandler, PublishShareResult};
pub use resolve_share::{CanViewShareHandler, CanViewShareQuery, ResolveShareByTokenHandler};
pub use update_field_visibility::{UpdateFieldVisibilityCommand, UpdateFieldVisibilityHandler};
