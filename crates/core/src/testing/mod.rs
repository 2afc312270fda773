//! Test doubles and fixtures.
//!
//! Mock implementations of the seam traits, used by unit tests across the
//! crate and available to downstream crates for their own tests.

pub mod fixtures;
mod mock_feed;
mod mock_notifier;
mod mock_provider;

pub use mock_feed::MockFeedSource;
pub use mock_notifier::MockNotificationSink;
pub use mock_provider::{MockMetadataProvider, RecordedSearch};
