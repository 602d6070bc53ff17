//! Insights query parameters.

use serde::{Deserialize, Serialize};

/// Kind of post included in a media insights feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    #[default]
    All,
    CarouselV2,
    Image,
    Shopping,
    Video,
}

/// Period covered by a media insights feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeFrame {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    #[default]
    TwoYears,
}

/// Metric a media insights feed is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataOrdering {
    #[default]
    ReachCount,
    LikeCount,
    Follow,
    ShareCount,
    BioLinkClick,
    CommentCount,
    ImpressionCount,
    ProfileView,
    VideoViewCount,
    SaveCount,
}

/// Media insights feed query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsFeedQuery {
    pub post_type: PostType,
    pub time_frame: TimeFrame,
    pub data_ordering: DataOrdering,
    /// Maximum entries; 0 means all.
    pub count: u32,
}
