//! Form and query payloads accepted by the HTTP routes.

use igrest_core::{
    ClientOverrides, Credentials, InsightsFeedQuery,
    insights::{DataOrdering, PostType, TimeFrame},
};
use serde::{Deserialize, Deserializer, de};

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub verification_code: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub proxy: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub locale: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none_parsed")]
    pub timezone_offset: Option<i32>,
}

impl LoginForm {
    /// Credentials for the login call.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
            .with_verification_code(self.verification_code.trim())
    }

    /// Per-request client overrides.
    #[must_use]
    pub fn overrides(&self) -> ClientOverrides {
        ClientOverrides {
            proxy: self.proxy.clone(),
            locale: self.locale.clone(),
            timezone_offset: self.timezone_offset,
        }
    }
}

/// Any form that only names a session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionForm {
    pub sessionid: String,
}

/// Media lookup form.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaForm {
    pub sessionid: String,
    pub pk: u64,
}

/// User action form (follow, unfollow, username lookup).
#[derive(Debug, Clone, Deserialize)]
pub struct UserIdForm {
    pub sessionid: String,
    pub user_id: u64,
}

/// User info form.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoForm {
    pub sessionid: String,
    pub user_id: u64,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub use_cache: bool,
}

/// Username-based lookup form.
#[derive(Debug, Clone, Deserialize)]
pub struct UsernameForm {
    pub sessionid: String,
    pub username: String,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub use_cache: bool,
}

/// Followers / following listing form.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationsForm {
    pub sessionid: String,
    pub user_id: u64,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub use_cache: bool,
    #[serde(default)]
    pub amount: u32,
}

/// Mute or unmute form for a followed account.
#[derive(Debug, Clone, Deserialize)]
pub struct MuteForm {
    pub sessionid: String,
    pub user_id: u64,
    #[serde(default, deserialize_with = "flag")]
    pub revert: bool,
}

/// A user's active stories.
#[derive(Debug, Clone, Deserialize)]
pub struct StoriesForm {
    pub sessionid: String,
    pub user_id: u64,
    #[serde(default)]
    pub amount: u32,
}

/// Story lookup form.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryForm {
    pub sessionid: String,
    pub story_pk: u64,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub use_cache: bool,
}

/// Story action by primary key.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryPkForm {
    pub sessionid: String,
    pub story_pk: u64,
}

/// Mark stories as seen. Lists are comma-separated, e.g. `story_pks=1,2,3`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorySeenForm {
    pub sessionid: String,
    #[serde(deserialize_with = "pk_list")]
    pub story_pks: Vec<u64>,
    #[serde(default, deserialize_with = "pk_list")]
    pub skipped_story_pks: Vec<u64>,
}

/// Like form; `revert` unlikes.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryLikeForm {
    pub sessionid: String,
    pub story_id: String,
    #[serde(default, deserialize_with = "flag")]
    pub revert: bool,
}

/// Story action by `<pk>_<owner id>` identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryIdForm {
    pub sessionid: String,
    pub story_id: String,
}

/// Media insights feed form.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsFeedForm {
    pub sessionid: String,
    #[serde(default)]
    pub post_type: PostType,
    #[serde(default)]
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub data_ordering: DataOrdering,
    #[serde(default)]
    pub count: u32,
}

impl InsightsFeedForm {
    #[must_use]
    pub const fn query(&self) -> InsightsFeedQuery {
        InsightsFeedQuery {
            post_type: self.post_type,
            time_frame: self.time_frame,
            data_ordering: self.data_ordering,
            count: self.count,
        }
    }
}

/// Single media insights form.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsMediaForm {
    pub sessionid: String,
    pub media_pk: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeQuery {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PkQuery {
    pub pk: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

const fn default_true() -> bool {
    true
}

/// Accept the boolean spellings HTML forms and HTTP clients send.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"a boolean",
        )),
    }
}

fn pk_list<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer)?
        .split(',')
        .map(str::trim)
        .filter(|pk| !pk.is_empty())
        .map(|pk| pk.parse::<u64>().map_err(de::Error::custom))
        .collect()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn empty_as_none_parsed<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_as_none(deserializer)?
        .map(|raw| raw.parse::<i32>().map_err(de::Error::custom))
        .transpose()
}
