//! Quest descriptors as served by the platform.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// One quest definition from the platform's daily or special progress map.
///
/// The map key is the quest identifier; this struct carries everything else.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub exp_claimed: bool,
    /// Completion predicate tag; the timed activity is recognised by it.
    #[serde(default)]
    pub condition: Option<String>,
    /// Progress so far for counted quests.
    #[serde(default)]
    pub value: u64,
    #[serde(default)]
    pub required: u64,
    #[serde(default)]
    pub next_available_from: Option<Timestamp>,
    #[serde(default)]
    pub special: Option<SpecialAction>,
}

impl TaskDescriptor {
    /// Title with the platform's inline HTML removed.
    ///
    /// A single `<a href="...">label</a>` collapses to `label`; anything after
    /// a `<br/>` is dropped.
    pub fn clean_title(&self) -> String {
        let title = &self.title;
        if let Some(end) = title.find("</a>") {
            let mut out = format!("{}{}", &title[..end], &title[end + 4..]);
            if let Some(open) = out.find("<a href=") {
                if let Some(close) = out[open..].find("\">") {
                    out.replace_range(open..open + close + 2, "");
                }
            }
            out
        } else if let Some(br) = title.find("<br/>") {
            title[..br].to_string()
        } else {
            title.clone()
        }
    }

    /// Whether this quest is the timed activity identified by `condition`.
    pub fn is_condition(&self, condition: &str) -> bool {
        self.condition.as_deref() == Some(condition)
    }
}

/// Social action a special quest asks for.
///
/// Parsed from the platform's `{ "action": tag, "data": {...} }` object.
/// Tags this runner does not know are kept verbatim in [`SpecialAction::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSpecial", into = "RawSpecial")]
pub enum SpecialAction {
    RepostMedia,
    FollowProfile { url: String },
    Retweet { tweet_id: String },
    ChangeName,
    ChangeBanner,
    Unknown(String),
}

const POSTED_MEDIA: &str = "twitter-check-posted-media";
const FOLLOW_PROFILE: &str = "twitter-check-follow-profile";
const RETWEET: &str = "twitter-check-retweet";
const PROFILE_NAME: &str = "twitter-check-profile-name";
const PROFILE_BANNER: &str = "twitter-check-profile-banner";

impl SpecialAction {
    /// The platform tag this action was parsed from.
    pub fn tag(&self) -> &str {
        match self {
            SpecialAction::RepostMedia => POSTED_MEDIA,
            SpecialAction::FollowProfile { .. } => FOLLOW_PROFILE,
            SpecialAction::Retweet { .. } => RETWEET,
            SpecialAction::ChangeName => PROFILE_NAME,
            SpecialAction::ChangeBanner => PROFILE_BANNER,
            SpecialAction::Unknown(tag) => tag,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawSpecial {
    action: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl From<RawSpecial> for SpecialAction {
    fn from(raw: RawSpecial) -> Self {
        let field = |name: &str| raw.data.get(name).and_then(|v| v.as_str()).map(str::to_string);
        match raw.action.as_str() {
            POSTED_MEDIA => SpecialAction::RepostMedia,
            FOLLOW_PROFILE => match field("url") {
                Some(url) => SpecialAction::FollowProfile { url },
                None => SpecialAction::Unknown(raw.action.clone()),
            },
            RETWEET => match field("rtRequiredTweetId") {
                Some(tweet_id) => SpecialAction::Retweet { tweet_id },
                None => SpecialAction::Unknown(raw.action.clone()),
            },
            PROFILE_NAME => SpecialAction::ChangeName,
            PROFILE_BANNER => SpecialAction::ChangeBanner,
            _ => SpecialAction::Unknown(raw.action.clone()),
        }
    }
}

impl From<SpecialAction> for RawSpecial {
    fn from(action: SpecialAction) -> Self {
        let data = match &action {
            SpecialAction::FollowProfile { url } => serde_json::json!({ "url": url }),
            SpecialAction::Retweet { tweet_id } => {
                serde_json::json!({ "rtRequiredTweetId": tweet_id })
            }
            _ => serde_json::Value::Null,
        };
        RawSpecial {
            action: action.tag().to_string(),
            data,
        }
    }
}
