//! Normalization of platform-specific profile payloads.
//!
//! The aggregation API returns a different, undocumented JSON shape for every
//! platform and the shapes drift over time. Platform knowledge lives in the
//! field-priority tables below; everything else goes through [`try_get`],
//! which never fails on a missing or mistyped field.

use crate::cleaner::clean_text;
use chrono::{DateTime, Utc};
use persona_core::Platform;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dotted path into a JSON payload, one key per element.
pub type FieldPath = &'static [&'static str];

/// Bio-like fields every platform may use, checked first.
const GENERIC_TEXT_FIELDS: &[FieldPath] = &[
    &["biography"],
    &["bio"],
    &["description"],
    &["about"],
];

const INSTAGRAM_TEXT_FIELDS: &[FieldPath] = &[
    &["full_name"],
    &["user_info", "biography"],
    &["data", "user", "biography"],
    &["data", "user", "full_name"],
];

const TIKTOK_TEXT_FIELDS: &[FieldPath] = &[
    &["signature"],
    &["user", "signature"],
    &["userInfo", "user", "signature"],
    &["bio_description"],
    &["nickname"],
    &["user", "nickname"],
    &["userInfo", "user", "nickname"],
];

const TWITTER_TEXT_FIELDS: &[FieldPath] = &[
    &["data", "description"],
    &["data", "name"],
    &["legacy", "description"],
    &["legacy", "name"],
    &["name"],
    &["user_metadata", "description"],
    &["user_metadata", "bio"],
];

const SNAPCHAT_TEXT_FIELDS: &[FieldPath] = &[
    &["displayName"],
    &["title"],
    &["userProfile", "publicProfileInfo", "bio"],
    &["userProfile", "publicProfileInfo", "title"],
];

const YOUTUBE_TEXT_FIELDS: &[FieldPath] = &[&["name"], &["channel", "description"]];

const FACEBOOK_TEXT_FIELDS: &[FieldPath] = &[&["intro"], &["name"], &["category"]];

const THREADS_TEXT_FIELDS: &[FieldPath] = &[
    &["user", "biography"],
    &["full_name"],
    &["user", "full_name"],
];

/// Platform-specific text fields, in priority order, after the generic ones.
#[must_use]
pub fn text_fields(platform: Platform) -> &'static [FieldPath] {
    match platform {
        Platform::Instagram => INSTAGRAM_TEXT_FIELDS,
        Platform::Twitter => TWITTER_TEXT_FIELDS,
        Platform::Tiktok => TIKTOK_TEXT_FIELDS,
        Platform::Snapchat => SNAPCHAT_TEXT_FIELDS,
        Platform::Youtube => YOUTUBE_TEXT_FIELDS,
        Platform::Facebook => FACEBOOK_TEXT_FIELDS,
        Platform::Threads => THREADS_TEXT_FIELDS,
    }
}

// Candidates for the structured `SocialProfile` fields. These are shared across
// platforms: a field name that only one platform uses simply never matches on
// the others.
const DISPLAY_NAME_FIELDS: &[FieldPath] = &[
    &["full_name"],
    &["displayName"],
    &["nickname"],
    &["name"],
    &["data", "user", "full_name"],
    &["user", "nickname"],
    &["legacy", "name"],
    &["data", "name"],
];
const BIO_FIELDS: &[FieldPath] = &[
    &["biography"],
    &["bio"],
    &["signature"],
    &["description"],
    &["data", "user", "biography"],
    &["user", "signature"],
    &["legacy", "description"],
    &["data", "description"],
];
const FOLLOWERS_FIELDS: &[FieldPath] = &[
    &["follower_count"],
    &["followers_count"],
    &["followers"],
    &["edge_followed_by", "count"],
    &["data", "user", "edge_followed_by", "count"],
    &["stats", "followerCount"],
    &["legacy", "followers_count"],
    &["subscriberCount"],
];
const FOLLOWING_FIELDS: &[FieldPath] = &[
    &["following_count"],
    &["friends_count"],
    &["following"],
    &["edge_follow", "count"],
    &["data", "user", "edge_follow", "count"],
    &["stats", "followingCount"],
    &["legacy", "friends_count"],
];
const POSTS_FIELDS: &[FieldPath] = &[
    &["media_count"],
    &["posts_count"],
    &["statuses_count"],
    &["edge_owner_to_timeline_media", "count"],
    &["data", "user", "edge_owner_to_timeline_media", "count"],
    &["stats", "videoCount"],
    &["legacy", "statuses_count"],
];
const PROFILE_IMAGE_FIELDS: &[FieldPath] = &[
    &["profile_pic_url_hd"],
    &["profile_pic_url"],
    &["profile_image_url_https"],
    &["avatarLarger"],
    &["user", "avatarLarger"],
    &["data", "user", "profile_pic_url_hd"],
    &["legacy", "profile_image_url_https"],
    &["avatar"],
];
const VERIFIED_FIELDS: &[FieldPath] = &[
    &["is_verified"],
    &["verified"],
    &["user", "verified"],
    &["data", "user", "is_verified"],
    &["legacy", "verified"],
    &["is_blue_verified"],
];
const LOCATION_FIELDS: &[FieldPath] = &[
    &["location"],
    &["city_name"],
    &["legacy", "location"],
    &["data", "location"],
];
const EMAIL_FIELDS: &[FieldPath] = &[&["public_email"], &["business_email"], &["email"]];
const BUSINESS_ACCOUNT_FIELDS: &[FieldPath] = &[
    &["is_business_account"],
    &["is_business"],
    &["data", "user", "is_business_account"],
];
const BUSINESS_CATEGORY_FIELDS: &[FieldPath] = &[
    &["business_category_name"],
    &["category_name"],
    &["category"],
    &["data", "user", "business_category_name"],
];
const EXTERNAL_LINK_FIELDS: &[FieldPath] = &[
    &["external_url"],
    &["bio_link", "link"],
    &["website"],
    &["legacy", "url"],
    &["data", "user", "external_url"],
];
const WORK_HISTORY_FIELDS: &[FieldPath] = &[&["experience"], &["work_history"], &["positions"]];
const EDUCATION_FIELDS: &[FieldPath] = &[&["education"], &["schools"]];
const LIST_ENTRY_FIELDS: &[FieldPath] = &[&["title"], &["name"], &["school"], &["url"]];

/// Normalized profile record, independent of the source platform's schema.
///
/// Fields the upstream payload does not carry are left empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
    pub platform: Option<Platform>,
    pub profile_image: String,
    pub external_links: Vec<String>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_business_account: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_category: Option<String>,
    pub work_history: Vec<String>,
    pub education: Vec<String>,
    /// Concatenated post captions; empty while only profile endpoints are queried
    pub raw_posts_text: String,
    pub scrape_timestamp: Option<DateTime<Utc>>,
}

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |current, key| current.as_object()?.get(*key))
}

/// Read a non-empty string at `path`, trimmed.
///
/// Missing keys, non-object intermediate values and non-string or blank
/// leaves all yield `None`.
#[must_use]
pub fn try_get<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(payload, path)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-empty string among `candidates`, in order.
#[must_use]
pub fn first_non_empty<'a>(payload: &'a Value, candidates: &[FieldPath]) -> Option<&'a str> {
    candidates.iter().find_map(|path| try_get(payload, path))
}

fn try_get_u64(payload: &Value, path: &[&str]) -> Option<u64> {
    match lookup(payload, path)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn first_u64(payload: &Value, candidates: &[FieldPath]) -> Option<u64> {
    candidates.iter().find_map(|path| try_get_u64(payload, path))
}

fn first_bool(payload: &Value, candidates: &[FieldPath]) -> Option<bool> {
    candidates
        .iter()
        .find_map(|path| lookup(payload, path)?.as_bool())
}

/// Collect strings from every candidate: plain strings, arrays of strings,
/// and arrays of objects carrying a `title`, `name` or `school` string.
fn collect_strings(payload: &Value, candidates: &[FieldPath]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for path in candidates {
        let Some(value) = lookup(payload, path) else {
            continue;
        };

        let items: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for item in items {
            let text = item
                .as_str()
                .or_else(|| first_non_empty(item, LIST_ENTRY_FIELDS))
                .map(str::trim)
                .filter(|s| !s.is_empty());

            if let Some(text) = text {
                if !out.iter().any(|existing| existing == text) {
                    out.push(text.to_string());
                }
            }
        }
    }

    out
}

/// Every non-empty text fragment for `platform`, in priority order.
///
/// Generic bio fields come first, then the platform's own table. Exact
/// duplicates (a name reported under two keys) are kept once.
#[must_use]
pub fn extract_fragments(payload: &Value, platform: Platform) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();

    for path in GENERIC_TEXT_FIELDS.iter().chain(text_fields(platform)) {
        if let Some(text) = try_get(payload, path) {
            if !fragments.iter().any(|existing| existing == text) {
                fragments.push(text.to_string());
            }
        }
    }

    fragments
}

/// Cleaned evidence text for one profile payload.
#[must_use]
pub fn extract_text(payload: &Value, platform: Platform) -> String {
    clean_text(&extract_fragments(payload, platform).join("\n"))
}

/// Map a raw payload onto the normalized [`SocialProfile`] shape.
#[must_use]
pub fn normalize_profile(payload: &Value, platform: Platform, username: &str) -> SocialProfile {
    SocialProfile {
        username: username.to_string(),
        display_name: first_non_empty(payload, DISPLAY_NAME_FIELDS)
            .unwrap_or_default()
            .to_string(),
        bio: first_non_empty(payload, BIO_FIELDS)
            .map(clean_text)
            .unwrap_or_default(),
        followers: first_u64(payload, FOLLOWERS_FIELDS).unwrap_or_default(),
        following: first_u64(payload, FOLLOWING_FIELDS).unwrap_or_default(),
        posts_count: first_u64(payload, POSTS_FIELDS).unwrap_or_default(),
        platform: Some(platform),
        profile_image: first_non_empty(payload, PROFILE_IMAGE_FIELDS)
            .unwrap_or_default()
            .to_string(),
        external_links: collect_strings(payload, EXTERNAL_LINK_FIELDS),
        is_verified: first_bool(payload, VERIFIED_FIELDS).unwrap_or_default(),
        location: first_non_empty(payload, LOCATION_FIELDS).map(ToString::to_string),
        email: first_non_empty(payload, EMAIL_FIELDS).map(ToString::to_string),
        is_business_account: first_bool(payload, BUSINESS_ACCOUNT_FIELDS),
        business_category: first_non_empty(payload, BUSINESS_CATEGORY_FIELDS)
            .map(ToString::to_string),
        work_history: collect_strings(payload, WORK_HISTORY_FIELDS),
        education: collect_strings(payload, EDUCATION_FIELDS),
        raw_posts_text: String::new(),
        scrape_timestamp: Some(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_try_get_tolerates_shape_drift() {
        let payload = json!({
            "bio": "  hello  ",
            "blank": "   ",
            "count": 12,
            "user": "not-an-object",
            "nested": { "inner": { "value": "deep" } }
        });

        assert_eq!(try_get(&payload, &["bio"]), Some("hello"));
        assert_eq!(try_get(&payload, &["blank"]), None);
        assert_eq!(try_get(&payload, &["count"]), None);
        assert_eq!(try_get(&payload, &["user", "signature"]), None);
        assert_eq!(try_get(&payload, &["missing", "path"]), None);
        assert_eq!(try_get(&payload, &["nested", "inner", "value"]), Some("deep"));
        assert_eq!(try_get(&json!(null), &["bio"]), None);
        assert_eq!(try_get(&json!(["bio"]), &["bio"]), None);
    }

    #[test]
    fn test_first_non_empty_respects_priority() {
        let payload = json!({ "bio": "", "description": "second", "about": "third" });
        assert_eq!(
            first_non_empty(&payload, GENERIC_TEXT_FIELDS),
            Some("second")
        );
    }

    #[test]
    fn test_instagram_fragments() {
        let payload = json!({
            "data": {
                "user": {
                    "biography": "Photographer in Lisbon",
                    "full_name": "Jane Doe"
                }
            }
        });

        assert_eq!(
            extract_fragments(&payload, Platform::Instagram),
            vec!["Photographer in Lisbon", "Jane Doe"]
        );
    }

    #[test]
    fn test_tiktok_fragments_deduplicate() {
        let payload = json!({
            "user": { "signature": "dance • travel", "nickname": "jane" },
            "nickname": "jane"
        });

        assert_eq!(
            extract_fragments(&payload, Platform::Tiktok),
            vec!["dance • travel", "jane"]
        );
    }

    #[test]
    fn test_twitter_nested_and_legacy_shapes() {
        let nested = json!({ "data": { "description": "Building things", "name": "Jane" } });
        assert_eq!(
            extract_fragments(&nested, Platform::Twitter),
            vec!["Building things", "Jane"]
        );

        let legacy = json!({
            "legacy": { "description": "Opinions my own", "name": "J. Doe" },
            "user_metadata": { "bio": "Opinions my own" }
        });
        assert_eq!(
            extract_fragments(&legacy, Platform::Twitter),
            vec!["Opinions my own", "J. Doe"]
        );
    }

    #[test]
    fn test_platform_tables_do_not_leak() {
        // `signature` is a TikTok field and must not be read for Instagram
        let payload = json!({ "signature": "tiktok only" });
        assert!(extract_fragments(&payload, Platform::Instagram).is_empty());
        assert_eq!(
            extract_fragments(&payload, Platform::Tiktok),
            vec!["tiktok only"]
        );
    }

    #[test]
    fn test_extract_text_cleans_output() {
        let payload = json!({
            "biography": "<b>Coffee</b> lover ☕\nhttps://linktr.ee/jane",
            "full_name": "Jane Doe"
        });

        assert_eq!(
            extract_text(&payload, Platform::Instagram),
            "Coffee lover\nJane Doe"
        );
    }

    #[test]
    fn test_unexpected_roots_yield_nothing() {
        for payload in [json!(null), json!(42), json!("bio"), json!([{"bio": "x"}])] {
            assert!(extract_fragments(&payload, Platform::Snapchat).is_empty());
            assert_eq!(extract_text(&payload, Platform::Snapchat), "");
        }
    }

    #[test]
    fn test_normalize_instagram_profile() {
        let payload = json!({
            "data": {
                "user": {
                    "biography": "Photographer 📷 https://jane.photo",
                    "full_name": "Jane Doe",
                    "edge_followed_by": { "count": 1520 },
                    "edge_follow": { "count": 310 },
                    "edge_owner_to_timeline_media": { "count": 87 },
                    "profile_pic_url_hd": "https://cdn.example/jane.jpg",
                    "is_verified": false,
                    "is_business_account": true,
                    "business_category_name": "Artist",
                    "external_url": "https://jane.photo"
                }
            }
        });

        let profile = normalize_profile(&payload, Platform::Instagram, "jane_doe");
        assert_eq!(profile.username, "jane_doe");
        assert_eq!(profile.display_name, "Jane Doe");
        assert_eq!(profile.bio, "Photographer");
        assert_eq!(profile.followers, 1520);
        assert_eq!(profile.following, 310);
        assert_eq!(profile.posts_count, 87);
        assert_eq!(profile.profile_image, "https://cdn.example/jane.jpg");
        assert_eq!(profile.external_links, vec!["https://jane.photo"]);
        assert_eq!(profile.is_business_account, Some(true));
        assert_eq!(profile.business_category.as_deref(), Some("Artist"));
        assert!(!profile.is_verified);
        assert_eq!(profile.platform, Some(Platform::Instagram));
        assert!(profile.scrape_timestamp.is_some());
    }

    #[test]
    fn test_normalize_counts_from_strings_and_lists() {
        let payload = json!({
            "name": "Jane Doe",
            "followers": "12,400",
            "following": -3,
            "experience": [
                { "title": "Engineer at Acme" },
                "Intern at Initech",
                { "unrelated": true }
            ],
            "education": [{ "school": "State University" }]
        });

        let profile = normalize_profile(&payload, Platform::Facebook, "jane");
        assert_eq!(profile.display_name, "Jane Doe");
        assert_eq!(profile.followers, 12_400);
        assert_eq!(profile.following, 0);
        assert_eq!(
            profile.work_history,
            vec!["Engineer at Acme", "Intern at Initech"]
        );
        assert_eq!(profile.education, vec!["State University"]);
    }

    #[test]
    fn test_normalize_empty_payload_defaults() {
        let profile = normalize_profile(&json!({}), Platform::Snapchat, "ghost");
        assert_eq!(profile.username, "ghost");
        assert!(profile.display_name.is_empty());
        assert!(profile.bio.is_empty());
        assert_eq!(profile.followers, 0);
        assert!(profile.external_links.is_empty());
        assert!(profile.location.is_none());
        assert!(profile.is_business_account.is_none());
    }
}
