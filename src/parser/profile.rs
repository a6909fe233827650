//! Normalization of search API profile payloads.
//!
//! The upstream API has shipped two key conventions for the same data. Each
//! canonical field below lists its accepted source keys in precedence order:
//! the first key that is present and non-null wins, even if a later key also
//! carries a value.
//!
//! | canonical field   | source keys (highest precedence first)            |
//! |-------------------|---------------------------------------------------|
//! | `name`            | `name`, `full_name`                               |
//! | `bio`             | `bio`, `biography`                                |
//! | `avatar`          | `avatar`, `profile_pic_url`                       |
//! | `avatar_hd`       | `avatar_hd`, `profile_pic_url_hd`                 |
//! | `is_verified`     | `is_verified`, `verified`                         |
//! | `is_business`     | `is_business`, `is_business_account`              |
//! | `posts_count`     | `posts`, `media_count`, `posts_count`             |
//! | `followers_count` | `followers`, `follower_count`, `followers_count`  |
//! | `following_count` | `following`, `following_count`                    |
//! | `external_link`   | `external_link`, `external_url`                   |
//! | `bio_links`       | `bio_links`, `links`                              |
//!
//! Post fields follow the same rule:
//!
//! | canonical field | source keys                                  |
//! |-----------------|----------------------------------------------|
//! | `id`            | `id`, `shortcode`                            |
//! | `caption`       | `caption`, `text`                            |
//! | `likes`         | `likes`, `like_count`                        |
//! | `comments`      | `comments`, `comment_count`                  |
//! | `tagged_users`  | `tagged_users`, `usertags`                   |
//! | `image`         | `image`, `thumbnail`, `display_url`          |
//! | `posted_at`     | `iso_date`, `taken_at`, `date`               |
//!
//! Envelope: a body with a `profile` object is the nested shape; its posts come
//! from the top-level `posts` array, falling back to `profile.posts` when that
//! is an array. Any other object is treated as a flat profile whose posts live
//! under `posts`.

use serde_json::{Map, Value};

use crate::models::{BioLink, Post, ProfileSnapshot};

pub const NAME_KEYS: &[&str] = &["name", "full_name"];
pub const BIO_KEYS: &[&str] = &["bio", "biography"];
pub const AVATAR_KEYS: &[&str] = &["avatar", "profile_pic_url"];
pub const AVATAR_HD_KEYS: &[&str] = &["avatar_hd", "profile_pic_url_hd"];
pub const VERIFIED_KEYS: &[&str] = &["is_verified", "verified"];
pub const BUSINESS_KEYS: &[&str] = &["is_business", "is_business_account"];
pub const POSTS_COUNT_KEYS: &[&str] = &["posts", "media_count", "posts_count"];
pub const FOLLOWERS_KEYS: &[&str] = &["followers", "follower_count", "followers_count"];
pub const FOLLOWING_KEYS: &[&str] = &["following", "following_count"];
pub const EXTERNAL_LINK_KEYS: &[&str] = &["external_link", "external_url"];
pub const BIO_LINKS_KEYS: &[&str] = &["bio_links", "links"];

const POST_ID_KEYS: &[&str] = &["id", "shortcode"];
const POST_CAPTION_KEYS: &[&str] = &["caption", "text"];
const POST_LIKES_KEYS: &[&str] = &["likes", "like_count"];
const POST_COMMENTS_KEYS: &[&str] = &["comments", "comment_count"];
const POST_TAGS_KEYS: &[&str] = &["tagged_users", "usertags"];
const POST_IMAGE_KEYS: &[&str] = &["image", "thumbnail", "display_url"];
const POST_DATE_KEYS: &[&str] = &["iso_date", "taken_at", "date"];

/// Returns the first non-null value among `keys`, in order.
#[must_use]
pub fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Like [`pick`], but only values that can be read by `read` are considered.
///
/// Lets a numeric field skip a same-named key that holds an array (the flat
/// shape reuses `posts` for both the count and the post list).
fn pick_with<'a, T>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter(|value| !value.is_null())
        .find_map(read)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        // Captions sometimes arrive as {"text": "..."}
        Value::Object(map) => map.get("text").and_then(as_text),
        _ => None,
    }
}

/// Parses display counts: `"12,345"`, `"12.3K"`, `"1.2M"`, `"3B"`.
///
/// Anything else (signs, stray text, misplaced separators) is rejected so the
/// next key gets a chance.
fn parse_count_text(text: &str) -> Option<i64> {
    let text = text.trim();
    let (number, multiplier) = match text.char_indices().last()? {
        (i, 'k' | 'K') => (&text[..i], 1_000_f64),
        (i, 'm' | 'M') => (&text[..i], 1_000_000_f64),
        (i, 'b' | 'B') => (&text[..i], 1_000_000_000_f64),
        _ => (text, 1_f64),
    };
    let number = number.trim_end();
    if number.is_empty() {
        return None;
    }

    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (number, None),
    };

    let mut groups = whole.split(',');
    let first = groups.next()?;
    let grouped = whole.contains(',');
    let first_ok = !first.is_empty()
        && first.bytes().all(|b| b.is_ascii_digit())
        && (!grouped || first.len() <= 3);
    if !first_ok || !groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let whole: String = whole.chars().filter(char::is_ascii_digit).collect();

    match fraction {
        None => whole.parse::<i64>().ok()?.checked_mul(multiplier as i64),
        // Fractions only make sense on abbreviated counts.
        Some(fraction)
            if multiplier > 1.0
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b.is_ascii_digit()) =>
        {
            let value: f64 = format!("{whole}.{fraction}").parse().ok()?;
            let scaled = (value * multiplier).round();
            (scaled <= i64::MAX as f64).then_some(scaled as i64)
        }
        Some(_) => None,
    }
}

/// Reads non-negative counts given as numbers or as display strings.
fn as_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .filter(|count| *count >= 0),
        Value::String(s) => parse_count_text(s),
        // Some responses wrap counts as {"count": n}
        Value::Object(map) => map.get("count").and_then(as_count),
        _ => None,
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    pick_with(obj, keys, as_text)
}

fn count_field(obj: &Map<String, Value>, keys: &[&str]) -> i64 {
    pick_with(obj, keys, as_count).unwrap_or(0)
}

fn flag_field(obj: &Map<String, Value>, keys: &[&str]) -> bool {
    pick_with(obj, keys, as_flag).unwrap_or(false)
}

fn normalize_bio_links(obj: &Map<String, Value>) -> Vec<BioLink> {
    let Some(items) = pick_with(obj, BIO_LINKS_KEYS, Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) if !url.trim().is_empty() => Some(BioLink {
                title: String::new(),
                url: url.trim().to_string(),
            }),
            Value::Object(link) => {
                let url = text_field(link, &["url", "link", "lynx_url"])?;
                let title = text_field(link, &["title", "text"]).unwrap_or_default();
                Some(BioLink { title, url })
            }
            _ => None,
        })
        .collect()
}

fn tagged_user(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => as_text(value),
        Value::Object(map) => map
            .get("username")
            .and_then(as_text)
            .or_else(|| {
                map.get("user")
                    .and_then(Value::as_object)
                    .and_then(|user| user.get("username"))
                    .and_then(as_text)
            }),
        _ => None,
    }
}

/// Normalizes a single post object.
#[must_use]
pub fn normalize_post(obj: &Map<String, Value>) -> Post {
    let tagged_users = pick_with(obj, POST_TAGS_KEYS, Value::as_array)
        .map(|items| items.iter().filter_map(tagged_user).collect())
        .unwrap_or_default();

    Post {
        id: text_field(obj, POST_ID_KEYS),
        caption: text_field(obj, POST_CAPTION_KEYS).unwrap_or_default(),
        likes: count_field(obj, POST_LIKES_KEYS),
        comments: count_field(obj, POST_COMMENTS_KEYS),
        tagged_users,
        image: text_field(obj, POST_IMAGE_KEYS),
        posted_at: text_field(obj, POST_DATE_KEYS),
    }
}

/// Normalizes a full search API body into a [`ProfileSnapshot`].
///
/// Returns `None` when the body is not a JSON object.
#[must_use]
pub fn normalize_payload(body: &Value) -> Option<ProfileSnapshot> {
    let root = body.as_object()?;

    let profile = root
        .get("profile")
        .and_then(Value::as_object)
        .unwrap_or(root);

    let posts = root
        .get("posts")
        .and_then(Value::as_array)
        .or_else(|| profile.get("posts").and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(normalize_post)
                .collect()
        })
        .unwrap_or_default();

    Some(ProfileSnapshot {
        name: text_field(profile, NAME_KEYS),
        bio: text_field(profile, BIO_KEYS),
        avatar: text_field(profile, AVATAR_KEYS),
        avatar_hd: text_field(profile, AVATAR_HD_KEYS),
        is_verified: flag_field(profile, VERIFIED_KEYS),
        is_business: flag_field(profile, BUSINESS_KEYS),
        posts_count: count_field(profile, POSTS_COUNT_KEYS),
        followers_count: count_field(profile, FOLLOWERS_KEYS),
        following_count: count_field(profile, FOLLOWING_KEYS),
        external_link: text_field(profile, EXTERNAL_LINK_KEYS),
        bio_links: normalize_bio_links(profile),
        posts,
        raw: body.clone(),
    })
}
