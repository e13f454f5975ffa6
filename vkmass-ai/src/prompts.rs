//! Prompt text, the structured profile schema and its tolerant parser.

use serde_json::{Value, json};
use tracing::warn;
use vkmass_common::models::GeneratedProfile;

/// Returned whenever a live comment cannot be produced.
pub const FALLBACK_COMMENTS: [&str; 5] = [
    "Great post, thanks for the info! 👍",
    "Completely agree with the author. Waiting for more!",
    "Interesting take, gives me something to think about. 🤔",
    "Wow, didn't know that. Really useful! 🔥",
    "Thanks, I was just looking for info on this topic! ✅",
];

pub const COMMENT_SYSTEM_INSTRUCTION: &str = "You are an active social network user. \
Your comments are lively, human and short. Use emoji that fit the topic.";

/// Soft bound communicated to the model; nothing enforces it afterwards.
pub const COMMENT_SOFT_LIMIT: usize = 140;

pub fn comment_prompt(topic: &str, keywords: &[String], template: &str) -> String {
    format!(
        "Write a short, lively comment on this post: \"{}\".\n\
         Keywords: {}.\n\
         Style: {}.\n\
         No hashtags, at most {} characters.",
        topic,
        keywords.join(", "),
        template,
        COMMENT_SOFT_LIMIT
    )
}

pub fn profile_prompt(theme: &str, name: &str) -> String {
    format!("Create a social network profile description. Theme: {}. Name: {}.", theme, name)
}

/// Schema for the persona object, in lowercase JSON-schema form.
pub fn profile_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "bio": { "type": "string", "description": "Profile description" },
            "status": { "type": "string", "description": "Profile status line" },
            "interests": { "type": "string", "description": "Interests, comma separated" }
        },
        "required": ["bio", "status", "interests"],
        "propertyOrdering": ["bio", "status", "interests"]
    })
}

/// Parses a structured profile payload. Anything unparseable becomes the
/// default (empty) profile.
pub fn parse_profile(text: &str) -> GeneratedProfile {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return GeneratedProfile::default();
    }
    match serde_json::from_str::<GeneratedProfile>(body) {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Profile payload did not parse ({}); using empty profile", e);
            GeneratedProfile::default()
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_prompt_mentions_everything() {
        let kw = vec!["crypto".to_string(), "ai".to_string()];
        let prompt = comment_prompt("New GPU launch", &kw, "Smart expert");
        assert!(prompt.contains("\"New GPU launch\""));
        assert!(prompt.contains("crypto, ai"));
        assert!(prompt.contains("Smart expert"));
        assert!(prompt.contains("No hashtags"));
    }

    #[test]
    fn comment_prompt_tolerates_no_keywords() {
        let prompt = comment_prompt("topic", &[], "tone");
        assert!(prompt.contains("Keywords: ."));
    }

    #[test]
    fn parses_plain_profile_json() {
        let p = parse_profile(r#"{"bio":"Builder","status":"Shipping","interests":"ai, go"}"#);
        assert_eq!(p.bio, "Builder");
        assert_eq!(p.status, "Shipping");
        assert_eq!(p.interests, "ai, go");
    }

    #[test]
    fn parses_fenced_profile_json() {
        let text = "```json\n{\"bio\":\"b\",\"status\":\"s\",\"interests\":\"i\"}\n```";
        assert_eq!(parse_profile(text).status, "s");
    }

    #[test]
    fn malformed_profile_degrades_to_default() {
        assert_eq!(parse_profile("not json at all"), GeneratedProfile::default());
        assert_eq!(parse_profile(""), GeneratedProfile::default());
        assert_eq!(parse_profile("[1,2,3]"), GeneratedProfile::default());
    }
}
