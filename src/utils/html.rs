// src/utils/html.rs

use std::collections::HashSet;

/// Reduces user-supplied free text (profile fields, meal prompts) to plain
/// text: every tag is stripped, `<script>`/`<style>` along with their content.
///
/// ammonia serializes its output as HTML, so the entities it emits are decoded
/// again. The result goes into JSON and prompts, never into markup.
pub fn sanitize_text(input: &str) -> String {
    let cleaned = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();
    html_escape::decode_html_entities(&cleaned).trim().to_string()
}

/// Sanitizes an optional field, dropping it if nothing is left.
pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stripped_but_text_is_kept() {
        assert_eq!(sanitize_text("  <b>more</b> paneer  "), "more paneer");
        assert_eq!(sanitize_text("no <script>alert(1)</script>nuts"), "no nuts");
        assert_eq!(sanitize_text("I don't eat eggs"), "I don't eat eggs");
    }

    #[test]
    fn special_characters_survive_as_plain_text() {
        assert_eq!(
            sanitize_text("fish & chips, fat < 20 g"),
            "fish & chips, fat < 20 g"
        );
        assert_eq!(sanitize_text("Trinidad & Tobago"), "Trinidad & Tobago");
        assert_eq!(sanitize_text("<b>low \"carb\"</b> > 3 meals"), "low \"carb\" > 3 meals");
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(sanitize_optional(Some("<i></i>")), None);
        assert_eq!(sanitize_optional(None), None);
        assert_eq!(sanitize_optional(Some("India")), Some("India".to_string()));
    }
}
