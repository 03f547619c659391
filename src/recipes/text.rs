//! Text clean-up for recipe content
//!
//! Spoonacular summaries and instructions are HTML fragments; cards and
//! translations work on plain text.

/// Maximum length of a card description, in characters
pub const CARD_DESCRIPTION_LEN: usize = 120;

/// Remove every `<...>` tag and trim the result
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.trim().to_string()
}

/// First `max` characters of `text` (never splits a code point)
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Plain-text excerpt used on recipe cards
pub fn card_description(summary: &str) -> String {
    truncate_chars(&strip_html(summary), CARD_DESCRIPTION_LEN)
}

/// Rewrite Spoonacular thumbnail sizes to the largest rendition (636x393)
pub fn high_quality_image(url: &str) -> String {
    url.replace("312x231", "636x393")
        .replace("556x370", "636x393")
        .replace("90x90", "636x393")
}

/// Split an instructions HTML block into non-empty lines
pub fn instruction_lines(html: &str) -> Vec<String> {
    let spaced = html
        .replace("</li>", "\n")
        .replace("</p>", "\n")
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n");

    strip_html(&spaced)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
