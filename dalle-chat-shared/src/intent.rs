//! Intent classification shared by the relay and the chat UI.
//!
//! Both ends must agree on whether a message is an image request, so the
//! predicate and the prompt extraction rule live here and nowhere else.

use once_cell::sync::Lazy;
use regex::Regex;

/// Action verb followed, anywhere later in the text, by an artifact noun.
static IMAGE_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(generate|create|draw|make).*(image|picture|artwork|drawing)")
        .expect("image intent pattern is valid")
});

/// Request phrasing stripped from the front of an image prompt.
static REQUEST_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:can you |please |could you )?(?:generate|create|draw|make)(?: me)?(?: an?| the)? (?:image|picture|artwork|drawing)(?: of| for)?(?: (?:an?|the)\b)?",
    )
    .expect("request phrase pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Conversational text, answered with a token stream.
    Chat,
    /// Image generation, answered with a single URL.
    Image,
}

impl Intent {
    pub fn classify(message: &str) -> Self {
        if IMAGE_INTENT.is_match(message) {
            Intent::Image
        } else {
            Intent::Chat
        }
    }

    pub fn is_image(self) -> bool {
        self == Intent::Image
    }
}

/// Removes the first request phrase ("can you generate an image of a ...")
/// and returns what is left, trimmed.
pub fn extract_image_prompt(message: &str) -> String {
    REQUEST_PHRASE.replace(message, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_image_requests() {
        for message in [
            "can you generate an image of a sunset",
            "Draw me a picture of a cat",
            "please CREATE artwork for my album",
            "make a drawing",
            "could you make something like an image of the sea",
        ] {
            assert_eq!(Intent::classify(message), Intent::Image, "{message}");
        }
    }

    #[test]
    fn classifies_chat_requests() {
        for message in [
            "what is the capital of France",
            "an image is worth a thousand words",
            "picture this: we generate revenue",
            "",
        ] {
            assert_eq!(Intent::classify(message), Intent::Chat, "{message}");
        }
    }

    #[test]
    fn noun_must_follow_verb() {
        assert_eq!(Intent::classify("image, then generate"), Intent::Chat);
        assert_eq!(Intent::classify("image, then generate a drawing"), Intent::Image);
    }

    #[test]
    fn substrings_count() {
        assert_eq!(Intent::classify("the makeshift imagery"), Intent::Image);
    }

    #[test]
    fn strips_request_phrase_and_article() {
        assert_eq!(extract_image_prompt("can you generate an image of a sunset"), "sunset");
        assert_eq!(extract_image_prompt("Please draw me a picture of the moon"), "moon");
        assert_eq!(extract_image_prompt("make a drawing for my mom"), "my mom");
        assert_eq!(extract_image_prompt("Could you create artwork of an owl"), "owl");
    }

    #[test]
    fn article_must_be_a_whole_word() {
        assert_eq!(extract_image_prompt("generate an image of anything"), "anything");
        assert_eq!(extract_image_prompt("generate an image of apples"), "apples");
    }

    #[test]
    fn bare_request_leaves_empty_prompt() {
        assert_eq!(extract_image_prompt("please create the picture"), "");
    }

    #[test]
    fn reordered_phrasing_keeps_trailing_request() {
        assert_eq!(
            extract_image_prompt("draw artwork of a cat, please create it"),
            "cat, please create it"
        );
    }

    #[test]
    fn mid_sentence_phrase_is_cut_out() {
        assert_eq!(
            extract_image_prompt("I want to draw a picture of my dog"),
            "I want to  my dog"
        );
    }

    #[test]
    fn loose_match_without_phrase_keeps_message() {
        // classified as an image request, but no contiguous phrase to strip
        let message = "generate something, maybe an image";
        assert!(Intent::classify(message).is_image());
        assert_eq!(extract_image_prompt(message), message);
    }
}
