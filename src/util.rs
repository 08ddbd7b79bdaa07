use lazy_static::lazy_static;
use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn is_valid_url(url: &str) -> bool {
    lazy_static! {
        static ref URL_RE: Regex = Regex::new(r"^https?://[^\s]+$").unwrap();
    }
    URL_RE.is_match(url)
}

/// Trims surrounding whitespace and strips `<script>...</script>` blocks,
/// tag and content included. Other markup is left untouched.
pub fn sanitize_string(input: &str) -> String {
    lazy_static! {
        static ref SCRIPT_RE: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
    }
    SCRIPT_RE.replace_all(input, "").trim().to_string()
}

/// Lowercases, drops non-word characters and joins words with dashes.
pub fn generate_slug(text: &str) -> String {
    lazy_static! {
        static ref NON_WORD_RE: Regex = Regex::new(r"[^\w ]+").unwrap();
        static ref SPACES_RE: Regex = Regex::new(r" +").unwrap();
    }
    let lowered = text.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    SPACES_RE.replace_all(&stripped, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_email() {
        assert!(is_valid_email("someone@example.com"));
    }

    #[test]
    fn rejects_email_without_domain_dot() {
        assert!(!is_valid_email("someone@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@at@example.com"));
    }

    #[test]
    fn accepts_http_and_https_urls() {
        assert!(is_valid_url("https://example.com/portfolio"));
        assert!(is_valid_url("http://localhost:3000"));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("https://has space.com"));
    }

    #[test]
    fn sanitize_strips_script_blocks() {
        let input = "hello <script>alert('xss')</script>world";
        assert_eq!(sanitize_string(input), "hello world");
    }

    #[test]
    fn sanitize_strips_script_with_attributes_case_insensitive() {
        let input = "<SCRIPT type=\"text/javascript\">evil()</SCRIPT>ok";
        assert_eq!(sanitize_string(input), "ok");
    }

    #[test]
    fn sanitize_keeps_unrelated_angle_brackets() {
        let input = "  a < b and 2 > 1  ";
        assert_eq!(sanitize_string(input), "a < b and 2 > 1");
    }

    #[test]
    fn slug_joins_words_with_dashes() {
        assert_eq!(generate_slug("My First Project!"), "my-first-project");
    }

    #[test]
    fn slug_drops_punctuation() {
        assert_eq!(generate_slug("Rust & WebAssembly (2024)"), "rust-webassembly-2024");
    }
}
