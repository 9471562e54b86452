use regex::Regex;
use std::sync::OnceLock;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

/// Strip the Markdown code-fence markers some models wrap around JSON output,
/// then trim surrounding whitespace. Only the markers are removed; the text
/// between them is preserved.
pub fn strip_code_fences(raw: &str) -> String {
    let re = FENCE_RE.get_or_init(|| Regex::new(r"```json|```").expect("fence pattern is valid"));
    re.replace_all(raw, "").trim().to_string()
}
