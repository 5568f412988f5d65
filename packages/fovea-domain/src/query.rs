use std::sync::LazyLock;

use regex::Regex;

static REFERENCE_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)similarto:(\S+)").expect("Pattern is valid."));

/// A raw query string split into its free-text part and its `similarTo:` references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedQuery {
	/// Whitespace-normalized free text, possibly empty.
	pub text: String,
	/// Reference tokens in first-seen order. Duplicates are kept.
	pub reference_ids: Vec<String>,
}

impl ParsedQuery {
	pub fn is_empty(&self) -> bool {
		self.text.is_empty() && self.reference_ids.is_empty()
	}
}

/// Splits a raw query into free text and `similarTo:<token>` references.
///
/// Matching is case-insensitive and non-overlapping, left to right. A token is the
/// maximal run of non-whitespace characters after the colon, so `similarTo:` followed
/// by whitespace is left in the text untouched. Never fails; a pathological input
/// simply yields an empty result.
pub fn parse(raw: &str) -> ParsedQuery {
	let mut reference_ids = Vec::new();
	let mut text = String::with_capacity(raw.len());
	let mut cursor = 0;

	for captures in REFERENCE_PATTERN.captures_iter(raw) {
		let matched = captures.get(0).expect("Group 0 always exists.");
		let token = captures.get(1).expect("Pattern has one capture group.");

		reference_ids.push(token.as_str().to_string());
		text.push_str(&raw[cursor..matched.start()]);
		cursor = matched.end();
	}

	text.push_str(&raw[cursor..]);

	ParsedQuery { text: tidy(&text), reference_ids }
}

/// Strips a single trailing comma, collapses whitespace runs, and trims.
fn tidy(text: &str) -> String {
	let trimmed = text.trim_end();
	let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);

	trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
