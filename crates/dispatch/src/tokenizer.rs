//! Command text tokenizer and flag extractor.
//!
//! Flags are out-of-band `--name[=value]` tokens that may appear anywhere in a
//! command message. They are pulled out of the text before it is split into
//! the command token and positional arguments:
//!
//! ```text
//! !ban @spammer --days=7 --reason="too many \"links\"" --silent
//!  └─ command "ban", args ["@spammer"]
//!     flags {days: "7", reason: r#"too many \"links\""#, silent: "silent"}
//! ```
//!
//! Grammar, matched left to right with leftmost-first alternation:
//!
//! - introducer: `--` or an em-dash `—`
//! - name: an ASCII word character followed by one or more word characters or
//!   hyphens (the name is at least two characters long)
//! - optional `=value`, where value is the first of these that matches:
//!   `"…"`, `'…'`, `“…”`, `‘…’` (a backslash escapes the next character, the
//!   escape is kept verbatim) or a bare run of word characters and hyphens.
//!
//! A flag without a value, or with an empty quoted value, maps to its own name.
//! When the same name appears twice the later occurrence wins.

use std::collections::HashMap;

use {
    once_cell::sync::Lazy,
    regex::{Captures, Regex},
};

/// Flag name → raw flag value.
pub type FlagMap = HashMap<String, String>;

/// A prefixed message split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// First token after the prefix, lower-cased.
    pub command: String,
    /// Remaining space-separated tokens, case preserved.
    pub args: Vec<String>,
    pub flags: FlagMap,
    /// Message text with flags removed and whitespace normalized, prefix included.
    pub content: String,
}

/// Split `text` into command token, arguments and flags.
///
/// Returns `None` when `text` does not start with `prefix`, or when nothing
/// but whitespace and flags follows the prefix.
pub fn tokenize(text: &str, prefix: &str) -> Option<Invocation> {
    if !text.starts_with(prefix) {
        return None;
    }

    let (content, flags) = extract_flags(text);

    // Strip by length: the cleaned text may no longer carry the exact prefix
    // (e.g. a prefix ending in whitespace that was trimmed away).
    let body = content.get(prefix.len()..)?;
    if body.is_empty() {
        return None;
    }

    let mut tokens = body.split(' ');
    let command = tokens.next()?.to_lowercase();
    if command.is_empty() {
        return None;
    }
    let args = tokens.map(str::to_string).collect();

    Some(Invocation {
        command,
        args,
        flags,
        content,
    })
}

/// Remove every flag from `text` and return the cleaned text with the flags.
///
/// The cleaned text has each whitespace run collapsed to its first character
/// and leading/trailing spaces trimmed.
pub fn extract_flags(text: &str) -> (String, FlagMap) {
    let mut flags = FlagMap::new();
    let stripped = FLAG_PATTERN.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        let value = (2..=6)
            .find_map(|idx| caps.get(idx))
            .map(|m| m.as_str())
            .filter(|v| !v.is_empty())
            .unwrap_or(name);
        flags.insert(name.to_string(), value.to_string());
        ""
    });

    let collapsed = WHITESPACE_RUN.replace_all(&stripped, "$1");
    (collapsed.trim_matches(' ').to_string(), flags)
}

// Word characters are ASCII only: `ö` never extends a flag name.
static FLAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?:--|—)([0-9A-Za-z_][0-9A-Za-z_-]+)",
        r"(?:=(?:",
        r#""((?:[^"\\]|\\.)*)""#,
        r"|'((?:[^'\\]|\\.)*)'",
        r"|[“”]((?:[^“”\\]|\\.)*)[“”]",
        r"|[‘’]((?:[^‘’\\]|\\.)*)[‘’]",
        r"|([0-9A-Za-z_-]+)",
        r"))?",
    ))
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| compile(r"([\t\n\x0C\r ])[\t\n\x0C\r ]+"));

#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern is valid")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn flags(pairs: &[(&str, &str)]) -> FlagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("ping", "!")]
    #[case("?ping", "!")]
    #[case(" !ping", "!")]
    #[case("", "!")]
    #[case("sap ping", "sap!")]
    fn text_without_prefix_is_rejected(#[case] text: &str, #[case] prefix: &str) {
        assert_eq!(tokenize(text, prefix), None);
    }

    #[rstest]
    #[case("!")]
    #[case("!   ")]
    #[case("!--loud")]
    #[case("! --loud --quiet")]
    #[case("!--loud ping")]
    fn nothing_after_prefix_yields_no_command(#[case] text: &str) {
        assert_eq!(tokenize(text, "!"), None);
    }

    #[test]
    fn boolean_flag_maps_to_its_name() {
        let inv = tokenize("!ping --loud", "!").unwrap();
        assert_eq!(inv.command, "ping");
        assert!(inv.args.is_empty());
        assert_eq!(inv.flags, flags(&[("loud", "loud")]));
        assert_eq!(inv.content, "!ping");
    }

    #[test]
    fn plain_value_is_captured_and_removed() {
        let inv = tokenize("!deploy --env=prod-eu now", "!").unwrap();
        assert_eq!(inv.flags, flags(&[("env", "prod-eu")]));
        assert_eq!(inv.args, vec!["now"]);
        assert!(!inv.content.contains("--env=prod-eu"));
    }

    #[test]
    fn whitespace_left_by_removed_flags_is_collapsed() {
        let inv = tokenize("!cmd  --flag=x   arg1", "!").unwrap();
        assert_eq!(inv.content, "!cmd arg1");
        assert_eq!(inv.args, vec!["arg1"]);
        assert_eq!(inv.flags, flags(&[("flag", "x")]));
    }

    #[test]
    fn escaped_quotes_are_kept_verbatim() {
        let inv = tokenize(r#"!say --msg="he said \"hi\"""#, "!").unwrap();
        assert_eq!(inv.flags["msg"], r#"he said \"hi\""#);
        assert_eq!(inv.content, "!say");
    }

    #[rstest]
    #[case(r#"--v1="a b""#, "a b")]
    #[case("--v1='a b'", "a b")]
    #[case(r"--v1='it\'s'", r"it\'s")]
    #[case("--v1=“a b”", "a b")]
    #[case("--v1=”a b“", "a b")]
    #[case("--v1=‘a b’", "a b")]
    #[case(r#"--v1="a\\""#, r"a\\")]
    #[case("--v1=snake_case-ok", "snake_case-ok")]
    fn value_forms(#[case] flag: &str, #[case] expected: &str) {
        let (content, found) = extract_flags(&format!("x {flag} y"));
        assert_eq!(found["v1"], expected);
        assert_eq!(content, "x y");
    }

    #[test]
    fn empty_quoted_value_falls_back_to_name() {
        let (content, found) = extract_flags(r#"--mode="" go"#);
        assert_eq!(found, flags(&[("mode", "mode")]));
        assert_eq!(content, "go");
    }

    #[test]
    fn unterminated_quote_leaves_value_in_text() {
        let (content, found) = extract_flags(r#"!say --msg="oops"#);
        assert_eq!(found, flags(&[("msg", "msg")]));
        assert_eq!(content, r#"!say ="oops"#);
    }

    #[test]
    fn escaped_newline_does_not_close_a_quote() {
        let (content, found) = extract_flags("--msg=\"a\\\nb\"");
        assert_eq!(found, flags(&[("msg", "msg")]));
        assert_eq!(content, "=\"a\\\nb\"");
    }

    #[test]
    fn em_dash_introducer() {
        let inv = tokenize("!ping —loud —times=3", "!").unwrap();
        assert_eq!(inv.flags, flags(&[("loud", "loud"), ("times", "3")]));
        assert_eq!(inv.content, "!ping");
    }

    #[test]
    fn later_duplicate_wins() {
        let inv = tokenize("!p --mode=a x --mode=b", "!").unwrap();
        assert_eq!(inv.flags, flags(&[("mode", "b")]));
        assert_eq!(inv.args, vec!["x"]);
    }

    #[test]
    fn flags_at_start_and_end() {
        let (content, found) = extract_flags("--first hello world --last=1");
        assert_eq!(content, "hello world");
        assert_eq!(found, flags(&[("first", "first"), ("last", "1")]));
    }

    #[test]
    fn abutting_flags() {
        // A quoted value ends at its closing quote.
        let (content, found) = extract_flags(r#"--aa="x"--bb"#);
        assert_eq!(found, flags(&[("aa", "x"), ("bb", "bb")]));
        assert_eq!(content, "");

        // Bare values and names swallow hyphens.
        let (_, found) = extract_flags("--aa=1--bb");
        assert_eq!(found, flags(&[("aa", "1--bb")]));
        let (_, found) = extract_flags("--aa--bb");
        assert_eq!(found, flags(&[("aa--bb", "aa--bb")]));
    }

    #[rstest]
    #[case("!p --v", &["--v"])]
    #[case("!p --", &["--"])]
    #[case("!p --_x", &[])]
    #[case("!p ---verbose", &["-"])]
    #[case("!p --=x", &["--=x"])]
    fn name_rules(#[case] text: &str, #[case] args: &[&str]) {
        let inv = tokenize(text, "!").unwrap();
        assert_eq!(inv.args, args);
    }

    #[test]
    fn command_is_lowercased_args_are_not() {
        let inv = tokenize("!PiNg Hello WORLD", "!").unwrap();
        assert_eq!(inv.command, "ping");
        assert_eq!(inv.args, vec!["Hello", "WORLD"]);
    }

    #[test]
    fn multi_character_prefix() {
        let inv = tokenize("sap!help me --all", "sap!").unwrap();
        assert_eq!(inv.command, "help");
        assert_eq!(inv.args, vec!["me"]);
        assert_eq!(inv.flags, flags(&[("all", "all")]));
    }

    #[test]
    fn space_after_prefix_yields_no_command() {
        assert_eq!(tokenize("! ping", "!"), None);
    }

    #[test]
    fn non_ascii_text_survives() {
        let inv = tokenize("!echo héllo —wörld ünï", "!").unwrap();
        // `ö` is not an ASCII word character, so the name stops at `w` and
        // is too short to be a flag.
        assert!(inv.flags.is_empty());
        assert_eq!(inv.args, vec!["héllo", "—wörld", "ünï"]);
    }

    #[rstest]
    #[case("a \t\n b", "a b")]
    #[case("a\n  b", "a\nb")]
    #[case("  a b  ", "a b")]
    #[case("\ta", "\ta")]
    fn collapse_keeps_first_whitespace_character(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(extract_flags(text).0, expected);
    }
}
