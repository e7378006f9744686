use regex::Regex;

/// Compile a query string literal into its search regex.
///
/// The input is lowercased and matched case-insensitively. ASCII patterns
/// are anchored on word boundaries; `?` and `*` expand to `.` and a
/// non-greedy `.*?` (escape with `\?`/`\*`), and everything else is
/// regex-quoted.
pub(crate) fn search_regex(input: &str) -> Regex {
    let lowered = input.to_lowercase();
    let ascii_only = lowered.is_ascii();
    let chars: Vec<char> = lowered.chars().collect();

    let mut pattern = String::from("(?i)");
    if ascii_only {
        pattern.push_str(r"\b");
    }
    let mut chunk = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if matches!(chars.get(i + 1), Some('?') | Some('*')) => {
                chunk.push(chars[i + 1]);
                i += 2;
                continue;
            }
            c @ ('?' | '*') => {
                pattern.push_str(&regex::escape(&chunk));
                chunk.clear();
                pattern.push_str(if c == '?' { "." } else { ".*?" });
            }
            c => chunk.push(c),
        }
        i += 1;
    }
    pattern.push_str(&regex::escape(&chunk));
    if ascii_only {
        pattern.push_str(r"\b");
    }
    Regex::new(&pattern).expect("wildcard pattern must compile")
}

/// A locale-less loose matcher for unicode strings: case-insensitive
/// substring search with unicode simple folding.
pub(crate) struct FuzzyPattern {
    re: Regex,
}

impl FuzzyPattern {
    pub fn new(input: &str) -> Self {
        let pattern = format!("(?i){}", regex::escape(input));
        Self {
            re: Regex::new(&pattern).expect("quoted pattern must compile"),
        }
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.re.is_match(haystack)
    }
}

pub(crate) fn has_wildcard(s: &str) -> bool {
    s.contains(['?', '*'])
}
