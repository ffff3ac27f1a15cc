//! The token table of the grammar-definition language.
//!
//! Every token has a snake_case name, a canonical pattern string (what
//! diagnostics print as "the pattern") and a compiled matcher. Matching is
//! always anchored at the cursor and never consumes; the engine decides
//! whether to advance.
//!
//! Most tokens are plain regular expressions. Three are not expressible with
//! the `regex` crate because their canonical patterns use a backreference or
//! lookahead, so they are matched by hand:
//!
//! - `code`: a run of N backticks, the shortest body, then the same N-run.
//! - `regex_str`: a quoted literal closed by the quote that opened it.
//! - `rule_ref`: an identifier not immediately followed by `:`, plus the
//!   whitespace after it.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    ArgKvsep,
    ArgSep,
    ArgsSign,
    BrktBeg,
    BrktEnd,
    Code,
    End,
    LitBool,
    LitNone,
    LitNum,
    Occ01Trailer,
    Occ0mTrailer,
    Occ1mTrailer,
    OrExprOp,
    RegexStr,
    RuleColon,
    RuleName,
    RuleRef,
    SqrbrktBeg,
    SqrbrktEnd,
}

impl Token {
    /// Every token, in declaration order.
    pub const ALL: [Token; 20] = [
        Token::ArgKvsep,
        Token::ArgSep,
        Token::ArgsSign,
        Token::BrktBeg,
        Token::BrktEnd,
        Token::Code,
        Token::End,
        Token::LitBool,
        Token::LitNone,
        Token::LitNum,
        Token::Occ01Trailer,
        Token::Occ0mTrailer,
        Token::Occ1mTrailer,
        Token::OrExprOp,
        Token::RegexStr,
        Token::RuleColon,
        Token::RuleName,
        Token::RuleRef,
        Token::SqrbrktBeg,
        Token::SqrbrktEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Token::ArgKvsep => "arg_kvsep",
            Token::ArgSep => "arg_sep",
            Token::ArgsSign => "args_sign",
            Token::BrktBeg => "brkt_beg",
            Token::BrktEnd => "brkt_end",
            Token::Code => "code",
            Token::End => "end",
            Token::LitBool => "lit_bool",
            Token::LitNone => "lit_none",
            Token::LitNum => "lit_num",
            Token::Occ01Trailer => "occ01_trailer",
            Token::Occ0mTrailer => "occ0m_trailer",
            Token::Occ1mTrailer => "occ1m_trailer",
            Token::OrExprOp => "or_expr_op",
            Token::RegexStr => "regex_str",
            Token::RuleColon => "rule_colon",
            Token::RuleName => "rule_name",
            Token::RuleRef => "rule_ref",
            Token::SqrbrktBeg => "sqrbrkt_beg",
            Token::SqrbrktEnd => "sqrbrkt_end",
        }
    }

    /// The canonical pattern, as reported in diagnostics.
    pub fn pattern(self) -> &'static str {
        match self {
            Token::ArgKvsep => "=",
            Token::ArgSep => ",",
            Token::ArgsSign => "@",
            Token::BrktBeg => r"\(",
            Token::BrktEnd => r"\)",
            Token::Code => r"(`+)((?:.|\n)*?)\1",
            Token::End => "$",
            Token::LitBool => "(True|False)(?![a-zA-Z0-9_])",
            Token::LitNone => "None(?![a-zA-Z0-9_])",
            Token::LitNum => r"([-+])?(?=\d|[.]\d)(\d*)([.]\d*)?(e[-+]?\d+)?",
            Token::Occ01Trailer => r"\?",
            Token::Occ0mTrailer => r"\*",
            Token::Occ1mTrailer => r"\+",
            Token::OrExprOp => r"\|",
            Token::RegexStr => r#"r?('''|"""|'|")((?:[^\\]|\\.)*?)(\1)"#,
            Token::RuleColon => ":",
            Token::RuleName => "[a-zA-Z_][a-zA-Z0-9_]*",
            Token::RuleRef => r"([a-zA-Z_][a-zA-Z0-9_]*)(?![a-zA-Z0-9_])[\s]*(?![:])",
            Token::SqrbrktBeg => r"\[",
            Token::SqrbrktEnd => r"\]",
        }
    }

    /// Length in bytes of this token's match at the start of `rest`, if any.
    ///
    /// A `Some(0)` is a legal match (only `end` produces one).
    pub fn match_len(self, rest: &str) -> Option<usize> {
        match &MATCHERS[self as usize] {
            Matcher::Regex(re) => re.find(rest).map(|m| m.end()),
            Matcher::Code => match_code(rest).map(|code| code.len),
            Matcher::Quoted => match_quoted(rest).map(|lit| lit.len),
            Matcher::RuleRef(ident) => {
                let name_len = ident.find(rest)?.end();
                let tail = &rest[name_len..];
                if tail.starts_with(':') {
                    return None;
                }
                let trimmed = tail.trim_start();
                let mut gap = tail.len() - trimmed.len();
                // The whitespace run stops one char short of a colon.
                if trimmed.starts_with(':') {
                    gap -= tail[..gap].chars().next_back().map_or(0, char::len_utf8);
                }
                Some(name_len + gap)
            }
        }
    }

    fn matcher(self) -> Matcher {
        let source = match self {
            Token::Code => return Matcher::Code,
            Token::RegexStr => return Matcher::Quoted,
            Token::RuleRef => return Matcher::RuleRef(anchored(IDENT)),
            Token::ArgKvsep => "=",
            Token::ArgSep => ",",
            Token::ArgsSign => "@",
            Token::BrktBeg => r"\(",
            Token::BrktEnd => r"\)",
            Token::End => "$",
            Token::LitBool => r"(?:True|False)(?-u:\b)",
            Token::LitNone => r"None(?-u:\b)",
            Token::LitNum => r"(?i)[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:e[-+]?[0-9]+)?",
            Token::Occ01Trailer => r"\?",
            Token::Occ0mTrailer => r"\*",
            Token::Occ1mTrailer => r"\+",
            Token::OrExprOp => r"\|",
            Token::RuleColon => ":",
            Token::RuleName => IDENT,
            Token::SqrbrktBeg => r"\[",
            Token::SqrbrktEnd => r"\]",
        };
        Matcher::Regex(anchored(source))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// COMPILED TABLE
// ============================================================================

const IDENT: &str = "[a-zA-Z_][a-zA-Z0-9_]*";

enum Matcher {
    Regex(Regex),
    Code,
    Quoted,
    RuleRef(Regex),
}

fn anchored(source: &str) -> Regex {
    // Every source above is a constant; a failure here is a typo in this file.
    Regex::new(&format!("^(?:{source})")).expect("token pattern must compile")
}

lazy_static! {
    static ref MATCHERS: Vec<Matcher> = Token::ALL.iter().map(|t| t.matcher()).collect();
    static ref SKIP: Regex = anchored(r"(?:\s|#[^\n]*)*");
}

/// Length of the whitespace and `#` comment run at the start of `rest`.
pub fn skip_len(rest: &str) -> usize {
    SKIP.find(rest).map_or(0, |m| m.end())
}

// ============================================================================
// HAND-WRITTEN MATCHERS
// ============================================================================

/// A code block found at the start of some input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMatch {
    /// Number of backticks in the opening and closing run.
    pub fence: usize,
    /// Total length of the block including both fences.
    pub len: usize,
}

/// Matches a backtick-fenced code block.
///
/// Longer opening runs are preferred; for each run length the block closes
/// at the first later occurrence of the same run.
pub fn match_code(rest: &str) -> Option<CodeMatch> {
    let run = rest.bytes().take_while(|&b| b == b'`').count();
    (1..=run).rev().find_map(|fence| {
        rest[fence..].find(&rest[..fence]).map(|body_len| CodeMatch {
            fence,
            len: fence + body_len + fence,
        })
    })
}

/// A quoted literal found at the start of some input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedMatch {
    pub raw: bool,
    pub quote: &'static str,
    pub len: usize,
}

impl QuotedMatch {
    /// The text between the quotes of `lexeme`, which must be the matched text.
    pub fn body<'s>(&self, lexeme: &'s str) -> &'s str {
        let start = usize::from(self.raw) + self.quote.len();
        &lexeme[start..self.len - self.quote.len()]
    }
}

/// Matches a `'`, `"`, `'''` or `"""` literal with an optional `r` prefix.
///
/// A backslash escapes the next char, except a newline. Triple quotes are
/// tried before single ones.
pub fn match_quoted(rest: &str) -> Option<QuotedMatch> {
    let raw = rest.starts_with('r');
    let prefix = usize::from(raw);
    let after_prefix = &rest[prefix..];

    ["'''", "\"\"\"", "'", "\""].into_iter().find_map(|quote| {
        let body = after_prefix.strip_prefix(quote)?;
        let body_len = scan_quoted_body(body, quote)?;
        Some(QuotedMatch {
            raw,
            quote,
            len: prefix + quote.len() + body_len + quote.len(),
        })
    })
}

fn scan_quoted_body(body: &str, quote: &str) -> Option<usize> {
    let mut chars = body.char_indices();
    loop {
        let (at, c) = chars.next()?;
        if body[at..].starts_with(quote) {
            return Some(at);
        }
        if c == '\\' {
            match chars.next() {
                Some((_, escaped)) if escaped != '\n' => {}
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_tokens_match_one_char() {
        assert_eq!(Token::BrktBeg.match_len("(x"), Some(1));
        assert_eq!(Token::OrExprOp.match_len("| b"), Some(1));
        assert_eq!(Token::RuleColon.match_len("x:"), None);
    }

    #[test]
    fn end_matches_only_empty_rest() {
        assert_eq!(Token::End.match_len(""), Some(0));
        assert_eq!(Token::End.match_len("\n"), None);
    }

    #[test]
    fn keywords_need_a_word_boundary() {
        assert_eq!(Token::LitBool.match_len("True)"), Some(4));
        assert_eq!(Token::LitBool.match_len("Trueish"), None);
        assert_eq!(Token::LitNone.match_len("None"), Some(4));
        assert_eq!(Token::LitNone.match_len("None_"), None);
    }

    #[test]
    fn numbers_need_a_digit_next_to_the_point() {
        assert_eq!(Token::LitNum.match_len("-12.5e3,"), Some(7));
        assert_eq!(Token::LitNum.match_len(".5"), Some(2));
        assert_eq!(Token::LitNum.match_len("5."), Some(2));
        assert_eq!(Token::LitNum.match_len("1E-2"), Some(4));
        assert_eq!(Token::LitNum.match_len("."), None);
        assert_eq!(Token::LitNum.match_len("+x"), None);
    }

    #[test]
    fn rule_ref_rejects_only_an_adjacent_colon() {
        assert_eq!(Token::RuleRef.match_len("foo bar"), Some(4));
        assert_eq!(Token::RuleRef.match_len("foo"), Some(3));
        assert_eq!(Token::RuleRef.match_len("foo:"), None);
        assert_eq!(Token::RuleRef.match_len("foo : d"), Some(3));
        assert_eq!(Token::RuleRef.match_len("foo\n: d"), Some(3));
        assert_eq!(Token::RuleRef.match_len("foo \n :"), Some(5));
        assert_eq!(Token::RuleName.match_len("foo:"), Some(3));
    }

    #[test]
    fn code_prefers_the_longest_fence() {
        assert_eq!(match_code("``a`b`` rest"), Some(CodeMatch { fence: 2, len: 7 }));
        assert_eq!(match_code("`a`"), Some(CodeMatch { fence: 1, len: 3 }));
        assert_eq!(match_code("```x``"), Some(CodeMatch { fence: 2, len: 6 }));
        assert_eq!(match_code("`open"), None);
    }

    #[test]
    fn code_body_may_span_lines() {
        let src = "`\nline\n` tail";
        assert_eq!(Token::Code.match_len(src), Some(8));
    }

    #[test]
    fn quoted_literals() {
        let lit = match_quoted(r#"'a\'b' x"#).unwrap();
        assert_eq!(lit.len, 6);
        assert!(!lit.raw);

        let lit = match_quoted(r"r'\d+'").unwrap();
        assert!(lit.raw);
        assert_eq!(lit.body(r"r'\d+'"), r"\d+");

        let lit = match_quoted("'''a'b'''").unwrap();
        assert_eq!(lit.quote, "'''");
        assert_eq!(lit.len, 9);
    }

    #[test]
    fn unterminated_triple_quote_falls_back_to_single() {
        let lit = match_quoted("''' x").unwrap();
        assert_eq!(lit.quote, "'");
        assert_eq!(lit.len, 2);
    }

    #[test]
    fn escaped_newline_does_not_continue_a_literal() {
        assert_eq!(match_quoted("'a\\\nb'"), None);
        assert_eq!(match_quoted("'a\nb'").map(|l| l.len), Some(5));
        assert_eq!(match_quoted("rx"), None);
    }

    #[test]
    fn skip_covers_whitespace_and_comments() {
        assert_eq!(skip_len("  # note\n\t x"), 11);
        assert_eq!(skip_len("x"), 0);
        assert_eq!(skip_len("#only"), 5);
    }
}
