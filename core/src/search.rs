//! Search phrase parsing.
//!
//! A phrase is a sequence of whitespace-separated terms. Plain terms and
//! `"quoted phrases"` are required; terms joined by `OR` form one group of
//! which any may match; `-term` or `-"phrase"` excludes a term.
//!
//! ```
//! use quarry_core::SearchPhrase;
//!
//! let phrase = SearchPhrase::parse(r#"Amanita "fly agaric" OR muscaria -pantherina"#);
//! assert_eq!(phrase.goods, vec![vec!["Amanita"], vec!["fly agaric", "muscaria"]]);
//! assert_eq!(phrase.bads, vec!["pantherina"]);
//! ```

use crate::dialect::Dialect;

/// Parsed search phrase
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPhrase {
    /// Required groups; each group matches when any of its terms does
    pub goods: Vec<Vec<String>>,
    /// Terms that must not match
    pub bads: Vec<String>,
}

impl SearchPhrase {
    pub fn parse(input: &str) -> Self {
        let tokens = tokenize(input);
        let mut phrase = SearchPhrase::default();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if let Some(excluded) = token.excluded() {
                phrase.bads.push(excluded);
                i += 1;
                continue;
            }

            let mut group = vec![token.text.clone()];
            i += 1;
            // "OR" binds greedily to the following term
            while i + 1 < tokens.len() && tokens[i].is_or() {
                group.push(tokens[i + 1].text.clone());
                i += 2;
            }
            phrase.goods.push(group);
        }
        phrase
    }

    pub fn is_blank(&self) -> bool {
        self.goods.is_empty() && self.bads.is_empty()
    }

    /// Renders `LIKE` conditions against `column`, one per group and exclusion.
    ///
    /// `*` in a term matches any run of characters. Matching ignores case
    /// and accents (see [`Dialect::contains`]).
    pub fn conditions(&self, column: &str, dialect: Dialect) -> Vec<String> {
        let mut out = Vec::with_capacity(self.goods.len() + self.bads.len());
        for group in &self.goods {
            let ors = group
                .iter()
                .map(|t| dialect.contains(column, t, false))
                .collect::<Vec<_>>();
            out.push(if ors.len() == 1 {
                ors.join("")
            } else {
                format!("({})", ors.join(" OR "))
            });
        }
        for bad in &self.bads {
            out.push(dialect.contains(column, bad, true));
        }
        out
    }
}

/// Name of the SQL function a SQLite connection registers for [`fold`].
pub const FOLD_FUNCTION: &str = "quarry_fold";

/// Lowercases `text` and strips accents from Latin letters.
///
/// ```
/// use quarry_core::search::fold;
///
/// assert_eq!(fold("ÄPFEL Été"), "apfel ete");
/// assert_eq!(fold("Straße"), "strasse");
/// ```
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'à'..='å' | 'ā' | 'ă' | 'ą' => out.push('a'),
            'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => out.push('c'),
            'ď' | 'đ' => out.push('d'),
            'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => out.push('e'),
            'ĝ' | 'ğ' | 'ġ' | 'ģ' => out.push('g'),
            'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => out.push('i'),
            'ķ' => out.push('k'),
            'ĺ' | 'ļ' | 'ľ' | 'ł' => out.push('l'),
            'ñ' | 'ń' | 'ņ' | 'ň' => out.push('n'),
            'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => out.push('o'),
            'ŕ' | 'ŗ' | 'ř' => out.push('r'),
            'ś' | 'ŝ' | 'ş' | 'š' => out.push('s'),
            'ţ' | 'ť' => out.push('t'),
            'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'ź' | 'ż' | 'ž' => out.push('z'),
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'þ' => out.push_str("th"),
            // combining marks left over from lowercasing or decomposed input
            '\u{300}'..='\u{36f}' => {}
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug)]
struct Token {
    text: String,
    quoted: bool,
    negated: bool,
}

impl Token {
    fn is_or(&self) -> bool {
        !self.quoted && !self.negated && self.text == "OR"
    }

    fn excluded(&self) -> Option<String> {
        if self.negated {
            Some(self.text.clone())
        } else {
            None
        }
    }
}

/// Splits on whitespace, keeping `"..."` together. An unterminated quote
/// runs to the end of the input.
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.trim().chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut negated = false;
        if c == '-' {
            chars.next();
            match chars.peek() {
                Some(&next) if !next.is_whitespace() => negated = true,
                // a lone "-" is just a term
                _ => {
                    tokens.push(Token {
                        text: "-".to_string(),
                        quoted: false,
                        negated: false,
                    });
                    continue;
                }
            }
        }

        let (text, quoted) = if chars.peek() == Some(&'"') {
            chars.next();
            let mut text = String::new();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                text.push(c);
            }
            (text, true)
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            (text, false)
        };

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }
        tokens.push(Token {
            text,
            quoted,
            negated,
        });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_excluded() {
        let phrase = SearchPhrase::parse("Amanita -muscaria");
        assert_eq!(phrase.goods, vec![vec!["Amanita".to_string()]]);
        assert_eq!(phrase.bads, vec!["muscaria".to_string()]);
    }

    #[test]
    fn test_or_groups_are_greedy() {
        let phrase = SearchPhrase::parse("a OR b OR c d");
        assert_eq!(
            phrase.goods,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()]
            ]
        );
    }

    #[test]
    fn test_quoted_phrases() {
        let phrase = SearchPhrase::parse(r#"-"fly   agaric" "death cap""#);
        assert_eq!(phrase.bads, vec!["fly agaric".to_string()]);
        assert_eq!(phrase.goods, vec![vec!["death cap".to_string()]]);
    }

    #[test]
    fn test_trailing_or_is_a_term() {
        let phrase = SearchPhrase::parse("boletus OR");
        assert_eq!(
            phrase.goods,
            vec![vec!["boletus".to_string()], vec!["OR".to_string()]]
        );
    }

    #[test]
    fn test_blank() {
        assert!(SearchPhrase::parse("   ").is_blank());
    }

    #[test]
    fn test_conditions() {
        let phrase = SearchPhrase::parse("a OR b -c%");
        let conds = phrase.conditions("names.search_name", Dialect::MySQL);
        assert_eq!(
            conds,
            vec![
                "(names.search_name LIKE '%a%' OR names.search_name LIKE '%b%')".to_string(),
                "names.search_name NOT LIKE '%c\\\\%%'".to_string(),
            ]
        );

        let conds = phrase.conditions("x", Dialect::SQLite);
        assert_eq!(conds[1], "quarry_fold(x) NOT LIKE '%c\\%%' ESCAPE '\\'");
    }

    #[test]
    fn test_sqlite_terms_are_folded() {
        let phrase = SearchPhrase::parse("Äpfel ÉTÉ");
        let conds = phrase.conditions("names.search_name", Dialect::SQLite);
        assert_eq!(
            conds,
            vec![
                "quarry_fold(names.search_name) LIKE '%apfel%' ESCAPE '\\'".to_string(),
                "quarry_fold(names.search_name) LIKE '%ete%' ESCAPE '\\'".to_string(),
            ]
        );
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold("Amanita"), "amanita");
        assert_eq!(fold("CÔTE-D'IVOIRE"), "cote-d'ivoire");
        assert_eq!(fold("Łódź"), "lodz");
        assert_eq!(fold("Cæsar"), "caesar");
        assert_eq!(fold("e\u{301}te\u{301}"), "ete");
        assert_eq!(fold("50%_off"), "50%_off");
    }
}
