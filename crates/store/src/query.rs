//! Search query model for user listings.
//!
//! The grammar is deliberately small: whitespace-separated bare terms match
//! any text field, `field = value` pairs match one field, and values may be
//! double-quoted to include spaces. Matching is case-insensitive substring.

use core::str::FromStr;

use thiserror::Error;

use userward_core::User;

/// A field addressable in a `field = value` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Username,
    Mail,
    Firstname,
    Lastname,
}

impl QueryField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "username" | "login" => Some(Self::Username),
            "mail" => Some(Self::Mail),
            "firstname" => Some(Self::Firstname),
            "lastname" => Some(Self::Lastname),
            _ => None,
        }
    }
}

/// One matching clause; all clauses of a query must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    field: Option<QueryField>,
    value: String,
}

/// Malformed search syntax.
///
/// Callers are expected to recover from this (fall back to an unfiltered
/// listing), never to fail the request on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("unterminated quoted value")]
    UnterminatedQuote,

    #[error("unknown search field '{0}'")]
    UnknownField(String),

    #[error("missing value after '{0} ='")]
    MissingValue(String),

    #[error("'=' without a preceding field name")]
    DanglingOperator,
}

/// A parsed search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<Term>,
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Eq,
}

fn tokenize(raw: &str) -> Result<Vec<Token>, QueryParseError> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '=' {
            chars.next();
            tokens.push(Token::Eq);
        } else if c == '"' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => value.push(c),
                    None => return Err(QueryParseError::UnterminatedQuote),
                }
            }
            tokens.push(Token::Word(value));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '=' || c == '"' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

impl SearchQuery {
    /// The query that matches every user.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn parse(raw: &str) -> Result<Self, QueryParseError> {
        let tokens = tokenize(raw)?;
        let mut terms = Vec::new();
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            match token {
                Token::Eq => return Err(QueryParseError::DanglingOperator),
                Token::Word(word) => {
                    if iter.peek() == Some(&Token::Eq) {
                        iter.next();
                        let field = QueryField::parse(&word)
                            .ok_or_else(|| QueryParseError::UnknownField(word.clone()))?;
                        match iter.next() {
                            Some(Token::Word(value)) => terms.push(Term {
                                field: Some(field),
                                value,
                            }),
                            _ => return Err(QueryParseError::MissingValue(word)),
                        }
                    } else if !word.is_empty() {
                        terms.push(Term {
                            field: None,
                            value: word,
                        });
                    }
                }
            }
        }

        Ok(Self { terms })
    }

    /// Whether `user` satisfies every clause of this query.
    pub fn matches(&self, user: &User) -> bool {
        self.terms.iter().all(|term| term_matches(term, user))
    }
}

impl FromStr for SearchQuery {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn term_matches(term: &Term, user: &User) -> bool {
    let field_value = |field: QueryField| -> Option<&str> {
        match field {
            QueryField::Username => Some(user.username()),
            QueryField::Mail => user.mail.as_deref(),
            QueryField::Firstname => user.firstname.as_deref(),
            QueryField::Lastname => user.lastname.as_deref(),
        }
    };

    match term.field {
        Some(field) => field_value(field).is_some_and(|v| contains_ci(v, &term.value)),
        None => [
            QueryField::Username,
            QueryField::Mail,
            QueryField::Firstname,
            QueryField::Lastname,
        ]
        .into_iter()
        .any(|f| field_value(f).is_some_and(|v| contains_ci(v, &term.value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userward_core::{RoleId, UserId};

    fn user(username: &str, mail: &str) -> User {
        let mut u = User::new(UserId::new(), username, RoleId::new());
        u.mail = Some(mail.to_string());
        u
    }

    #[test]
    fn empty_query_matches_everyone() {
        let q = SearchQuery::parse("").unwrap();
        assert!(q.is_empty());
        assert!(q.matches(&user("alice", "alice@example.com")));
    }

    #[test]
    fn bare_term_matches_any_text_field() {
        let q = SearchQuery::parse("ali").unwrap();
        assert!(q.matches(&user("alice", "a@example.com")));
        assert!(q.matches(&user("bob", "ali@example.com")));
        assert!(!q.matches(&user("bob", "b@example.com")));
    }

    #[test]
    fn field_term_is_scoped() {
        let q = SearchQuery::parse("username = ali").unwrap();
        assert!(q.matches(&user("alice", "x@example.com")));
        assert!(!q.matches(&user("bob", "ali@example.com")));
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let mut u = user("carol", "c@example.com");
        u.firstname = Some("Carol Anne".to_string());
        let q = SearchQuery::parse("firstname = \"Carol Anne\"").unwrap();
        assert!(q.matches(&u));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let q = SearchQuery::parse("username = ALICE").unwrap();
        assert!(q.matches(&user("alice", "a@example.com")));
    }

    #[test]
    fn multiple_terms_are_conjunctive() {
        let q = SearchQuery::parse("username = ali mail = example").unwrap();
        assert!(q.matches(&user("alice", "a@example.com")));
        assert!(!q.matches(&user("alice", "a@other.net")));
    }

    #[test]
    fn malformed_queries_are_typed_errors() {
        assert_eq!(
            SearchQuery::parse("username = \"oops"),
            Err(QueryParseError::UnterminatedQuote)
        );
        assert_eq!(
            SearchQuery::parse("shoesize = 9"),
            Err(QueryParseError::UnknownField("shoesize".to_string()))
        );
        assert_eq!(
            SearchQuery::parse("mail ="),
            Err(QueryParseError::MissingValue("mail".to_string()))
        );
        assert_eq!(
            SearchQuery::parse("= alice"),
            Err(QueryParseError::DanglingOperator)
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: parsing arbitrary input returns Ok or a typed error,
            /// never panics.
            #[test]
            fn parse_never_panics(raw in ".*") {
                let _ = SearchQuery::parse(&raw);
            }
        }
    }
}
