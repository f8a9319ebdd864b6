//! Translation of a [`UserFilter`] into a MongoDB query document.
//!
//! Each string field is governed by one rule: skipped when empty, otherwise
//! matched exactly or as a case-insensitive prefix. Status is always
//! constrained, defaulting to Active.

use mongodb::bson::{Bson, Document, doc};

use crate::models::{UserFilter, UserStatus, fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Matching {
    Exact,
    /// Case-insensitive "starts with"; the value is matched literally
    Prefix,
}

impl Matching {
    fn predicate(self, value: &str) -> Bson {
        match self {
            Matching::Exact => Bson::String(value.to_owned()),
            Matching::Prefix => Bson::Document(doc! {
                "$regex": format!("^{}", regex::escape(value)),
                "$options": "i",
            }),
        }
    }
}

struct Rule {
    field: &'static str,
    value: fn(&UserFilter) -> &str,
    matching: Matching,
}

fn rules() -> [Rule; 6] {
    [
        Rule {
            field: fields::ID,
            value: |f| f.id.as_str(),
            matching: Matching::Exact,
        },
        Rule {
            field: fields::FIRST_NAME,
            value: |f| f.first_name.as_str(),
            matching: Matching::Prefix,
        },
        Rule {
            field: fields::LAST_NAME,
            value: |f| f.last_name.as_str(),
            matching: Matching::Prefix,
        },
        Rule {
            field: fields::NICK_NAME,
            value: |f| f.nick_name.as_str(),
            matching: Matching::Exact,
        },
        Rule {
            field: fields::EMAIL,
            value: |f| f.email.as_str(),
            matching: Matching::Exact,
        },
        Rule {
            field: fields::COUNTRY,
            value: |f| f.country.as_str(),
            matching: Matching::Exact,
        },
    ]
}

/// Build the query for `filter`. All emitted predicates are ANDed.
pub fn to_query(filter: &UserFilter) -> Document {
    let mut query = Document::new();

    for rule in rules() {
        let value = (rule.value)(filter);
        if !value.is_empty() {
            query.insert(rule.field, rule.matching.predicate(value));
        }
    }

    let status = if filter.status > 0 {
        filter.status
    } else {
        UserStatus::Active.code()
    };
    query.insert(fields::STATUS, status);

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_only_constrains_status_to_active() {
        let query = to_query(&UserFilter::default());
        assert_eq!(query, doc! { "status": 1 });
    }

    #[test]
    fn test_explicit_status_is_used() {
        let filter = UserFilter {
            status: 2,
            ..Default::default()
        };
        assert_eq!(to_query(&filter), doc! { "status": 2 });
    }

    #[test]
    fn test_exact_fields() {
        let filter = UserFilter {
            id: "u1".into(),
            nick_name: "ada".into(),
            email: "ada@example.com".into(),
            country: "UK".into(),
            ..Default::default()
        };

        let query = to_query(&filter);
        assert_eq!(query.get_str("_id").unwrap(), "u1");
        assert_eq!(query.get_str("nickName").unwrap(), "ada");
        assert_eq!(query.get_str("email").unwrap(), "ada@example.com");
        assert_eq!(query.get_str("country").unwrap(), "UK");
        assert_eq!(query.len(), 5);
    }

    #[test]
    fn test_name_fields_are_case_insensitive_prefixes() {
        let filter = UserFilter {
            first_name: "Jo".into(),
            last_name: "Sm".into(),
            ..Default::default()
        };

        let query = to_query(&filter);
        assert_eq!(
            query.get_document("firstName").unwrap(),
            &doc! { "$regex": "^Jo", "$options": "i" }
        );
        assert_eq!(
            query.get_document("lastName").unwrap(),
            &doc! { "$regex": "^Sm", "$options": "i" }
        );
    }

    #[test]
    fn test_prefix_is_matched_literally() {
        let filter = UserFilter {
            first_name: "a.b*(".into(),
            ..Default::default()
        };

        let query = to_query(&filter);
        let regex = query
            .get_document("firstName")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(regex, r"^a\.b\*\(");
    }

    #[test]
    fn test_empty_fields_emit_nothing() {
        let filter = UserFilter {
            country: "CA".into(),
            ..Default::default()
        };

        let query = to_query(&filter);
        assert!(!query.contains_key("firstName"));
        assert!(!query.contains_key("_id"));
        assert!(query.contains_key("country"));
    }
}
