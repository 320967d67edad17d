//! Query-pattern generalization.
//!
//! Literal values are replaced by placeholders so that one correction applies
//! to every query of the same shape. Steps run in a fixed order: entities
//! before numbers, dates and UUIDs before bare numbers.

use std::sync::LazyLock;

use regex::Regex;

/// Business entities, longest phrase first.
static ENTITIES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bsales orders\b", "[SALES_ENTITY]"),
        (r"\bcustomers\b", "[CUSTOMER_ENTITY]"),
        (r"\bproducts\b", "[PRODUCT_ENTITY]"),
        (r"\borders\b", "[ORDER_ENTITY]"),
        (r"\bpayments\b", "[PAYMENT_ENTITY]"),
    ]
    .into_iter()
    .map(|(pattern, placeholder)| (Regex::new(pattern).unwrap(), placeholder))
    .collect()
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*"|\B'[^']*'\B"#).unwrap());

static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b").unwrap()
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").unwrap());

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btable\s+[a-z_][a-z0-9_.]*").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn generalize_pattern(query: &str) -> String {
    let mut pattern = query.to_lowercase();
    for (regex, placeholder) in ENTITIES.iter() {
        pattern = regex.replace_all(&pattern, *placeholder).into_owned();
    }
    pattern = QUOTED.replace_all(&pattern, "[VALUE]").into_owned();
    pattern = DATE.replace_all(&pattern, "[DATE]").into_owned();
    pattern = UUID.replace_all(&pattern, "[ID]").into_owned();
    pattern = NUMBER.replace_all(&pattern, "[NUMBER]").into_owned();
    pattern = TABLE_NAME.replace_all(&pattern, "table [TABLE]").into_owned();
    WHITESPACE.replace_all(pattern.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_and_dates() {
        assert_eq!(
            generalize_pattern("Show sales orders for customers created on 2024-01-15"),
            "show [SALES_ENTITY] for [CUSTOMER_ENTITY] created on [DATE]"
        );
    }

    #[test]
    fn singular_words_are_not_entities() {
        assert_eq!(
            generalize_pattern("total of payments for order 4711?"),
            "total of [PAYMENT_ENTITY] for order [NUMBER]?"
        );
    }

    #[test]
    fn table_names_become_placeholders() {
        assert_eq!(
            generalize_pattern("Which columns are in table invoice_lines?"),
            "which columns are in table [TABLE]?"
        );
        assert_eq!(generalize_pattern("rows in TABLE t2024"), "rows in table [TABLE]");
    }

    #[test]
    fn uuids_and_quoted_values() {
        assert_eq!(
            generalize_pattern("find ticket 123e4567-e89b-12d3-a456-426614174000 for 'ACME Corp'"),
            "find ticket [ID] for [VALUE]"
        );
        // apostrophes inside words are not quotes
        assert_eq!(
            generalize_pattern("what's the customer's status"),
            "what's the customer's status"
        );
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(generalize_pattern("  list   products \n now "), "list [PRODUCT_ENTITY] now");
    }

    #[test]
    fn decimals_are_one_number() {
        assert_eq!(generalize_pattern("price above 19.99"), "price above [NUMBER]");
    }
}
