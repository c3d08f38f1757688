// ============================================================================
// Integration tests for the attribute filter interpreter
// ============================================================================

use modelkit::prelude::*;
use modelkit::{FilterDef, FilterOperator, FilterSet, SearchRequest};

#[derive(modelkit::Model, Default)]
#[model(table = "contacts")]
struct Contact {
    id: Option<i64>,
    first_name: String,
    last_name: String,
    age: Option<i64>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Filterable for Contact {
    fn attribute_filters() -> FilterSet {
        FilterSet::new()
            .with(
                "name",
                FilterDef::string("Name", "first_name").or_attribute("last_name"),
            )
            .with("age", FilterDef::number("Age", "age"))
            .with("created", FilterDef::datetime("Created", "created_at"))
    }
}

struct Loose;

impl modelkit::Model for Loose {
    fn table() -> &'static str {
        "loose"
    }
    fn attribute_names() -> &'static [&'static str] {
        &[]
    }
    fn attribute(&self, _: &str) -> Option<modelkit::Value> {
        None
    }
    fn set_attribute(&mut self, _: &str, _: modelkit::Value) -> modelkit::Result<()> {
        Ok(())
    }
}

impl Filterable for Loose {
    fn attribute_filters() -> FilterSet {
        FilterSet::new().with("tag", FilterDef::string("Tag", "tag"))
    }

    fn default_filter_operator() -> FilterOperator {
        FilterOperator::Contains
    }
}

#[test]
fn filters_compose_across_kinds() -> modelkit::Result<()> {
    let search = SearchRequest::new()
        .with("name", "smith", Some("*=*"))
        .with("age", "21", Some(">="))
        .with("created", "2024-06-01", Some("<"));

    let query = Contact::apply_attribute_filters(Contact::query(), &search)?;

    assert_eq!(
        query.to_sql(),
        "SELECT * FROM \"contacts\" WHERE (\"first_name\" LIKE '%smith%' OR \"last_name\" LIKE '%smith%') \
         AND \"age\" >= 21 AND \"created_at\" < '2024-06-01'"
    );
    Ok(())
}

#[test]
fn negated_multi_column_filter_requires_all_misses() -> modelkit::Result<()> {
    let search = SearchRequest::new().with("name", "spam", Some("*!=*"));
    let query = Contact::apply_attribute_filters(Contact::query(), &search)?;

    assert_eq!(
        query.to_sql(),
        "SELECT * FROM \"contacts\" WHERE (\"first_name\" NOT LIKE '%spam%' AND \"last_name\" NOT LIKE '%spam%')"
    );
    Ok(())
}

#[test]
fn starts_and_ends_with_expand_correctly() -> modelkit::Result<()> {
    let starts = SearchRequest::new().with("name", "al", Some("=*"));
    let sql = Contact::apply_attribute_filters(Contact::query(), &starts)?.to_sql();
    assert!(sql.contains("\"first_name\" LIKE 'al%'"));

    let ends = SearchRequest::new().with("name", "ez", Some("*="));
    let sql = Contact::apply_attribute_filters(Contact::query(), &ends)?.to_sql();
    assert!(sql.contains("\"first_name\" LIKE '%ez'"));
    Ok(())
}

#[test]
fn invalid_operator_for_kind_is_skipped() -> modelkit::Result<()> {
    // LIKE on a number filter and ordering on a string filter both skip
    let search = SearchRequest::new()
        .with("age", "30", Some("*=*"))
        .with("name", "zz", Some(">"));

    let query = Contact::apply_attribute_filters(Contact::query(), &search)?;
    assert_eq!(query.to_sql(), "SELECT * FROM \"contacts\"");
    Ok(())
}

#[test]
fn unknown_search_keys_are_ignored() -> modelkit::Result<()> {
    let search = SearchRequest::new().with("shoe_size", "44", None);
    let query = Contact::apply_attribute_filters(Contact::query(), &search)?;
    assert_eq!(query.to_sql(), "SELECT * FROM \"contacts\"");
    Ok(())
}

#[test]
fn model_default_operator_applies() -> modelkit::Result<()> {
    let search = SearchRequest::new().with("tag", "urgent", None);
    let query = Loose::apply_attribute_filters(Loose::query(), &search)?;
    assert_eq!(
        query.to_sql(),
        "SELECT * FROM \"loose\" WHERE \"tag\" LIKE '%urgent%'"
    );
    Ok(())
}

#[test]
fn user_wildcards_are_escaped_in_patterns() -> modelkit::Result<()> {
    let search = SearchRequest::new().with("name", "100%_done", Some("*=*"));
    let query = Contact::apply_attribute_filters(Contact::query(), &search)?;
    assert!(query.to_sql().contains("LIKE '%100\\%\\_done%'"));
    Ok(())
}

#[test]
fn repeated_inputs_for_one_filter_stack_as_range() -> modelkit::Result<()> {
    let search = SearchRequest::new()
        .with("age", "18", Some(">="))
        .with("age", "65", Some("<="));

    let query = Contact::apply_attribute_filters(Contact::query(), &search)?;
    assert_eq!(
        query.to_sql(),
        "SELECT * FROM \"contacts\" WHERE \"age\" >= 18 AND \"age\" <= 65"
    );
    Ok(())
}
