use crate::core::{ModelError, Result};

/// Validate a column or table identifier before it is spliced into SQL.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ModelError::InvalidIdentifier(
            "Identifier cannot be empty".to_string(),
        ));
    }

    // Must start with letter or underscore
    let first = name.chars().next().unwrap();
    if !first.is_alphabetic() && first != '_' {
        return Err(ModelError::InvalidIdentifier(format!(
            "Identifier '{}' must start with a letter or underscore",
            name
        )));
    }

    // Can only contain alphanumeric and underscores
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ModelError::InvalidIdentifier(format!(
            "Identifier '{}' can only contain letters, numbers, and underscores",
            name
        )));
    }

    if name.len() > 64 {
        return Err(ModelError::InvalidIdentifier(format!(
            "Identifier '{}' too long (max 64 characters)",
            name
        )));
    }

    // Reject SQL keywords
    let sql_keywords = [
        "SELECT", "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER",
        "TABLE", "FROM", "WHERE", "JOIN", "UNION", "ORDER", "GROUP",
    ];

    if sql_keywords.iter().any(|&kw| name.eq_ignore_ascii_case(kw)) {
        return Err(ModelError::InvalidIdentifier(format!(
            "Identifier cannot be a SQL keyword: {}",
            name
        )));
    }

    Ok(())
}

pub fn quote_ident(ident: &str) -> String {
    let escaped = ident.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}
