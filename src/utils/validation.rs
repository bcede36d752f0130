use std::collections::BTreeMap;

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate<T: Validate>(val: &T) -> Result<(), ValidationErrors> {
    val.validate()
}

/// Field name to human messages, for inline display next to the form.
/// Struct-level checks land under `__all__`.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    for (field, kind) in errors.errors() {
        let ValidationErrorsKind::Field(errors) = kind else {
            continue;
        };
        let messages = errors
            .iter()
            .map(|error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string())
            })
            .collect();
        out.insert(field.to_string(), messages);
    }
    out
}
