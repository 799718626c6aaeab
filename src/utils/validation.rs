use validator::ValidationErrors;

/// Flattens `validator` output into human readable messages, walking `fields`
/// in the given order so responses are stable between requests.
pub fn into_messages(errors: &ValidationErrors, fields: &[&'static str]) -> Vec<String> {
    let field_errors = errors.field_errors();

    fields
        .iter()
        .filter_map(|field| field_errors.get(*field).map(|errors| (field, errors)))
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect()
}
