use esp_flash_map_builder_config::SerdeConfig;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use valico::json_schema;

pub fn generate_config_json_schema() -> RootSchema {
    let settings = SchemaSettings::default().with(|s| {
        // Work around schemars issue #62.
        // Downside: This makes the schema bigger by an order
        // of magnitude.
        s.inline_subschemas = true
    });
    let generator = settings.into_generator();
    generator.into_root_schema_for::<SerdeConfig>()
}

/// Validates CONFIGURATION_JSON against SCHEMA_JSON. On failure, returns
/// one line per validation error.
pub fn validate(
    schema_json: serde_json::Value,
    configuration_json: &serde_json::Value,
) -> Result<(), Vec<String>> {
    let mut scope = json_schema::Scope::new();
    let schema_validator = scope
        .compile_and_return(schema_json, false)
        .map_err(|e| vec![format!("invalid schema: {e:?}")])?;
    let state = schema_validator.validate(configuration_json);
    if state.is_valid() {
        return Ok(());
    }
    Err(state
        .errors
        .iter()
        .map(|error| {
            format!(
                "{}, {}, {:#?}",
                error,
                error.get_title(),
                error.get_detail()
            )
        })
        .collect())
}
