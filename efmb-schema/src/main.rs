use efmb_schema::{generate_config_json_schema, validate};
use esp_flash_map_builder_config::SerdeConfig;
use std::path::Path;

fn test_schema(schema_json: serde_json::Value) {
    // The shipped flash layout table has to validate against the schema
    // we just generated.
    let configuration_filename = Path::new("etc").join("esp8266.flash.json5");
    let configuration_str =
        std::fs::read_to_string(configuration_filename).expect("configuration");
    let configuration_json: serde_json::Value =
        json5::from_str(&configuration_str)
            .expect("configuration be valid JSON");
    if let Err(errors) = validate(schema_json, &configuration_json) {
        for error in errors {
            eprintln!("validation error: {error}");
        }
        panic!("validation error");
    }
    let configuration: SerdeConfig = json5::from_str(&configuration_str)
        .expect("configuration be a valid SerdeConfig");
    configuration.validate().expect("configuration be consistent");
}

fn main() {
    let schema = generate_config_json_schema();
    let schema_json = serde_json::to_value(&schema).expect("schema serializes");
    let schema_string =
        serde_json::to_string_pretty(&schema).expect("schema serializes");
    test_schema(schema_json);
    println!("{}", schema_string);
}
