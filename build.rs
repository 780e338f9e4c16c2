use std::env;
use std::process;

use efmb_schema::generate_config_json_schema;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

fn write_config_json_schema(outdir: &OsString) {
    let schema = generate_config_json_schema();
    let schema_file = Path::new(outdir).join("efmb.schema.json");
    let schema_string = match serde_json::to_string_pretty(&schema) {
        Ok(x) => x,
        Err(e) => {
            eprintln!("Could not serialize schema: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = fs::write(&schema_file, schema_string) {
        eprintln!("Could not write {schema_file:?}: {e}");
        process::exit(1);
    }
}

fn main() {
    println!("cargo:rerun-if-changed=efmb-config/src/lib.rs");
    println!("cargo:rerun-if-changed=efmb-schema/src/lib.rs");
    // OUT_DIR is set by Cargo and it's where any additional build artifacts
    // are written.
    let out_dir = match env::var_os("OUT_DIR") {
        Some(out_dir) => out_dir,
        None => {
            eprintln!("OUT_DIR environment variable not defined.");
            process::exit(1);
        }
    };
    write_config_json_schema(&out_dir);
}
