use esp_flash_map_builder_config::{Error, SerdeConfig};
use std::path::Path;

fn shipped_configuration() -> SerdeConfig {
    let configuration_filename =
        Path::new("etc").join("esp8266.flash.json5");
    let configuration_str =
        std::fs::read_to_string(configuration_filename).unwrap();
    json5::from_str(&configuration_str).unwrap()
}

#[test]
fn test_shipped_configuration_validates() {
    let configuration = shipped_configuration();
    configuration.validate().unwrap();
    let combinations = configuration.combinations().unwrap();
    assert_eq!(combinations.len(), 24);
    // Configuration order is kept; it defines the order of boards.txt
    // entries and FlashMap.h macros.
    let first = &combinations[0];
    assert_eq!(
        (first.flash_size, first.fs_size, first.name),
        (512 * 1024, 0, Some("NO_FS"))
    );
    let last = combinations.last().unwrap();
    assert_eq!(
        (last.flash_size, last.fs_size, last.name),
        (16 * 1024 * 1024, 15 * 1024 * 1024, Some("MAX_FS"))
    );
}

#[test]
fn test_shipped_configuration_names() {
    let configuration = shipped_configuration();
    let combinations = configuration.combinations().unwrap();
    let ota: Vec<u32> = combinations
        .iter()
        .filter(|x| x.name == Some("OTA_FS"))
        .map(|x| x.flash_size / 1024)
        .collect();
    assert_eq!(ota, vec![1024, 2048, 4096, 8192, 16384]);
    let no_fs = combinations.iter().filter(|x| x.name == Some("NO_FS"));
    assert!(no_fs.clone().all(|x| x.fs_size == 0));
    assert_eq!(no_fs.count(), 2);
}

#[test]
fn test_shipped_boards() {
    let configuration = shipped_configuration();
    let generic = configuration
        .boards
        .iter()
        .find(|x| x.id == "generic")
        .expect("generic board");
    assert_eq!(generic.flash_sizes.len(), configuration.flash_sizes.len());
    for board in &configuration.boards {
        for size_kb in &board.flash_sizes {
            assert!(configuration.flash_size(*size_kb).is_some());
        }
    }
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<SerdeConfig, _> = json5::from_str(
        r#"{ flash_sizes: [], boards: [], sketch_size: 1 }"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_board_with_unknown_flash_size() {
    let configuration: SerdeConfig = json5::from_str(
        r#"{
            flash_sizes: [ { size_kb: 1024, filesystems: [ { size_kb: 0 } ] } ],
            boards: [ { id: "x", name: "X", flash_sizes: [ 4096 ] } ],
        }"#,
    )
    .unwrap();
    match configuration.validate() {
        Err(Error::Config(message)) => assert!(message.contains("4096")),
        x => panic!("unexpected result {:?}", x),
    }
}
