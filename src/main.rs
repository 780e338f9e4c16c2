use bytesize::ByteSize;
use esp_flash_map_builder_config::{Error, Result, SerdeConfig};
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use structopt::StructOpt;

mod artifacts;
mod board_menu;
mod flash_map;
mod flash_map_header;
mod humanize;
mod layout;
mod ld_script;
mod region;
mod static_config;

use artifacts::ArtifactDirectory;
use board_menu::BoardsTxt;
use flash_map::{flash_map, FlashMap};
use flash_map_header::FlashMapHeader;
use humanize::{menu_token, parse_size};
use ld_script::{linker_script_filename, LinkerScript};

#[derive(Debug, StructOpt)]
struct GenerateOpts {
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    config_filename: PathBuf,

    #[structopt(short = "o", long = "output-directory", parse(from_os_str))]
    output_directory: PathBuf,

    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

#[derive(Debug, StructOpt)]
struct ShowOpts {
    /// Flash chip size, for example 4M or 512K
    #[structopt(short = "f", long = "flash-size", parse(try_from_str = parse_size))]
    flash_size: u32,

    /// Filesystem size, for example 2M or 64K; 0 for none
    #[structopt(short = "s", long = "fs-size", default_value = "0", parse(try_from_str = parse_size))]
    fs_size: u32,

    /// Print the plan as JSON
    #[structopt(long = "json")]
    json: bool,

    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "esp-flash-map-builder",
    about = "Generate ESP8266 flash layouts: linker scripts, FlashMap.h and board menus."
)]
enum Opts {
    /// Plans every configured combination and writes all artifacts
    Generate(GenerateOpts),
    /// Plans a single combination and prints its layout
    Show(ShowOpts),
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn read_config_from_file<P: AsRef<Path> + std::fmt::Debug>(
    path: P,
) -> Result<SerdeConfig> {
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let config: SerdeConfig = json5::from_str(&text)
        .map_err(|e| Error::Config(format!("{path:?}: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Plans every combination of CONFIG. A combination that fails is
/// reported and left out; the others are unaffected.
fn plan_all(config: &SerdeConfig) -> Result<(Vec<FlashMap>, usize)> {
    let mut maps = Vec::new();
    let mut failures = 0;
    for combination in config.combinations()? {
        let token = menu_token(combination.flash_size, combination.fs_size);
        match flash_map(
            combination.flash_size,
            combination.fs_size,
            combination.name,
        ) {
            Ok(map) => {
                debug!(
                    "{token}: sketch {}, filesystem {} of {} requested, OTA {}",
                    ByteSize::b(map.sketch.size().into()),
                    ByteSize::b(map.fs.region.size().into()),
                    ByteSize::b(map.expected_fs_size.into()),
                    ByteSize::b(map.max_ota_size.into()),
                );
                maps.push(map);
            }
            Err(e) => {
                error!("{token}: {e}");
                failures += 1;
            }
        }
    }
    Ok((maps, failures))
}

fn generate(opts: &GenerateOpts) -> Result<usize> {
    let config = read_config_from_file(&opts.config_filename)?;
    let (maps, failures) = plan_all(&config)?;
    let output = ArtifactDirectory::create(&opts.output_directory)?;
    for map in &maps {
        let path = output.ld_path(&linker_script_filename(map));
        output.write(&path, &LinkerScript(map).to_string())?;
    }
    output.write(Path::new("FlashMap.h"), &FlashMapHeader(&maps).to_string())?;
    let boards = BoardsTxt { boards: &config.boards, maps: &maps };
    output.write(Path::new("boards.txt"), &boards.to_string())?;
    info!(
        "{} flash layouts written to {:?}",
        maps.len(),
        opts.output_directory
    );
    Ok(failures)
}

fn show(opts: &ShowOpts) -> Result<()> {
    let map = flash_map(opts.flash_size, opts.fs_size, None)?;
    if opts.json {
        let text = serde_json::to_string_pretty(&map)
            .map_err(|e| Error::Config(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }
    println!("{}", menu_token(map.flash_size, map.expected_fs_size));
    for region in map.layout.subregions() {
        println!("    {:<40} {:>10}", region.to_string(), region.size());
    }
    if map.fs.region.size() != map.expected_fs_size {
        warn!(
            "filesystem is {} instead of the requested {}",
            ByteSize::b(map.fs.region.size().into()),
            ByteSize::b(map.expected_fs_size.into())
        );
    }
    println!("max upload size: {}", map.max_upload_size);
    println!("max OTA size:    {}", map.max_ota_size);
    Ok(())
}

fn main() -> std::io::Result<()> {
    let opts = Opts::from_args();
    match opts {
        Opts::Generate(opts) => {
            init_logging(opts.verbose);
            match generate(&opts) {
                Ok(0) => Ok(()),
                Ok(failures) => {
                    error!("{failures} flash layouts failed");
                    std::process::exit(1);
                }
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Opts::Show(opts) => {
            init_logging(opts.verbose);
            if let Err(e) = show(&opts) {
                error!("{e}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_combination_is_left_out() {
        // 16 KiB can't absorb the 20 KiB SDK tail on a 4 MiB chip.
        let config: SerdeConfig = json5::from_str(
            r#"{
                flash_sizes: [
                    {
                        size_kb: 4096,
                        filesystems: [
                            { size_kb: 16, name: "BROKEN" },
                            { size_kb: 2048, name: "OTA_FS" },
                        ],
                    },
                ],
                boards: [ { id: "generic", name: "Generic", flash_sizes: [ 4096 ] } ],
            }"#,
        )
        .unwrap();
        config.validate().unwrap();
        let (maps, failures) = plan_all(&config).unwrap();
        assert_eq!(failures, 1);
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].expected_fs_size, 2 * 1024 * 1024);

        let header = FlashMapHeader(&maps).to_string();
        assert!(header.contains("#define FLASH_MAP_OTA_FS \\\n"));
        assert!(!header.contains("FLASH_MAP_BROKEN"));
        let boards = BoardsTxt { boards: &config.boards, maps: &maps };
        let boards = boards.to_string();
        assert!(boards.contains("generic.menu.eesz.4M2M="));
        assert!(!boards.contains("eesz.4M16"));
        let filenames: Vec<String> =
            maps.iter().map(linker_script_filename).collect();
        assert_eq!(filenames, vec!["eagle.flash.4m2m.ld".to_string()]);
    }
}
