use log::{debug, error};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Output directory for the generated files.
/// Linker scripts go into `ld/`, everything else into the top level.
pub struct ArtifactDirectory {
    root: PathBuf,
}

impl ArtifactDirectory {
    pub const LD_DIRECTORY: &'static str = "ld";

    pub fn create(root: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(root.join(Self::LD_DIRECTORY)).map_err(|e| {
            error!("Error creating output directory {root:?}: {e:?}");
            e
        })?;
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn ld_path(&self, filename: &str) -> PathBuf {
        Path::new(Self::LD_DIRECTORY).join(filename)
    }

    /// Writes CONTENTS to RELATIVE_PATH (inside the output directory).
    /// The file is written under a temporary name first and then renamed,
    /// so an existing file is either fully replaced or left alone.
    pub fn write(
        &self,
        relative_path: &Path,
        contents: &str,
    ) -> std::io::Result<PathBuf> {
        let filename = self.root.join(relative_path);
        let mut temporary_filename = filename.clone().into_os_string();
        temporary_filename.push(".tmp");
        let temporary_filename = PathBuf::from(temporary_filename);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temporary_filename)
            .map_err(|e| {
                error!("Error creating {temporary_filename:?}: {e:?}");
                e
            })?;
        file.write_all(contents.as_bytes()).map_err(|e| {
            error!("Error writing to {temporary_filename:?}: {e:?}");
            e
        })?;
        file.sync_all()?;
        fs::rename(&temporary_filename, &filename).map_err(|e| {
            error!("Error renaming {temporary_filename:?} to {filename:?}: {e:?}");
            e
        })?;
        debug!("wrote {filename:?} ({} B)", contents.len());
        Ok(filename)
    }
}
