use std::path::{Path, PathBuf};

/// Output file names derived from one survey file's base name.
#[derive(Clone, Debug)]
pub struct FileNaming {
    dir: PathBuf,
    base: String,
}

impl FileNaming {
    pub fn new(dir: &Path, base: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base: base.to_string(),
        }
    }

    pub fn track_wgs84(&self) -> PathBuf {
        self.dir.join(format!("{}_wgs84.csv", self.base))
    }

    pub fn track_projected(&self) -> PathBuf {
        self.dir.join(format!("{}_projected.csv", self.base))
    }

    pub fn mosaic_png(&self) -> PathBuf {
        self.dir.join(format!("{}_map.png", self.base))
    }

    pub fn mosaic_meta(&self) -> PathBuf {
        self.dir.join(format!("{}_map.json", self.base))
    }

    pub fn control_points(&self) -> PathBuf {
        self.dir.join(format!("{}_map.gsr2", self.base))
    }
}
