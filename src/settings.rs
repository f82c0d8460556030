use std::fs;
use std::path::{Path, PathBuf};

use crate::catalogue::Catalogue;
use crate::errors::CatalogueError;

/// Optional TOML settings for the command-line tool.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Catalogue to load instead of the bundled one.
    pub catalogue: Option<PathBuf>,
    pub year: Option<u32>,
    pub race_round: Option<u32>,
}

impl Settings {
    pub fn from_toml_str(source: &str, origin: &str) -> Result<Self, CatalogueError> {
        toml::from_str(source).map_err(|cause| CatalogueError::Settings {
            origin: origin.to_string(),
            cause,
        })
    }

    /// Reads a settings file. A relative `catalogue` path is taken relative
    /// to the directory holding the settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        info!("Reading settings from {}", path.display());
        let source = fs::read_to_string(path).map_err(|cause| CatalogueError::Io {
            path: path.display().to_string(),
            cause,
        })?;
        let mut settings = Self::from_toml_str(&source, &path.display().to_string())?;
        if let (Some(catalogue), Some(dir)) = (settings.catalogue.as_ref(), path.parent()) {
            if catalogue.is_relative() {
                settings.catalogue = Some(dir.join(catalogue));
            }
        }
        Ok(settings)
    }

    /// Loads the catalogue to work from and applies the default overrides.
    ///
    /// `path` (the command line's `--catalogue`) wins over the settings
    /// file's `catalogue`; with neither, the bundled catalogue is used.
    pub fn load_catalogue(&self, path: Option<&Path>) -> Result<Catalogue, CatalogueError> {
        let mut catalogue = match path.or_else(|| self.catalogue.as_ref().map(PathBuf::as_path)) {
            Some(path) => Catalogue::load(path)?,
            None => {
                debug!("Using the bundled catalogue");
                Catalogue::builtin()?
            }
        };
        self.apply(&mut catalogue);
        Ok(catalogue)
    }

    /// Overrides the catalogue's default year and round.
    pub fn apply(&self, catalogue: &mut Catalogue) {
        if let Some(year) = self.year {
            debug!("Default year {} -> {}", catalogue.defaults.year, year);
            catalogue.defaults.year = year;
        }
        if let Some(round) = self.race_round {
            debug!(
                "Default race round {} -> {}",
                catalogue.defaults.race_round, round
            );
            catalogue.defaults.race_round = round;
        }
    }
}
