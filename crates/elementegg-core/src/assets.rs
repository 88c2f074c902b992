//! Reference data loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use elementegg_logic::catalog::{Catalog, CatalogError};

/// Startup failure: the game cannot run without its catalogs.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn read(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the element and compound catalogs from disk.
pub fn load_catalog<R: Rng + ?Sized>(
    elements_path: &Path,
    compounds_path: &Path,
    rng: &mut R,
) -> Result<Catalog, AssetError> {
    let elements = read(elements_path)?;
    let compounds = read(compounds_path)?;
    Ok(Catalog::from_json(&elements, &compounds, rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = load_catalog(
            &dir.path().join("elements.json"),
            &dir.path().join("compounds.json"),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let elements = dir.path().join("elements.json");
        let compounds = dir.path().join("compounds.json");
        fs::write(&elements, r#"[{"symbol": "H", "name": "Hydrogen", "atomic_weight": 1.0}]"#)
            .unwrap();
        fs::write(&compounds, "[").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = load_catalog(&elements, &compounds, &mut rng).unwrap_err();
        assert!(matches!(err, AssetError::Catalog(CatalogError::Json { .. })));
    }

    #[test]
    fn test_loads_shipped_data() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = load_catalog(
            &data.join("elements.json"),
            &data.join("compounds.json"),
            &mut rng,
        )
        .unwrap();
        assert!(catalog.contains("O"));
        assert!(catalog.compound("Water").is_some());
    }
}
