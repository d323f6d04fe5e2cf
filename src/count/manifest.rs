use crate::config::ManifestConfig;
use crate::error::{CountlinesError, Result};
use crate::model::Release;
use std::path::Path;
use tracing::debug;

/// Product names listed in a manifest, in file order.
///
/// Comment lines and `BUILD` lines are skipped; only the first word of each
/// remaining line matters.
pub fn parse_manifest(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with("BUILD"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Products of a checked-out tree that should be counted.
pub fn select_products(release: &Release, tree: &Path, config: &ManifestConfig) -> Result<Vec<String>> {
    let manifest_path = tree.join(&config.file);
    let text = std::fs::read_to_string(&manifest_path).map_err(|e| {
        CountlinesError::checkout(
            &release.id,
            format!("cannot read manifest {}: {e}", manifest_path.display()),
        )
    })?;

    let products: Vec<String> = parse_manifest(&text)
        .into_iter()
        .filter(|product| {
            let skipped = config
                .skip_markers
                .iter()
                .any(|marker| tree.join(product).join(marker).exists());
            if skipped {
                debug!(release = %release.id, product = %product, "skipping third-party product");
            }
            !skipped
        })
        .collect();

    if products.is_empty() {
        return Err(CountlinesError::checkout(&release.id, "manifest selects no products"));
    }
    debug!(release = %release.id, count = products.len(), "selected products");
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const MANIFEST: &str = "\
# Manifest
BUILD=b1234
afw           g1234 1.0
boost         g5678 1.2
daf_butler    g9abc 2.0
";

    #[test]
    fn manifest_lists_first_words() {
        assert_eq!(parse_manifest(MANIFEST), vec!["afw", "boost", "daf_butler"]);
    }

    #[test]
    fn marked_products_are_skipped() {
        let tree = tempfile::tempdir().unwrap();
        fs::write(tree.path().join("manifest.txt"), MANIFEST).unwrap();
        for product in ["afw", "boost", "daf_butler"] {
            fs::create_dir(tree.path().join(product)).unwrap();
        }
        fs::create_dir_all(tree.path().join("boost/ups")).unwrap();
        fs::write(tree.path().join("boost/ups/eupspkg.cfg.sh"), "").unwrap();

        let products =
            select_products(&Release::new("w.2020.1"), tree.path(), &ManifestConfig::default())
                .unwrap();
        assert_eq!(products, vec!["afw", "daf_butler"]);
    }

    #[test]
    fn missing_or_empty_manifest_is_checkout_error() {
        let tree = tempfile::tempdir().unwrap();
        let release = Release::new("w.2020.1");
        let err = select_products(&release, tree.path(), &ManifestConfig::default()).unwrap_err();
        assert!(matches!(err, CountlinesError::Checkout { .. }));

        fs::write(tree.path().join("manifest.txt"), "# nothing\n").unwrap();
        let err = select_products(&release, tree.path(), &ManifestConfig::default()).unwrap_err();
        assert!(matches!(err, CountlinesError::Checkout { .. }));
    }
}
