use super::Catalog;
use anyhow::{bail, Result};
use tracing::info;

pub fn load_catalog<P: AsRef<std::path::Path>>(path: P) -> Result<Catalog> {
    let build_result = Catalog::build(path.as_ref())?;
    let problems = build_result.problems;
    let catalog = build_result.catalog;

    if !problems.is_empty() {
        info!("Found {} problems:", problems.len());
        for problem in problems.iter() {
            info!("- {:?}", problem);
        }
    }

    match (&catalog, problems.is_empty()) {
        (Some(_), true) => info!("Catalog checked, no issues found."),
        (Some(_), false) => info!(
            "Catalog was built, but check the {} non-fatal issues above.",
            problems.len()
        ),
        (None, _) => info!(
            "Check the {} problems above, the catalog could not be initialized.",
            problems.len()
        ),
    }
    if let Some(catalog) = catalog {
        info!(
            "Catalog has:\n{} artists\n{} albums\n{} genres\n{} recordings",
            catalog.get_artists_count(),
            catalog.get_albums_count(),
            catalog.get_genres_count(),
            catalog.get_recordings_count()
        );
        return Ok(catalog);
    }

    bail!("Could not load catalog");
}
