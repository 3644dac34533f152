use std::path::Path;

use crate::{
    infra::error::InfraError,
    use_cases::student::{ImportReport, LegacyStudentRecord, StudentUseCases},
};

/// Loads a JSON array of exported student records into the store.
pub async fn seed_students(
    use_cases: &StudentUseCases,
    path: &Path,
) -> Result<ImportReport, InfraError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InfraError::SeedRead {
            path: path.to_path_buf(),
            source,
        })?;
    let records: Vec<LegacyStudentRecord> =
        serde_json::from_str(&raw).map_err(|source| InfraError::SeedParse {
            path: path.to_path_buf(),
            source,
        })?;

    use_cases
        .import(records)
        .await
        .map_err(InfraError::SeedImport)
}
