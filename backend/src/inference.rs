use attrition_inferences::{artifacts, ArtifactError, ArtifactPaths, InferenceService};
use log::{error, info};

/// Load both artifacts and build the shared inference service.
pub fn load_service(paths: &ArtifactPaths) -> Result<InferenceService, ArtifactError> {
    match artifacts::load(paths) {
        Ok(loaded) => {
            info!("Model artifacts loaded");
            Ok(InferenceService::from(loaded))
        }
        Err(e) => {
            error!("Error loading model files: {}", e);
            Err(e)
        }
    }
}
