//! Publish workflow steps, in execution order.

mod confirm_upload;
mod create_architecture;
mod create_box;
mod create_provider;
mod create_version;
mod prepare_upload;
mod release_version;
mod upload;

pub use confirm_upload::ConfirmUpload;
pub use create_architecture::{
    architecture_record, architecture_update, CreateArchitecture, CHECKSUM_NONE,
};
pub use create_box::{CreateBox, BOX_CREATE_TIMEOUT};
pub use create_provider::CreateProvider;
pub use create_version::CreateVersion;
pub use prepare_upload::{PrepareUpload, DIRECT_UPLOAD_LIMIT};
pub use release_version::{should_release, ReleaseVersion};
pub use upload::Upload;

use super::step::Step;

/// Build the step sequence. The upload trio is left out when the box is
/// hosted elsewhere.
pub fn workflow(with_upload: bool) -> Vec<Box<dyn Step>> {
    let mut steps: Vec<Box<dyn Step>> = vec![
        Box::new(CreateBox),
        Box::new(CreateVersion),
        Box::new(CreateProvider),
        Box::new(CreateArchitecture),
    ];

    if with_upload {
        steps.push(Box::new(PrepareUpload));
        steps.push(Box::new(Upload));
        steps.push(Box::new(ConfirmUpload));
    }

    steps.push(Box::new(ReleaseVersion));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(steps: &[Box<dyn Step>]) -> Vec<&'static str> {
        steps.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_full_workflow_order() {
        assert_eq!(
            names(&workflow(true)),
            vec![
                "create-box",
                "create-version",
                "create-provider",
                "create-architecture",
                "prepare-upload",
                "upload",
                "confirm-upload",
                "release-version",
            ]
        );
    }

    #[test]
    fn test_hosted_workflow_skips_upload() {
        assert_eq!(
            names(&workflow(false)),
            vec![
                "create-box",
                "create-version",
                "create-provider",
                "create-architecture",
                "release-version",
            ]
        );
    }
}
