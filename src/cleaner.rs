use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::data::dates::normalize_last_review;
use crate::data::filter::{retain_price_range, PriceRange};
use crate::data::loader::load_csv;
use crate::data::writer::write_csv;
use crate::error::{CleanError, InputSource, Result};
use crate::registry::{validate_name, ArtifactRegistry, ArtifactSpec, ArtifactVersion};

/// Job type recorded on every published artifact.
pub const JOB_TYPE: &str = "basic_cleaning";

/// Parameters of one cleaning run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRequest {
    pub input_artifact: String,
    pub output_artifact: String,
    pub output_type: String,
    pub output_description: String,
    pub price_range: PriceRange,
}

impl CleanRequest {
    fn validate(&self) -> Result<()> {
        if self.input_artifact.trim().is_empty() {
            return Err(CleanError::InvalidRequest(
                "input artifact must not be empty".to_string(),
            ));
        }
        if self.output_artifact.trim().is_empty() {
            return Err(CleanError::InvalidRequest(
                "output artifact must not be empty".to_string(),
            ));
        }
        // Also the temp file name, so it must stay inside the work dir.
        validate_name(&self.output_artifact)
            .map_err(|e| CleanError::InvalidRequest(e.to_string()))
    }

    fn output_spec(&self) -> ArtifactSpec {
        ArtifactSpec::new(
            &self.output_artifact,
            &self.output_type,
            &self.output_description,
        )
        .with_metadata("job_type", JOB_TYPE)
        .with_metadata("input_artifact", self.input_artifact.as_str())
        .with_metadata("min_price", self.price_range.min)
        .with_metadata("max_price", self.price_range.max)
    }
}

/// Row counts and the stored version, for logging by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub missing_dates: usize,
    pub published: ArtifactVersion,
}

/// Fetch → filter → normalise dates → write → publish → remove temp file.
pub struct Cleaner<R> {
    registry: R,
    work_dir: PathBuf,
}

impl<R: ArtifactRegistry> Cleaner<R> {
    /// Temp files go to the current directory.
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            work_dir: PathBuf::from("."),
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn clean(&self, request: &CleanRequest) -> Result<CleanReport> {
        request.validate()?;

        info!("Downloading artifact");
        let input_path = self
            .registry
            .resolve(&request.input_artifact)
            .map_err(|e| CleanError::InputResolution {
                reference: request.input_artifact.clone(),
                source: InputSource::Registry(e),
            })?;

        let dataset = load_csv(&input_path).map_err(|e| {
            if e.is_read_failure() {
                CleanError::InputResolution {
                    reference: request.input_artifact.clone(),
                    source: InputSource::Read(e),
                }
            } else {
                CleanError::Transform(e)
            }
        })?;
        let input_rows = dataset.len();

        info!("Dropping outliers");
        let mut dataset = retain_price_range(dataset, request.price_range);
        info!(
            "Kept {} of {input_rows} rows with {} <= price <= {}",
            dataset.len(),
            request.price_range.min,
            request.price_range.max
        );

        info!("Converting last_review to datetime");
        let missing_dates = normalize_last_review(&mut dataset);
        if missing_dates > 0 {
            warn!("{missing_dates} rows have no usable last_review date");
        }

        // Overwrites any existing file of the same name in the work dir.
        let local_path = self.work_dir.join(&request.output_artifact);
        write_csv(&dataset, &local_path).map_err(|source| CleanError::Io {
            path: local_path.display().to_string(),
            source,
        })?;

        info!("Logging artifact");
        let published = self
            .registry
            .publish(&local_path, &request.output_spec())
            .map_err(|source| CleanError::Publish {
                name: request.output_artifact.clone(),
                source,
            })?;
        info!("Published {published}");

        if let Err(e) = fs::remove_file(&local_path) {
            warn!("could not remove {}: {e}", local_path.display());
        }

        Ok(CleanReport {
            input_rows,
            output_rows: dataset.len(),
            missing_dates,
            published,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    use crate::registry::RegistryError;

    /// In-memory registry that serves one file and records publishes.
    struct FakeRegistry {
        input: PathBuf,
        fail_publish: bool,
        consume_file: bool,
        published: RefCell<Vec<(String, ArtifactSpec)>>,
    }

    impl FakeRegistry {
        fn serving(input: PathBuf) -> Self {
            Self {
                input,
                fail_publish: false,
                consume_file: false,
                published: RefCell::new(Vec::new()),
            }
        }
    }

    impl ArtifactRegistry for FakeRegistry {
        fn resolve(&self, reference: &str) -> std::result::Result<PathBuf, RegistryError> {
            if reference == "sample.csv:latest" {
                Ok(self.input.clone())
            } else {
                Err(RegistryError::NotFound(reference.to_string()))
            }
        }

        fn publish(
            &self,
            local_path: &Path,
            spec: &ArtifactSpec,
        ) -> std::result::Result<ArtifactVersion, RegistryError> {
            if self.fail_publish {
                return Err(RegistryError::InvalidName(spec.name.clone()));
            }
            let content = fs::read_to_string(local_path)?;
            if self.consume_file {
                fs::remove_file(local_path)?;
            }
            self.published
                .borrow_mut()
                .push((content, spec.clone()));
            Ok(ArtifactVersion {
                name: spec.name.clone(),
                version: 0,
                digest: String::new(),
            })
        }
    }

    fn request(min: f64, max: f64) -> CleanRequest {
        CleanRequest {
            input_artifact: "sample.csv:latest".into(),
            output_artifact: "clean_sample.csv".into(),
            output_type: "clean_sample".into(),
            output_description: "Data with outliers and null values removed".into(),
            price_range: PriceRange::new(min, max),
        }
    }

    fn setup(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        fs::write(&input, content).unwrap();
        (dir, input)
    }

    #[test]
    fn scenario_from_three_rows() {
        let (dir, input) = setup(
            "price,last_review\n50,2019-01-01\n500,\n10000,2019-05-05\n",
        );
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());
        let report = cleaner.clean(&request(10.0, 1000.0)).unwrap();

        assert_eq!((report.input_rows, report.output_rows, report.missing_dates), (3, 2, 1));
        let published = cleaner.registry().published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "price,last_review\n50,2019-01-01\n500,\n");
        assert_eq!(published[0].1.artifact_type, "clean_sample");
        assert_eq!(published[0].1.metadata["job_type"], JOB_TYPE);
        assert!(!dir.path().join("clean_sample.csv").exists());
    }

    #[test]
    fn empty_references_fail_before_io() {
        let (dir, input) = setup("price,last_review\n");
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());
        let mut req = request(0.0, 1.0);
        req.output_artifact = "  ".into();
        assert!(matches!(cleaner.clean(&req), Err(CleanError::InvalidRequest(_))));
        assert!(cleaner.registry().published.borrow().is_empty());
    }

    #[test]
    fn unresolvable_input_is_input_error() {
        let (dir, input) = setup("price,last_review\n");
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());
        let mut req = request(0.0, 1.0);
        req.input_artifact = "other.csv".into();
        let err = cleaner.clean(&req).unwrap_err();
        assert!(matches!(err, CleanError::InputResolution { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn missing_price_column_is_transform_error() {
        let (dir, input) = setup("cost,last_review\n1,\n");
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());
        assert!(matches!(
            cleaner.clean(&request(0.0, 10.0)),
            Err(CleanError::Transform(_))
        ));
        assert!(cleaner.registry().published.borrow().is_empty());
    }

    #[test]
    fn publish_failure_leaves_temp_file() {
        let (dir, input) = setup("price,last_review\n5,\n");
        let mut registry = FakeRegistry::serving(input);
        registry.fail_publish = true;
        let cleaner = Cleaner::new(registry).with_work_dir(dir.path());
        assert!(matches!(
            cleaner.clean(&request(0.0, 10.0)),
            Err(CleanError::Publish { .. })
        ));
        assert!(dir.path().join("clean_sample.csv").exists());
    }

    #[test]
    fn inverted_bounds_publish_header_only() {
        let (dir, input) = setup("price,last_review\n5,\n");
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());
        let report = cleaner.clean(&request(10.0, 0.0)).unwrap();
        assert_eq!(report.output_rows, 0);
        assert_eq!(
            cleaner.registry().published.borrow()[0].0,
            "price,last_review\n"
        );
    }

    #[test]
    fn failed_temp_file_removal_is_swallowed() {
        let (dir, input) = setup("price,last_review\n5,2019-01-01\n");
        let mut registry = FakeRegistry::serving(input);
        registry.consume_file = true;
        let cleaner = Cleaner::new(registry).with_work_dir(dir.path());

        let report = cleaner.clean(&request(0.0, 10.0)).unwrap();
        assert_eq!(report.output_rows, 1);
        assert_eq!(cleaner.registry().published.borrow().len(), 1);
    }

    #[test]
    fn unwritable_output_is_io_error() {
        let (dir, input) = setup("price,last_review\n5,\n");
        let cleaner = Cleaner::new(FakeRegistry::serving(input))
            .with_work_dir(dir.path().join("does-not-exist"));

        let err = cleaner.clean(&request(0.0, 10.0)).unwrap_err();
        assert!(matches!(err, CleanError::Io { .. }));
        assert!(err.to_string().contains("clean_sample.csv"));
        assert!(cleaner.registry().published.borrow().is_empty());
    }

    #[test]
    fn output_name_outside_work_dir_is_rejected_before_io() {
        let (dir, input) = setup("price,last_review\n5,\n");
        fs::create_dir(dir.path().join("sub")).unwrap();
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());

        for name in ["sub/out.csv", "../out.csv", ".."] {
            let mut req = request(0.0, 10.0);
            req.output_artifact = name.into();
            assert!(matches!(cleaner.clean(&req), Err(CleanError::InvalidRequest(_))));
        }
        assert!(!dir.path().join("sub").join("out.csv").exists());
        assert!(cleaner.registry().published.borrow().is_empty());
    }

    #[test]
    fn empty_input_file_is_input_error() {
        let (dir, input) = setup("");
        let cleaner = Cleaner::new(FakeRegistry::serving(input)).with_work_dir(dir.path());
        assert!(matches!(
            cleaner.clean(&request(0.0, 10.0)),
            Err(CleanError::InputResolution { .. })
        ));
    }
}
