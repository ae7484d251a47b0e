use figment::providers::{Format, Toml};

use mzvector::{Scaling, Spectrum, SpectrumError, SpectrumMatch};
use mzvectorizer::{BatchProcessor, ConfigError, ProcessOverrides, ProcessingConfig};

const CONFIG: &str = r#"
resolution = 2
min_mz = 100.0
max_mz = 1500.0
bin_size = 1.0
remove_precursor = true
remove_precursor_tolerance = 0.5
min_peaks = 4
max_peaks_used = 6
min_intensity = 0.0
min_mz_range = 200.0
scaling = "sqrt"
"#;

fn load() -> Result<ProcessingConfig, ConfigError> {
    let figment = ProcessingConfig::figment().merge(Toml::string(CONFIG));
    ProcessingConfig::from_figment(&figment)
}

fn make_spectra() -> Vec<Spectrum> {
    let mut good = Spectrum::new("scan=1", 700.0, Some(2)).with_retention_time(12.5);
    good.set_peaks(
        &[175.119f64, 262.151, 349.9, 404.2, 699.8, 720.44, 850.1, 1021.6],
        &[20.0f64, 35.0, 10.0, 8.0, 500.0, 12.0, 40.0, 6.0],
        None,
    )
    .unwrap();

    let mut sparse = Spectrum::new("scan=2", 650.0, Some(2));
    sparse
        .set_peaks(&[200.0f32, 400.0, 600.0], &[1.0f32, 2.0, 3.0], None)
        .unwrap();

    let mut narrow = Spectrum::new("scan=3", 900.0, None);
    narrow
        .set_peaks(
            &[300.0f32, 310.0, 320.0, 330.0, 340.0],
            &[5.0f32, 4.0, 3.0, 2.0, 1.0],
            None,
        )
        .unwrap();

    vec![good, sparse, narrow]
}

#[test]
fn test_load_toml() -> Result<(), ConfigError> {
    let config = load()?;
    assert_eq!(config.resolution, Some(2));
    assert_eq!(config.min_peaks, 4);
    assert_eq!(config.scaling, Scaling::Sqrt);
    // Values missing from the file keep their defaults
    assert_eq!(
        config.min_dynamic_range,
        ProcessingConfig::default().min_dynamic_range
    );
    assert_eq!(config.bin_grid()?.dimension(), 1401);
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let figment = ProcessingConfig::figment().merge(Toml::string("bin_size = 0.0"));
    assert!(matches!(
        ProcessingConfig::from_figment(&figment),
        Err(ConfigError::Invalid(SpectrumError::InvalidBinSize(_)))
    ));

    let figment = ProcessingConfig::figment().merge(Toml::string("scaling = \"log\""));
    assert!(matches!(
        ProcessingConfig::from_figment(&figment),
        Err(ConfigError::Extraction(_))
    ));
}

#[test]
fn test_load_without_file() -> Result<(), ConfigError> {
    let config = ProcessingConfig::load(None)?;
    assert!(config.validate().is_ok());
    Ok(())
}

#[test_log::test]
#[test_log(default_log_filter = "debug")]
fn test_batch() -> Result<(), ConfigError> {
    let config = load()?;
    let processor = BatchProcessor::from_config(&config)?;
    let mut spectra = make_spectra();

    let (progress, vectors) = processor.process_and_vectorize(&mut spectra)?;
    assert_eq!(progress.spectra, 3);
    assert_eq!(progress.processed, 1);
    assert_eq!(progress.too_few_peaks, 1);
    assert_eq!(progress.insufficient_mz_range, 1);

    // Peaks at the singly and doubly charged precursor m/z are removed
    let good = &spectra[0];
    assert!(good.is_processed());
    assert_eq!(good.peaks().len(), 6);
    assert_eq!(progress.peaks_retained, 6);
    assert!(!good
        .peaks()
        .masses()
        .iter()
        .any(|m| (*m - 699.8).abs() < 0.01 || (*m - 349.9).abs() < 0.01));

    assert_eq!(vectors.len(), 3);
    let vector = vectors[0].as_ref().expect("processed spectra have a vector");
    assert_eq!(vector.len(), processor.grid().dimension());
    let norm: f64 = vector
        .iter()
        .map(|v| (*v as f64) * (*v as f64))
        .sum::<f64>()
        .sqrt();
    assert!((norm - 1.0).abs() < 1e-6);
    assert!(vectors[1].is_none());
    assert!(vectors[2].is_none());

    let psm = SpectrumMatch::new(&spectra[0], None, 0.0);
    assert_eq!(psm.retention_time, Some(12.5));
    Ok(())
}

#[test_log::test]
fn test_batch_with_overrides() -> Result<(), ConfigError> {
    let config = load()?;
    let overrides = ProcessOverrides {
        min_peaks: Some(2),
        min_mz_range: Some(0.0),
        ..Default::default()
    };
    let processor = BatchProcessor::from_config_with(&config, &overrides)?;
    let mut spectra = make_spectra();
    let progress = processor.process_all(&mut spectra)?;
    assert_eq!(progress.processed, 3);
    assert_eq!(progress.rejected(), 0);
    Ok(())
}

#[test]
fn test_config_serializes() -> Result<(), ConfigError> {
    let config = load()?;
    let text = serde_json::to_string(&config).unwrap();
    assert!(text.contains("\"scaling\":\"sqrt\""));
    let back: ProcessingConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
    Ok(())
}
