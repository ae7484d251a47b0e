use mzvector::{BinGrid, PeakProcessingParams, Spectrum};

#[test]
fn test_spectrum_with_uneven_peaks_is_rejected() {
    let text = r#"{
        "identifier": "scan=7",
        "precursor_mz": 500.0,
        "precursor_charge": 2,
        "retention_time": null,
        "peptide": null,
        "is_decoy": false,
        "peaks": {
            "masses": [150.0, 300.0, 450.0],
            "intensities": [1.0],
            "annotations": [null, null, null],
            "processed": false
        }
    }"#;
    let err = serde_json::from_str::<Spectrum>(text).unwrap_err();
    assert!(err.to_string().contains("length"), "{err}");
}

#[test]
fn test_spectrum_roundtrip_processes() {
    let mut spectrum = Spectrum::new("scan=8", 500.0, Some(2));
    spectrum
        .set_peaks(&[150.0f32, 300.0, 650.0], &[1.0f32, 2.0, 3.0], None)
        .unwrap();
    let text = serde_json::to_string(&spectrum).unwrap();
    let mut back: Spectrum = serde_json::from_str(&text).unwrap();
    assert_eq!(back, spectrum);

    let params = PeakProcessingParams {
        min_peaks: 3,
        min_mz_range: 0.0,
        ..Default::default()
    };
    assert!(back.process(&params).unwrap().is_processed());
}

#[test]
fn test_bin_grid_with_zero_width_is_rejected() {
    let result =
        serde_json::from_str::<BinGrid>(r#"{"min_mz":11.0,"max_mz":2010.0,"bin_size":0.0}"#);
    assert!(result.is_err());

    let grid: BinGrid =
        serde_json::from_str(r#"{"min_mz":11.0,"max_mz":2010.0,"bin_size":1.0005079}"#).unwrap();
    assert_eq!(grid, BinGrid::new(11.0, 2010.0, 1.0005079).unwrap());
}
