use skystream::alerts::display::FeatureTableDisplayExt;
use skystream::{extract_features, merge_alerts, AlertBatch, FilterBand, MeanField};

/// A small batch as the archive serves it: two epochs of ZTF19aapreis with
/// overlapping lookback windows, one single-epoch object, wire field names.
fn archive_batch() -> AlertBatch {
    serde_json::from_str(
        r#"[
            {
                "objectId": "ZTF19aapreis",
                "candidate": {
                    "jd": 2459502.5, "fid": 1, "ra": 141.10, "dec": -32.50,
                    "magpsf": 18.2, "distnr": 0.6, "jdstarthist": 2459498.5
                },
                "prv_candidates": [
                    {"jd": 2459500.5, "fid": 1, "ra": 141.00, "dec": -32.40, "magpsf": 19.0},
                    {"jd": 2459501.5, "fid": 2, "ra": 141.05, "dec": -32.45, "magpsf": 18.6, "distnr": 0.4}
                ]
            },
            {
                "objectId": "ZTF19aapreis",
                "candidate": {
                    "jd": 2459504.5, "fid": 2, "ra": 141.20, "dec": -32.55,
                    "magpsf": 17.9, "jdstarthist": 2459500.5
                },
                "prv_candidates": [
                    {"jd": 2459501.5, "fid": 2, "ra": 141.05, "dec": -32.45, "magpsf": 18.6, "distnr": 0.4},
                    {"jd": 2459503.5, "fid": 1, "ra": 141.15, "dec": -32.52}
                ]
            },
            {
                "objectId": "ZTF18aaaaaaa",
                "candidate": {
                    "jd": 2459502.5, "fid": 3, "ra": 12.00, "dec": 5.00,
                    "magpsf": 20.1, "jdstarthist": 2459502.5
                },
                "prv_candidates": []
            }
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_pipeline_merges_then_extracts() {
    let merged = merge_alerts(archive_batch());
    assert_eq!(merged.len(), 2);

    let consolidated = merged
        .iter()
        .find(|alert| alert.object_id == "ZTF19aapreis")
        .unwrap();

    // latest epoch wins, earliest history start wins
    assert_eq!(consolidated.candidate.jd, 2459504.5);
    assert_eq!(consolidated.candidate.jd_start_hist, Some(2459498.5));

    // five distinct detections total: the shared prv entry appears once,
    // both current candidates and both unique prv entries survive
    assert_eq!(consolidated.full_history().len(), 5);

    let table = extract_features(&merged);
    let record = &table["ZTF19aapreis"];

    // true detections: 19.0 (g), 18.6 (r), 18.2 (g), 17.9 (r);
    // the 2459503.5 entry has no magnitude and is excluded everywhere
    let ra = record.mean(MeanField::Ra).unwrap();
    assert!((ra - (141.00 + 141.05 + 141.10 + 141.20) / 4.0).abs() < 1e-9);
    let distnr = record.mean(MeanField::Distnr).unwrap();
    assert!((distnr - 0.5).abs() < 1e-9);

    // brightest g at 2459502.5, brightest r at 2459504.5, nothing in i
    assert_eq!(record.peak_mjd(FilterBand::G), Some(2459502.5 - 2400000.5));
    assert_eq!(record.peak_mjd(FilterBand::R), Some(2459504.5 - 2400000.5));
    assert_eq!(record.peak_mjd(FilterBand::I), None);

    let single = &table["ZTF18aaaaaaa"];
    assert_eq!(single.peak_mjd(FilterBand::I), Some(2459502.5 - 2400000.5));
    assert_eq!(single.mean(MeanField::Distnr), None);
}

#[test]
fn test_table_rows_are_sorted_by_object_id() {
    let merged = merge_alerts(archive_batch());
    let table = extract_features(&merged);

    let ids: Vec<&String> = table.keys().collect();
    assert_eq!(ids, ["ZTF18aaaaaaa", "ZTF19aapreis"]);
}

#[test]
fn test_rendered_pipeline_output() {
    let merged = merge_alerts(archive_batch());
    let table = extract_features(&merged);

    let rendered = table
        .show()
        .with_fields(&[MeanField::Ra, MeanField::Dec])
        .with_precision(4)
        .to_string();

    assert!(rendered.contains("ZTF18aaaaaaa"));
    assert!(rendered.contains("ZTF19aapreis"));
    assert!(rendered.contains("peak_mjd_r"));
    // ZTF18aaaaaaa has no g detection: a null cell must be rendered
    assert!(rendered.contains("null"));
}
