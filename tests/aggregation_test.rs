//! End-to-end aggregation tests over synthetic scan files

mod helpers;

use approx::assert_relative_eq;
use specobs::proto::ScanFile;
use specobs::{Error, ReadingKind, aggregate_psd, read_scan_file};

#[test]
fn test_reference_scan_end_to_end() {
    let bytes = helpers::deflate(&helpers::encode_scan(&helpers::reference_scan()));
    let path = helpers::write_temp("reference.bin", &bytes);

    let scan = read_scan_file(&path).expect("Failed to read scan");
    let state = aggregate_psd(&scan, None, |_, _, _| Ok(())).expect("Failed to aggregate");

    assert_eq!(state.frequencies(), &[100.0, 100.5, 101.0]);
    assert_eq!(state.avg_contributor_count(), 1);

    let avg = state.average();
    assert_relative_eq!(avg[0], -50.0);
    assert!(avg[1].is_nan());
    assert_relative_eq!(avg[2], 0.0);

    assert_eq!(state.running_min(), &[-50.0, -50.0, -50.0]);
    assert_eq!(state.running_max(), &[0.0, 0.0, 0.0]);

    let summary = state.summary();
    assert_eq!(summary.block_count, 3);
    assert_eq!(summary.total_sample_count, 9);
    assert_eq!(summary.min_freq_hz, Some(100e6));
    assert_eq!(summary.max_freq_hz, Some(101e6));
    assert_relative_eq!(summary.min_time.unwrap(), 24_846_120.0 * 60.0);
    assert_relative_eq!(summary.max_time.unwrap(), 24_846_122.0 * 60.0);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_block_order_does_not_change_min_max() {
    let blocks = vec![
        helpers::psd_block(1, 100e6, 101e6, 0, &[-6400, -32768, 128]),
        helpers::psd_block(1, 100e6, 101e6, 1, &[-12800, -1280, -32768]),
        helpers::psd_block(2, 100e6, 101e6, 2, &[-32768, 0, -256]),
        helpers::psd_block(2, 100e6, 101e6, 3, &[640, -32768, -32768]),
    ];
    let aggregate = |order: &[usize]| {
        let file = ScanFile {
            config: None,
            spectral_psd_data: order.iter().map(|&i| blocks[i].clone()).collect(),
        };
        aggregate_psd(&file, None, |_, _, _| Ok(())).unwrap()
    };

    let reference = aggregate(&[0, 1, 2, 3]);
    assert_eq!(reference.running_min(), &[-100.0, -10.0, 1.0]);
    assert_eq!(reference.running_max(), &[5.0, 0.0, -2.0]);

    for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
        let state = aggregate(&order);
        assert_eq!(state.running_min(), reference.running_min());
        assert_eq!(state.running_max(), reference.running_max());
    }
}

#[test]
fn test_average_count_ignores_other_kinds() {
    let file = ScanFile {
        config: None,
        spectral_psd_data: vec![
            helpers::psd_block(0, 100e6, 101e6, 0, &[-1280, -2560]),
            helpers::psd_block(3, 100e6, 101e6, 0, &[128, 128]),
            helpers::psd_block(0, 100e6, 101e6, 0, &[-3840, -5120]),
            helpers::psd_block(7, 100e6, 101e6, 0, &[0, 0]),
            helpers::psd_block(99, 100e6, 101e6, 0, &[0, 0]),
        ],
    };
    let state = aggregate_psd(&file, None, |_, _, _| Ok(())).unwrap();
    assert_eq!(state.avg_contributor_count(), 2);
    assert_eq!(state.average(), vec![-20.0, -30.0]);
    assert_eq!(state.count_of(ReadingKind::StdDevOfAverage), 1);
    assert_eq!(state.count_of(ReadingKind::AverageOfMaximum), 1);
    assert_eq!(state.count_of(ReadingKind::Unknown(99)), 1);
    assert_eq!(state.unclassified_count(), 1);
    assert_eq!(state.summary().block_count, 5);
}

#[test]
fn test_axis_mismatch_aborts_file() {
    let file = ScanFile {
        config: None,
        spectral_psd_data: vec![
            helpers::psd_block(0, 100e6, 101e6, 0, &[0, 0, 0]),
            helpers::psd_block(0, 100e6, 102e6, 0, &[0, 0, 0]),
        ],
    };
    let mut visited = 0;
    let err = aggregate_psd(&file, None, |_, _, _| {
        visited += 1;
        Ok(())
    })
    .unwrap_err();
    assert_eq!(visited, 1);
    assert!(matches!(err, Error::AxisMismatch { block: 2, bins: 3, .. }), "{err}");
}

#[test]
fn test_out_of_range_sample_aborts_file() {
    let file = ScanFile {
        config: None,
        spectral_psd_data: vec![helpers::psd_block(0, 100e6, 101e6, 0, &[0, 40_000])],
    };
    let err = aggregate_psd(&file, None, |_, _, _| Ok(())).unwrap_err();
    assert!(matches!(err, Error::SampleOutOfRange { block: 1, value: 40_000 }));
}

#[test]
fn test_slice_of_reference_scan() {
    let state = aggregate_psd(&helpers::reference_scan(), None, |_, _, _| Ok(())).unwrap();

    let slice = state.slice(100.0, 100.5).unwrap();
    assert_eq!(slice.bins, 0..=1);
    assert_eq!(slice.freq, &[100.0, 100.5]);
    assert_relative_eq!(slice.avg[0], -50.0);
    assert!(slice.avg[1].is_nan());
    assert_eq!(slice.min, &[-50.0, -50.0]);
    assert_eq!(slice.max, &[0.0, 0.0]);

    // range errors leave the aggregate usable
    assert!(state.slice(99.0, 100.5).is_err());
    assert!(state.slice(100.6, 100.2).is_err());
    assert_eq!(state.slice(100.0, 101.0).unwrap().len(), 3);
}
