//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - contract snapshot tests
//! - raw log directory -> batch align -> output files
//! - aligned output -> window tensor -> inference request

#[cfg(test)]
mod contract_tests {
    use contracts::{PipelineBlueprint, CHANNEL_COUNT, CHANNEL_ORDER, DEFAULT_WINDOW_LENGTH};

    #[test]
    fn test_config_version_defaults_and_rejects_unknown() {
        use config_loader::{ConfigFormat, ConfigLoader};
        use contracts::ConfigVersion;

        let implicit = ConfigLoader::load_from_str("[location]\nlabel = \"WAIST\"\n", ConfigFormat::Toml).unwrap();
        assert_eq!(implicit.version, ConfigVersion::V1);

        let explicit = ConfigLoader::load_from_str(
            "version = \"V1\"\n[location]\nlabel = \"WAIST\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(explicit.version, ConfigVersion::V1);

        assert!(ConfigLoader::load_from_str("version = \"V2\"\n", ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_classifier_shape_contract() {
        assert_eq!(DEFAULT_WINDOW_LENGTH, 200);
        assert_eq!(CHANNEL_COUNT, 6);
        assert_eq!(CHANNEL_ORDER.len(), CHANNEL_COUNT);

        let blueprint = PipelineBlueprint::default();
        config_loader::ConfigLoader::validate(&blueprint).unwrap();
        assert_eq!(blueprint.windowing.window_length, DEFAULT_WINDOW_LENGTH);
    }

    #[test]
    fn test_blueprint_toml_roundtrip_validates() {
        let mut blueprint = PipelineBlueprint::default();
        blueprint.location.label = Some("RIGHTPOCKET".to_string());
        let toml = config_loader::ConfigLoader::to_toml(&blueprint).unwrap();
        let parsed =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(parsed.location_label(), Some("RIGHTPOCKET"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;

    use contracts::{FormatConfig, LabeledSeries, FALL, NON_FALL};
    use dispatcher::{render_aligned, InferenceRequest, WindowTensor, WriteMode};
    use fallprep_cli::cli::{AlignArgs, CheckSyncArgs, SourceArgs};
    use fallprep_cli::commands::{run_align, run_check_sync};
    use fallprep_cli::pipeline::SkipKind;
    use ingestion::{read_aligned, EventParser, IngestionError, SensorFilter};
    use sync_engine::{StreamAligner, StridePolicy, SyncError, Windower};

    const HEADER: &str = "\
% Universidad de Malaga - ETSI de Telecomunicacion (Spain)
% Date: 2017-03-01
% ID of the subject: 1
% Type of Movement: ADL
% Number of sensors: 3
% Sensor_ID; Device_ID; Position; Model
% C4:BE:84:70:64:8A; 0; RIGHTPOCKET; SensorTag
% C4:BE:84:71:A5:02; 1; CHEST; SensorTag
% C4:BE:84:70:0E:80; 2; WAIST; SensorTag
% TimeStamp; Sample No; X-Axis; Y-Axis; Z-Axis; Sensor Type; Sensor ID
";

    const NO_POCKET_HEADER: &str = "\
% Number of sensors: 1
% C4:BE:84:71:A5:02; 1; CHEST; SensorTag
% TimeStamp; Sample No; X-Axis; Y-Axis; Z-Axis; Sensor Type; Sensor ID
";

    /// Pocket device with accel at `accel` indices and gyro at `gyro`
    /// indices, gyro lagging by `lag_ms`; chest device noise in between.
    fn raw_log(accel: &[i64], gyro: &[i64], lag_ms: i64) -> String {
        let mut out = String::from(HEADER);
        for &i in accel {
            let t = 1000 + 20 * i;
            out.push_str(&format!("{t};{i};0.{i};-1.5;9.81;0;0\n"));
            out.push_str(&format!("{t};{i};7;7;7;0;1\n"));
        }
        for &i in gyro {
            let t = 1000 + 20 * i + lag_ms;
            out.push_str(&format!("{t};{i};1{i}.25;0;-3;1;0\n"));
            out.push_str(&format!("{t};{i};5;5;5;2;0\n"));
        }
        out
    }

    fn write_corpus(dir: &Path, files: &[(&str, String)]) {
        fs::create_dir_all(dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    fn align_args(input: &Path, output: &Path) -> AlignArgs {
        AlignArgs {
            source: SourceArgs {
                input: Some(input.to_path_buf()),
                location: Some("RIGHTPOCKET".to_string()),
                workers: Some(3),
                ..Default::default()
            },
            output: Some(output.to_path_buf()),
            filtered_output: None,
            force: false,
            dry_run: false,
            json: true,
        }
    }

    /// Scenario A: accel [1,2,3,5], gyro [2,3,4,5] -> aligned [2,3,5]
    #[test]
    fn test_scenario_a_index_intersection() {
        let log = EventParser::new(FormatConfig::default())
            .parse_str(&raw_log(&[1, 2, 3, 5], &[2, 3, 4, 5], 0));
        let filtered = SensorFilter::for_location("RIGHTPOCKET").apply(log).unwrap();
        let records = StreamAligner::new().align(&filtered.streams).unwrap();

        let indices: Vec<i64> = records.iter().map(|r| r.sample_index).collect();
        assert_eq!(indices, [2, 3, 5]);
        assert!(records.len() <= filtered.streams.accel.len().min(filtered.streams.gyro.len()));
        // accel timestamp is kept, gyro values come from the pocket device
        assert_eq!(records[0].timestamp_ms, 1040);
        assert_eq!(records[0].accel.x, 0.2);
        assert_eq!(records[0].gyro.x, 12.25);
    }

    /// Scenario B: L=4, S=2, N=10 for label 0 and N=3 for label 1
    #[test]
    fn test_scenario_b_window_starts() {
        let log = EventParser::new(FormatConfig::default())
            .parse_str(&raw_log(&(0..13).collect::<Vec<_>>(), &(0..13).collect::<Vec<_>>(), 0));
        let filtered = SensorFilter::for_location("RIGHTPOCKET").apply(log).unwrap();
        let records = StreamAligner::new().align(&filtered.streams).unwrap();

        let mut series = LabeledSeries::uniform(records[..10].to_vec(), NON_FALL);
        for record in &records[10..] {
            series.push(*record, FALL);
        }

        let windower = Windower::new(4, StridePolicy::new([(NON_FALL, 2), (FALL, 2)]).unwrap()).unwrap();
        let batch = windower.windows(&series).unwrap();

        assert_eq!(batch.len(), 4);
        assert!(batch.windows.iter().all(|w| w.label == NON_FALL));
        let firsts: Vec<f32> = batch.windows.iter().map(|w| w.channels[0][0]).collect();
        let expected: Vec<f32> = [0u64, 2, 4, 6]
            .iter()
            .map(|&i| records[i as usize].accel.x as f32)
            .collect();
        assert_eq!(firsts, expected);
        assert!(batch
            .windows
            .iter()
            .all(|w| w.channels.iter().all(|c| c.len() == 4)));
    }

    /// Scenario C: header never declares RIGHTPOCKET
    #[test]
    fn test_scenario_c_location_not_found() {
        let log = EventParser::new(FormatConfig::default())
            .parse_str(&format!("{NO_POCKET_HEADER}100;1;0;0;0;0;1\n100;1;0;0;0;1;1\n"));
        let err = SensorFilter::for_location("RIGHTPOCKET").apply(log).unwrap_err();
        assert!(matches!(err, IngestionError::LocationNotFound { ref label } if label == "RIGHTPOCKET"));
    }

    /// Scenario D: a four-field data line is skipped and counted
    #[test]
    fn test_scenario_d_short_line_skipped() {
        let log = EventParser::new(FormatConfig::default())
            .parse_str("100;5;0.1;0.2\n110;6;0.1;0.2;0.3;0\n");
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].sample_index, 6);
        assert_eq!(log.stats.records_skipped, 1);
        assert_eq!(log.stats.records_parsed, 1);
    }

    #[test]
    fn test_invalid_stride_is_a_hard_failure() {
        let err = StridePolicy::new([(NON_FALL, 200), (FALL, 0)]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidStride { label: FALL, stride: 0 }));
    }

    #[tokio::test]
    async fn test_batch_align_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("UMAFall_Dataset");
        let output = dir.path().join("UMAFall_Dataset_Aligned");
        write_corpus(
            &input,
            &[
                ("UMAFall_01_ADL.csv", raw_log(&[1, 2, 3, 5], &[2, 3, 4, 5], 3)),
                ("UMAFall_02_Fall.csv", raw_log(&[1, 2], &[1, 2], 0)),
                (
                    "UMAFall_03_ADL.csv",
                    format!("{NO_POCKET_HEADER}100;1;0;0;0;0;1\n"),
                ),
                ("UMAFall_04_ADL.csv", raw_log(&[1, 2], &[3, 4], 0)),
                ("notes.txt", "not a log".to_string()),
            ],
        );

        let stats = run_align(&align_args(&input, &output)).await.unwrap();

        assert_eq!(stats.files_total, 4);
        assert_eq!(stats.written, 2);
        assert_eq!(stats.records_aligned, 5);
        assert_eq!(stats.skipped.get(&SkipKind::LocationNotFound), Some(&1));
        assert_eq!(stats.skipped.get(&SkipKind::NoAlignableData), Some(&1));

        assert!(output.join("UMAFall_01_ADL.csv").is_file());
        assert!(output.join("UMAFall_02_Fall.csv").is_file());
        assert!(!output.join("UMAFall_03_ADL.csv").exists());
        assert!(!output.join("UMAFall_04_ADL.csv").exists());

        let aligned = fs::read_to_string(output.join("UMAFall_01_ADL.csv")).unwrap();
        assert!(aligned.starts_with("% Universidad de Malaga"));
        assert!(aligned.contains(
            "% TimeStamp; Sample No; Accel-X; Accel-Y; Accel-Z; Gyro-X; Gyro-Y; Gyro-Z\n"
        ));
        assert!(aligned.ends_with("1100;5;0.5;-1.5;9.81;15.25;0;-3\n"));
    }

    #[tokio::test]
    async fn test_align_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        write_corpus(
            &input,
            &[("s.csv", raw_log(&(0..50).collect::<Vec<_>>(), &(3..60).collect::<Vec<_>>(), 1))],
        );

        let first = dir.path().join("first");
        let second = dir.path().join("second");
        run_align(&align_args(&input, &first)).await.unwrap();
        run_align(&align_args(&input, &second)).await.unwrap();

        let a = fs::read(first.join("s.csv")).unwrap();
        let b = fs::read(second.join("s.csv")).unwrap();
        assert_eq!(a, b);

        // reading the aligned file back renders the same bytes
        let (log, stats) = read_aligned(&first.join("s.csv"), FormatConfig::default()).unwrap();
        assert_eq!(stats.records_skipped, 0);
        assert_eq!(log.records.len(), 47);
        let rendered = render_aligned(&log, FormatConfig::default());
        assert_eq!(rendered.as_bytes(), a.as_slice());
    }

    #[tokio::test]
    async fn test_filtered_then_aligned_matches_direct() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        write_corpus(&input, &[("s.csv", raw_log(&[1, 2, 3, 5], &[2, 3, 4, 5], 2))]);

        let filtered = dir.path().join("filtered");
        let direct = dir.path().join("direct");
        let mut args = align_args(&input, &direct);
        args.filtered_output = Some(filtered.clone());
        run_align(&args).await.unwrap();

        // the filtered corpus is single-device in content but keeps its ids
        let again = dir.path().join("again");
        run_align(&align_args(&filtered, &again)).await.unwrap();

        assert_eq!(
            fs::read(direct.join("s.csv")).unwrap(),
            fs::read(again.join("s.csv")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_check_sync_over_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        write_corpus(
            &input,
            &[
                ("a.csv", raw_log(&[1, 2, 3], &[1, 2, 3], 0)),
                ("b.csv", raw_log(&[1, 2, 3, 4], &[2, 3, 4, 5], 6)),
                ("c.csv", raw_log(&[1, 2], &[], 0)),
            ],
        );

        let audit = run_check_sync(&CheckSyncArgs {
            source: SourceArgs {
                input: Some(input),
                location: Some("RIGHTPOCKET".to_string()),
                ..Default::default()
            },
            json: true,
        })
        .await
        .unwrap();

        let report = &audit.report;
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.files_ignored, 1);
        assert_eq!(report.pairs, 6);
        assert_eq!(report.perfectly_synced, 3);
        assert!(report.divergence_ms.min >= 0.0);
        assert!(report.divergence_ms.min <= report.divergence_ms.mean);
        assert!(report.divergence_ms.mean <= report.divergence_ms.max);
        assert_eq!(report.divergence_ms.max, 6.0);
        assert!((report.perfect_fraction - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_aligned_output_to_inference_request() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("aligned");
        let indices: Vec<i64> = (0..12).collect();
        write_corpus(&input, &[("fall.csv", raw_log(&indices, &indices, 0))]);
        run_align(&align_args(&input, &output)).await.unwrap();

        let (log, _) = read_aligned(&output.join("fall.csv"), FormatConfig::default()).unwrap();
        let windower = Windower::new(4, StridePolicy::new([(FALL, 4)]).unwrap()).unwrap();
        let batch = windower
            .windows(&LabeledSeries::uniform(log.records, FALL))
            .unwrap();
        assert_eq!(batch.shape(), [3, 4, 6]);

        let tensor_path = dir.path().join("windows.json");
        let tensor = WindowTensor::from_batch(&batch, chrono::Utc::now()).unwrap();
        tensor.write_to(&tensor_path, WriteMode::CreateNew).unwrap();
        assert!(tensor.write_to(&tensor_path, WriteMode::CreateNew).is_err());

        let request = InferenceRequest::from_window(&batch.windows[0], 4).unwrap();
        assert_eq!(request.shape(), [1, 4, 6]);
        let json: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(json[0][3][3], 13.25);
    }
}
