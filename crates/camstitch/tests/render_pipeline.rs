//! Scan-to-render integration tests with fake encoder and prober.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;
use tempfile::TempDir;

use camstitch::{
    list_input_files, GroupingPolicy, Grouper, Planner, RenderOutcome, Renderer, ScanOutcome,
};
use camstitch_media::{
    DurationProbe, Encoder, EncoderOutput, FfmpegCommand, MediaError, MediaResult,
};
use camstitch_models::{EncodingConfig, TagRules};

/// Durations by file name; unknown names fail to probe.
struct TableProbe(HashMap<String, u32>);

impl TableProbe {
    fn uniform(names: &[&str], secs: u32) -> Self {
        Self(names.iter().map(|n| (n.to_string(), secs)).collect())
    }
}

#[async_trait]
impl DurationProbe for TableProbe {
    async fn duration_secs(&self, path: &Path) -> MediaResult<u32> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.0
            .get(&name)
            .copied()
            .ok_or_else(|| MediaError::ffprobe_failed(format!("no duration for {}", name), None))
    }
}

/// Records every command and writes its output file.
#[derive(Default)]
struct RecordingEncoder {
    calls: Mutex<Vec<FfmpegCommand>>,
}

impl RecordingEncoder {
    fn calls(&self) -> Vec<FfmpegCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encoder for RecordingEncoder {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<EncoderOutput> {
        std::fs::write(cmd.output_path(), b"rendered")?;
        self.calls.lock().unwrap().push(cmd.clone());
        Ok(EncoderOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }
}

struct Fixture {
    input: TempDir,
    output: TempDir,
}

impl Fixture {
    fn new(names: &[&str]) -> Self {
        let input = TempDir::new().unwrap();
        for name in names {
            std::fs::write(input.path().join(name), b"").unwrap();
        }
        Self {
            input,
            output: TempDir::new().unwrap(),
        }
    }

    async fn scan(&self, probe: TableProbe) -> ScanOutcome {
        let files = list_input_files(self.input.path()).await.unwrap();
        Grouper::new(
            probe,
            TagRules::default(),
            Duration::hours(2),
            GroupingPolicy::FirstMatch,
        )
        .group(files, |_| {})
        .await
    }

    fn renderer(&self) -> Renderer<RecordingEncoder> {
        Renderer::new(
            RecordingEncoder::default(),
            Planner::new(EncodingConfig::software(), 4, self.output.path()),
        )
    }
}

/// `count` front/back pairs one minute apart starting at 10:00.
fn paired_names(fronts: usize, backs: usize) -> Vec<String> {
    let front = (0..fronts).map(|m| format!("20230305_10{:02}00_A.mp4", m));
    let back = (0..backs).map(|m| format!("20230305_10{:02}00_B.mp4", m));
    front.chain(back).collect()
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_sessions_split_on_gap() {
    let names = [
        "20230305_100000_A.mp4",
        "20230305_103000_A.mp4",
        "20230305_130000_A.mp4",
    ];
    let fixture = Fixture::new(&names);
    let outcome = fixture.scan(TableProbe::uniform(&names, 60)).await;

    let titles: Vec<_> = outcome.groups.iter().map(|g| g.title()).collect();
    assert_eq!(titles, vec!["05 Mar 2023 10-00-00", "05 Mar 2023 13-00-00"]);
    assert_eq!(outcome.groups[0].clip_count(), 2);
    assert_eq!(outcome.groups[1].clip_count(), 1);
}

#[tokio::test]
async fn test_unpaired_clips_are_dropped_from_single_batch() {
    let names = paired_names(5, 3);
    let names = as_strs(&names);
    let fixture = Fixture::new(&names);
    let mut outcome = fixture.scan(TableProbe::uniform(&names, 60)).await;
    assert_eq!(outcome.groups.len(), 1);

    let renderer = fixture.renderer();
    let result = renderer.render_group(&mut outcome.groups[0]).await.unwrap();
    assert!(matches!(result, RenderOutcome::Rendered { batches: 1, .. }));

    let calls = renderer.encoder().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].input_count(), 6);
    assert_eq!(calls[1].input_count(), 1);
    assert_eq!(calls[1].input_paths().next(), Some(calls[0].output_path()));
}

#[tokio::test]
async fn test_nine_pairs_render_in_three_batches() {
    let names = paired_names(9, 9);
    let names = as_strs(&names);
    let fixture = Fixture::new(&names);
    let mut outcome = fixture.scan(TableProbe::uniform(&names, 60)).await;

    let renderer = fixture.renderer();
    renderer.render_group(&mut outcome.groups[0]).await.unwrap();

    let calls = renderer.encoder().calls();
    let inputs: Vec<_> = calls.iter().map(|c| c.input_count()).collect();
    assert_eq!(inputs, vec![8, 8, 2, 3]);

    let out = fixture.output.path();
    let batch_outputs: Vec<PathBuf> = calls[..3]
        .iter()
        .map(|c| c.output_path().to_path_buf())
        .collect();
    assert_eq!(
        batch_outputs,
        vec![
            out.join("05 Mar 2023 10-00-00_0.mp4"),
            out.join("05 Mar 2023 10-00-00_1.mp4"),
            out.join("05 Mar 2023 10-00-00_2.mp4"),
        ]
    );
    let merged: Vec<&Path> = calls[3].input_paths().collect();
    assert_eq!(merged, batch_outputs.iter().map(PathBuf::as_path).collect::<Vec<_>>());
    assert_eq!(calls[3].output_path(), out.join("05 Mar 2023 10-00-00.mp4"));
}

#[tokio::test]
async fn test_unprobeable_clip_joins_no_group() {
    let names = [
        "20230305_100000_A.mp4",
        "20230305_100000_B.mp4",
        "20230305_100100_A.mp4",
    ];
    let fixture = Fixture::new(&names);
    let outcome = fixture.scan(TableProbe::uniform(&names[..2], 60)).await;

    assert_eq!(outcome.groups.len(), 1);
    let grouped: Vec<_> = outcome.groups[0].clips().map(|c| c.path.clone()).collect();
    assert!(!grouped.contains(&fixture.input.path().join(names[2])));
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].path, fixture.input.path().join(names[2]));
}

#[tokio::test]
async fn test_every_clip_lands_in_exactly_one_group() {
    let names = [
        "20230305_080000_A.mp4",
        "20230305_080000_B.mp4",
        "20230305_093000_A.mp4",
        "20230305_120000_A.mp4",
        "20230305_120000_B.mp4",
        "20230306_070000_PA.mp4",
        "notes.txt",
    ];
    let fixture = Fixture::new(&names);
    let outcome = fixture.scan(TableProbe::uniform(&names, 60)).await;

    let mut grouped: Vec<PathBuf> = outcome
        .groups
        .iter()
        .flat_map(|g| g.clips().map(|c| c.path.clone()))
        .collect();
    grouped.sort();
    let mut expected: Vec<PathBuf> = names[..6]
        .iter()
        .map(|n| fixture.input.path().join(n))
        .collect();
    expected.sort();
    assert_eq!(grouped, expected);
    assert_eq!(outcome.groups.len(), 3);

    for group in &outcome.groups {
        let mut times: Vec<_> = group.clips().map(|c| c.captured_at).collect();
        times.sort();
        assert!(times.windows(2).all(|w| w[1] - w[0] <= Duration::hours(2)));
    }
}

#[tokio::test]
async fn test_second_render_is_a_no_op() {
    let names = paired_names(2, 2);
    let names = as_strs(&names);
    let fixture = Fixture::new(&names);
    let mut outcome = fixture.scan(TableProbe::uniform(&names, 60)).await;
    let renderer = fixture.renderer();

    let first = renderer.render_all(&mut outcome.groups, |_| {}).await;
    assert_eq!(first.rendered, 1);
    let calls_after_first = renderer.encoder().calls().len();
    assert_eq!(calls_after_first, 2);

    let mut rescanned = fixture.scan(TableProbe::uniform(&names, 60)).await;
    let second = renderer.render_all(&mut rescanned.groups, |_| {}).await;
    assert_eq!(second.skipped, 1);
    assert_eq!(second.rendered, 0);
    assert_eq!(renderer.encoder().calls().len(), calls_after_first);
    assert_eq!(
        rescanned.groups[0].final_output,
        Some(fixture.output.path().join("05 Mar 2023 10-00-00.mp4"))
    );
}

#[tokio::test]
async fn test_batch_count_follows_shorter_side() {
    for (fronts, backs, batches) in [(1, 1, 1), (4, 6, 1), (7, 5, 2), (13, 12, 3)] {
        let names = paired_names(fronts, backs);
        let names = as_strs(&names);
        let fixture = Fixture::new(&names);
        let outcome = fixture.scan(TableProbe::uniform(&names, 60)).await;

        let plan = fixture.renderer().planner().plan(&outcome.groups[0]);
        let pairs = fronts.min(backs);
        assert_eq!(plan.pair_count(), pairs);
        assert_eq!(plan.batches.len(), batches);
        assert_eq!(plan.batches.len(), (pairs + 3) / 4);
        assert!(plan.batches.iter().all(|b| b.pairs.len() <= 4));
    }
}

#[tokio::test]
async fn test_parked_front_clip_gets_silent_audio() {
    let names = ["20230305_100000_PA.mp4", "20230305_100000_PB.mp4"];
    let fixture = Fixture::new(&names);
    let outcome = fixture.scan(TableProbe::uniform(&names, 42)).await;

    let plan = fixture.renderer().planner().plan(&outcome.groups[0]);
    let filter = plan.batches[0].command.filter().unwrap();
    assert!(filter.contains("anullsrc=channel_layout=stereo:sample_rate=44100:d=42"));
}
