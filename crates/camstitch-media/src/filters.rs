//! FFmpeg filter graph building.
//!
//! A [`FilterGraph`] is an ordered list of `;`-separated statements that read
//! and write bracketed stream labels, e.g.
//! `[0:v][0:a][2:v][2:a]concat=n=2:v=1:a=1[front_v][front_a]`.

use std::collections::BTreeMap;
use std::fmt;

/// A stream reference inside a filter graph: an input stream specifier such
/// as `0:v` or a named label such as `front_v`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamRef(String);

impl StreamRef {
    /// Video stream of input `index`.
    pub fn video(index: usize) -> Self {
        Self(format!("{}:v", index))
    }

    /// Audio stream of input `index`.
    pub fn audio(index: usize) -> Self {
        Self(format!("{}:a", index))
    }

    /// Named intermediate stream.
    pub fn label(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Builder for a `-filter_complex` graph.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    statements: Vec<String>,
    /// Silent audio consumers per duration in seconds
    silence: BTreeMap<u32, usize>,
    /// Sample rate of generated silent audio
    sample_rate: String,
}

impl FilterGraph {
    /// Create an empty graph; `sample_rate` is used for generated silence.
    pub fn new(sample_rate: impl Into<String>) -> Self {
        Self {
            statements: Vec::new(),
            silence: BTreeMap::new(),
            sample_rate: sample_rate.into(),
        }
    }

    /// Concatenate segments.
    ///
    /// Each segment is a video stream with an optional audio stream. When
    /// `audio_out` is set every segment must carry audio; otherwise audio
    /// streams are ignored and only video is concatenated.
    pub fn concat(
        mut self,
        segments: &[(StreamRef, Option<StreamRef>)],
        video_out: &StreamRef,
        audio_out: Option<&StreamRef>,
    ) -> Self {
        let mut statement = String::new();
        for (video, audio) in segments {
            statement.push_str(&video.to_string());
            if audio_out.is_some() {
                if let Some(audio) = audio {
                    statement.push_str(&audio.to_string());
                }
            }
        }

        statement.push_str(&format!("concat=n={}:v=1", segments.len()));
        match audio_out {
            Some(audio_out) => {
                statement.push_str(&format!(":a=1{}{}", video_out, audio_out));
            }
            None => statement.push_str(&video_out.to_string()),
        }

        self.statements.push(statement);
        self
    }

    /// Scale a stream to a fixed size with the given scale filter.
    pub fn scale(
        mut self,
        filter: &str,
        input: &StreamRef,
        width: u32,
        height: u32,
        output: &StreamRef,
    ) -> Self {
        self.statements
            .push(format!("{}{}={}:{}{}", input, filter, width, height, output));
        self
    }

    /// Overlay `overlay` on `background` at (`x`, `y`) with the given overlay filter.
    pub fn overlay(
        mut self,
        filter: &str,
        background: &StreamRef,
        overlay: &StreamRef,
        x: u32,
        y: u32,
        output: &StreamRef,
    ) -> Self {
        self.statements.push(format!(
            "{}{}{}={}:{}{}",
            background, overlay, filter, x, y, output
        ));
        self
    }

    /// Request a silent stereo audio stream of `duration_secs`.
    ///
    /// One source is generated per distinct duration and split between all
    /// of its consumers, so every returned label is consumed exactly once.
    pub fn silence(&mut self, duration_secs: u32) -> StreamRef {
        let consumers = self.silence.entry(duration_secs).or_insert(0);
        let label = silence_label(duration_secs, *consumers);
        *consumers += 1;
        label
    }

    /// Whether the graph has no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.silence.is_empty()
    }

    /// Render the graph.
    pub fn build(&self) -> String {
        let sources = self.silence.iter().map(|(&duration, &consumers)| {
            let mut source = format!(
                "anullsrc=channel_layout=stereo:sample_rate={}:d={}",
                self.sample_rate, duration
            );
            if consumers > 1 {
                source.push_str(&format!(",asplit={}", consumers));
            }
            for index in 0..consumers {
                source.push_str(&silence_label(duration, index).to_string());
            }
            source
        });

        sources
            .chain(self.statements.iter().cloned())
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn silence_label(duration_secs: u32, index: usize) -> StreamRef {
    StreamRef::label(format!("silence_{}_{}", duration_secs, index))
}

/// Build the filter that concatenates `count` whole inputs (video and audio).
pub fn concat_inputs(count: usize) -> String {
    format!("concat=n={}:v=1:a=1", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_with_audio() {
        let graph = FilterGraph::new("44100").concat(
            &[
                (StreamRef::video(0), Some(StreamRef::audio(0))),
                (StreamRef::video(2), Some(StreamRef::audio(2))),
            ],
            &StreamRef::label("front_v"),
            Some(&StreamRef::label("front_a")),
        );
        assert_eq!(
            graph.build(),
            "[0:v][0:a][2:v][2:a]concat=n=2:v=1:a=1[front_v][front_a]"
        );
    }

    #[test]
    fn test_concat_video_only_ignores_audio() {
        let graph = FilterGraph::new("44100").concat(
            &[
                (StreamRef::video(1), Some(StreamRef::audio(1))),
                (StreamRef::video(3), None),
            ],
            &StreamRef::label("back_v"),
            None,
        );
        assert_eq!(graph.build(), "[1:v][3:v]concat=n=2:v=1[back_v]");
    }

    #[test]
    fn test_scale_and_overlay() {
        let graph = FilterGraph::new("44100")
            .scale(
                "scale_cuda",
                &StreamRef::label("back_v"),
                1280,
                720,
                &StreamRef::label("back_s"),
            )
            .overlay(
                "overlay_cuda",
                &StreamRef::label("front_v"),
                &StreamRef::label("back_s"),
                0,
                0,
                &StreamRef::label("v"),
            );
        assert_eq!(
            graph.build(),
            "[back_v]scale_cuda=1280:720[back_s];[front_v][back_s]overlay_cuda=0:0[v]"
        );
    }

    #[test]
    fn test_silence_keyed_by_duration() {
        let mut graph = FilterGraph::new("44100");
        let a = graph.silence(60);
        let b = graph.silence(45);
        let c = graph.silence(60);

        assert_ne!(a, c);
        assert_eq!(b.name(), "silence_45_0");

        let built = graph.build();
        assert_eq!(
            built,
            "anullsrc=channel_layout=stereo:sample_rate=44100:d=45[silence_45_0];\
             anullsrc=channel_layout=stereo:sample_rate=44100:d=60,\
             asplit=2[silence_60_0][silence_60_1]"
        );
    }

    #[test]
    fn test_graphs_do_not_share_silence() {
        let mut first = FilterGraph::new("44100");
        first.silence(60);
        let mut second = FilterGraph::new("44100");
        assert_eq!(second.silence(60).name(), "silence_60_0");
    }

    #[test]
    fn test_concat_inputs() {
        assert_eq!(concat_inputs(3), "concat=n=3:v=1:a=1");
        assert!(FilterGraph::new("44100").is_empty());
    }
}
