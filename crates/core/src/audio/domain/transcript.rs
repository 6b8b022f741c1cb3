use serde::{Deserialize, Serialize};

use crate::shared::constants::SCORE_DECIMALS;

/// Word-level output of the engine, before projection.
#[derive(Clone, Debug, PartialEq)]
pub struct RawWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub probability: f32,
}

/// Segment-level output of the engine, before projection.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSegment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: Option<String>,
    pub words: Vec<RawWord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// Confidence in `[0, 1]`, rounded to three decimals.
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub words: Vec<Word>,
}

impl Segment {
    /// Whitespace-separated token count of the text.
    pub fn approx_word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Ordered segments of one job, in engine emission order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
}

impl From<RawWord> for Word {
    fn from(raw: RawWord) -> Self {
        Self {
            word: raw.word,
            start: raw.start,
            end: raw.end,
            score: round_score(raw.probability as f64),
        }
    }
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        Self {
            id: raw.id,
            start: raw.start,
            end: raw.end,
            text: raw.text.unwrap_or_default(),
            words: raw.words.into_iter().map(Word::from).collect(),
        }
    }
}

/// Clamp to `[0, 1]` and round half away from zero to [`SCORE_DECIMALS`] places.
pub fn round_score(probability: f64) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    let scale = 10f64.powi(SCORE_DECIMALS);
    (probability.clamp(0.0, 1.0) * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::truncates(0.987_654, 0.988)]
    #[case::keeps_short(0.5, 0.5)]
    #[case::one(1.0, 1.0)]
    #[case::zero(0.0, 0.0)]
    #[case::above_one(1.2, 1.0)]
    #[case::negative(-0.1, 0.0)]
    #[case::tiny(0.000_4, 0.0)]
    fn test_round_score(#[case] input: f64, #[case] expected: f64) {
        assert_relative_eq!(round_score(input), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_round_score_nan_is_zero() {
        assert_eq!(round_score(f64::NAN), 0.0);
    }

    #[test]
    fn test_round_score_has_three_decimals() {
        let score = round_score(0.123_456_7);
        let text = serde_json::to_string(&score).unwrap();
        assert_eq!(text, "0.123");
    }

    #[test]
    fn test_segment_from_raw_projects_fields() {
        let raw = RawSegment {
            id: 4,
            start: 1.5,
            end: 3.25,
            text: Some(" shalom olam".to_string()),
            words: vec![
                RawWord {
                    word: " shalom".to_string(),
                    start: 1.5,
                    end: 2.0,
                    probability: 0.912_34,
                },
                RawWord {
                    word: " olam".to_string(),
                    start: 2.0,
                    end: 3.25,
                    probability: 0.5,
                },
            ],
        };

        let seg = Segment::from(raw);
        assert_eq!(seg.id, 4);
        assert_eq!(seg.start, 1.5);
        assert_eq!(seg.end, 3.25);
        assert_eq!(seg.text, " shalom olam");
        assert_eq!(seg.words.len(), 2);
        assert_eq!(seg.words[0].word, " shalom");
        assert_relative_eq!(seg.words[0].score, 0.912, epsilon = 1e-12);
        assert_eq!(seg.approx_word_count(), 2);
    }

    #[test]
    fn test_segment_missing_text_is_empty() {
        let raw = RawSegment {
            id: 1,
            start: 0.0,
            end: 1.0,
            text: None,
            words: Vec::new(),
        };
        let seg = Segment::from(raw);
        assert_eq!(seg.text, "");
        assert_eq!(seg.approx_word_count(), 0);
    }

    #[test]
    fn test_transcript_serializes_schema() {
        let transcript = Transcript {
            segments: vec![Segment {
                id: 1,
                start: 0.0,
                end: 0.5,
                text: "hi".to_string(),
                words: vec![Word {
                    word: "hi".to_string(),
                    start: 0.0,
                    end: 0.5,
                    score: 0.75,
                }],
            }],
        };
        let value = serde_json::to_value(&transcript).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "segments": [{
                    "id": 1, "start": 0.0, "end": 0.5, "text": "hi",
                    "words": [{"word": "hi", "start": 0.0, "end": 0.5, "score": 0.75}]
                }]
            })
        );
    }
}
