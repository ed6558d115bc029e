use crate::Segment;

/// Join segment text with single spaces, in the order given
pub fn assemble(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
