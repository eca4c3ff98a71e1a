/// Render job input parsing and the output artifact.
pub mod job;
/// Long-lived renderer with explicit font initialisation.
pub mod renderer;
/// Frame sequencing: scenes to ordered frames to a sink.
pub mod sequencer;
