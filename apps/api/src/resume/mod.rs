// Resume generation workflow: session state machine, reveal cadence, artifact
// export. All generation calls go through llm_client — no direct Gemini calls
// here.

pub mod artifact;
pub mod handlers;
pub mod reveal;
pub mod session;
