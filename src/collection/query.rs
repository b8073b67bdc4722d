//! Persona and task acquisition, and the query built from them
use std::path::Path;

/// File holding the persona description inside a collection
pub const PERSONA_FILE: &str = "persona.txt";
/// File holding the job-to-be-done inside a collection
pub const JOB_FILE: &str = "job.txt";

/// Read a prompt file, trimmed; any failure yields an empty string
pub fn read_prompt_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("File not found: {}", path.display());
            String::new()
        }
        Err(e) => {
            tracing::warn!("Error reading file {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Build the ranking query from a persona and a job description
///
/// Either part may be empty; when both are, so is the query.
pub fn synthesize_query(persona: &str, job: &str) -> String {
    match (persona.is_empty(), job.is_empty()) {
        (true, true) => String::new(),
        (true, false) => format!("As a user, {}", job),
        (false, true) => format!("As a {}, perform a task.", persona),
        (false, false) => format!("As a {}, {}", persona, job),
    }
}
