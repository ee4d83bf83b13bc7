//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::TreewireError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &TreewireError) -> String {
    match e {
        TreewireError::UnknownPipelineBuilder(_) | TreewireError::UnknownContextBuilder(_) => {
            format!("{}\nRun `treewire builders` to list the available builders.", e)
        }
        other => other.to_string(),
    }
}
