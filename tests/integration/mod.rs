//! Integration tests for the treewire resolution engine

mod cli_commands;
mod config_integration;
mod scene_documents;
mod test_utils;
