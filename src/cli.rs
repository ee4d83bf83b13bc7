//! CLI domain: parse, route, output, and presentation only.
//! No resolution logic; the route table dispatches to the resolver.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_builders_json, format_builders_text, format_policies_json, format_policies_text,
    format_resolution_json, format_resolution_text,
};
pub use route::{command_name, CliContext};
