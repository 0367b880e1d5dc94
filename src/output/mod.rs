// Output module - Result rendering and export (terminal, JSON, CSV)

pub mod csv;
pub mod json;
pub mod terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
    Csv,
}
