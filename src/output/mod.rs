pub mod export;
pub mod formatter;

pub use export::write_export;
pub use formatter::{
    format_csv, format_delta_table, format_rank, format_summary, format_tsv, render,
    should_use_colors, OutputFormat,
};
