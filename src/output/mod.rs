pub mod formatter;

pub use formatter::{
    bar_width, format_bar, format_json, format_pct, format_pp, format_prediction_report,
    format_signed_pp, format_weights_report, should_use_colors, ReportStyle,
};
