mod text;

pub use text::{compact_json, is_blank, is_truthy, round_tenths, truncate, truncate_with, TRUNCATION_MARKER};
