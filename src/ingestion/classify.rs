//! File name → decode strategy.

use std::fmt;

use crate::types::TableOptions;

/// How a candidate's bytes are interpreted before being handed to the table producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeStrategy {
    /// Arrow IPC / Feather; the bytes go to the producer untouched.
    ColumnarBinary,
    /// UTF-8 JSON, parsed locally.
    Json,
    /// CSV; the bytes go to the producer untouched with a CSV hint.
    DelimitedText,
}

/// Suffix rules, checked in order. Matching is case-sensitive.
const SUFFIX_RULES: &[(&str, DecodeStrategy)] = &[
    (".feather", DecodeStrategy::ColumnarBinary),
    (".arrow", DecodeStrategy::ColumnarBinary),
    (".json", DecodeStrategy::Json),
    (".csv", DecodeStrategy::DelimitedText),
];

impl DecodeStrategy {
    /// Options the table producer is invoked with for this strategy.
    pub fn table_options(self) -> TableOptions {
        match self {
            Self::DelimitedText => TableOptions::csv(),
            Self::ColumnarBinary | Self::Json => TableOptions::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ColumnarBinary => "columnar-binary",
            Self::Json => "json",
            Self::DelimitedText => "delimited-text",
        }
    }
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a decode strategy from a file name.
///
/// Total over all inputs: names that match no rule (no extension, `.CSV`, `.bin`, the empty
/// string) fall back to [`DecodeStrategy::ColumnarBinary`].
pub fn classify(file_name: &str) -> DecodeStrategy {
    SUFFIX_RULES
        .iter()
        .find(|(suffix, _)| file_name.ends_with(suffix))
        .map(|&(_, strategy)| strategy)
        .unwrap_or(DecodeStrategy::ColumnarBinary)
}
