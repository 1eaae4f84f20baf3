use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Any run of spaces or tabs
    #[default]
    Whitespace,
    Comma,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<count> <seconds>`
    #[default]
    Pair,
    /// `processes, threads, total_workers, execution_time`
    Hybrid,
}

/// How a results file is laid out on disk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputFormat {
    #[serde(default)]
    pub delimiter: Delimiter,
    /// First non-blank line is a header
    #[serde(default)]
    pub header: bool,
    #[serde(default)]
    pub layout: Layout,
}

impl InputFormat {
    pub const PAIR_FIELDS: usize = 2;

    /// `timing_results.txt` style, as appended by the pthread runs
    pub fn whitespace_pair() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            header: false,
            layout: Layout::Pair,
        }
    }

    /// Averaged results with a `count,time` header
    pub fn csv_pair() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            header: true,
            layout: Layout::Pair,
        }
    }

    pub fn hybrid_table() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            header: true,
            layout: Layout::Hybrid,
        }
    }
}
