//! Flat-file input and output for the Value-Up index pipeline.
//!
//! The yearly screening tables, the industry metadata and the daily quote
//! tables are CSV files under a data root described by [`DataLayout`].
//! [`CsvTableSource`] serves them to the screening funnel and
//! [`load_panel`] builds the daily [`valueup_traits::MarketPanel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use valueup_data::{CsvTableSource, DataLayout, load_panel, write_series};
//!
//! let layout = DataLayout::with_root("Data/ValueUp");
//! let source = CsvTableSource::new(layout.clone());
//! let panel = load_panel(&layout, start, end)?;
//! write_series(Path::new("value_up_index_result.csv"), &levels, "Index")?;
//! ```

mod frame;
pub mod layout;
pub mod output;
pub mod panel;
pub mod source;
pub mod tables;

pub use layout::DataLayout;
pub use output::{
    constituents_file_name, read_constituents, read_series, write_comparison, write_constituents,
    write_series,
};
pub use panel::{load_panel, parse_date, read_daily_table};
pub use source::CsvTableSource;
