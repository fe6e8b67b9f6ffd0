//! ankh chart retrieval
//!
//! Charts without a local copy next to their descriptor are fetched as
//! packaged archives from the context's registry:
//!
//! ```rust,no_run
//! use ankh_repo::{ChartFetcher, HttpChartFetcher};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpChartFetcher::new()?;
//! let archive = fetcher.fetch("https://charts.example.com", "redis", "1.2.3")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod http;

pub use error::{FetchError, Result};
pub use fetcher::{ChartFetcher, archive_file_name, archive_url};
pub use http::{HttpChartFetcher, HttpChartFetcherBuilder};
