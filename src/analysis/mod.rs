//! Wind resource analysis utilities.
//!
//! This module provides tools for:
//! - Long-term reference speeds from the mean of monthly means (MOMM)
//! - Data continuity gaps and per-window coverage
//! - Binned distributions and direction-by-speed frequency tables
//! - Turbulence intensity summaries by speed, sector and hour/month
//!
//! # Mean of monthly means
//!
//! ```text
//! MOMM = (1 / M) Σₘ mean(values in calendar month m)
//! ```
//!
//! where the sum runs over the M calendar months present in the data. Every
//! month weighs the same, so a record with two Januaries and one July is not
//! biased towards winter.
//!
//! # Example
//!
//! ```ignore
//! use correl_rs::analysis::{calc_lt_ref_speed, get_time_continuity_gaps};
//!
//! let lt = calc_lt_ref_speed(&reference, Some("2000-01-01".into()), Some("2019-12-31".into()))?;
//! for gap in get_time_continuity_gaps(&mast)? {
//!     println!("{} -> {}: {:.2} days", gap.date_from, gap.date_to, gap.days_lost);
//! }
//! ```

mod continuity;
mod distribution;
mod long_term;
mod stats;
mod turbulence;

pub use continuity::{
    ContinuityGap, CoverageRow, get_concurrent_coverage, get_coverage, get_time_continuity_gaps,
};
pub use distribution::{
    DistributionBin, DistributionStat, FrequencyTable, SectorBinning, default_speed_bins,
    get_distribution, get_distribution_by_wind_sector, get_freq_table, get_sector_ratio,
};
pub use long_term::{DateInput, calc_lt_ref_speed, mean_of_monthly_means};
pub use stats::{BasicStats, get_basic_stats};
pub use turbulence::{
    TiBySectorRow, TiBySpeedRow, TiMatrix, get_12x24_ti_matrix, get_ti_by_sector, get_ti_by_speed,
};
