//! Calendar seasonality.
//!
//! - Fourier bases for the yearly and weekly cycles of the additive model
//! - Day-of-week and month-of-year profiles of fitted components

mod fourier;
mod profile;

pub use fourier::{FourierSeasonality, WEEK_DAYS, YEAR_DAYS};
pub use profile::{weekly_profile, yearly_profile, ProfileEntry, SeasonalProfile};
