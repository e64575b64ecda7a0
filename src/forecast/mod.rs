//! Forecast evaluation over the observed span and the future horizon.

mod extender;

pub use extender::{ForecastExtender, Horizon};
