use crate::data::model::{CitySubset, WeatherRecord};
use crate::error::AnalysisError;

/// The most recent reading of the subset.
///
/// Equal timestamps resolve to the record that appears last in the source.
pub fn latest<'a>(subset: &CitySubset<'a>) -> Result<&'a WeatherRecord, AnalysisError> {
    subset
        .records
        .iter()
        .copied()
        .max_by_key(|r| r.last_updated)
        .ok_or_else(|| AnalysisError::EmptySubset {
            city: subset.city.clone(),
        })
}
