use std::collections::BTreeSet;

use super::model::{CitySubset, WeatherTable};

// ---------------------------------------------------------------------------
// City selection
// ---------------------------------------------------------------------------

/// Sorted, de-duplicated city names present in the table.
///
/// Every returned name yields a non-empty [`filter_by_city`] result.
pub fn distinct_cities(table: &WeatherTable) -> Vec<String> {
    table
        .records
        .iter()
        .map(|r| r.location_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// All records whose city equals `city`, in table order.
///
/// An unknown name yields an empty subset rather than an error.
pub fn filter_by_city<'a>(table: &'a WeatherTable, city: &str) -> CitySubset<'a> {
    CitySubset {
        city: city.to_string(),
        records: table
            .records
            .iter()
            .filter(|r| r.location_name == city)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::record;

    fn table() -> WeatherTable {
        let records = vec![
            record("Mumbai", 0, 30.0),
            record("Delhi", 0, 38.0),
            record("Chennai", 1, 33.0),
            record("Delhi", 1, 37.5),
            record("Mumbai", 2, 29.5),
            record("Delhi", 2, 36.0),
        ];
        let n = records.len();
        WeatherTable::new(records, n)
    }

    #[test]
    fn cities_are_sorted_and_unique() {
        assert_eq!(distinct_cities(&table()), vec!["Chennai", "Delhi", "Mumbai"]);
        assert!(distinct_cities(&WeatherTable::default()).is_empty());
    }

    #[test]
    fn filter_keeps_only_the_selected_city_in_order() {
        let table = table();
        let delhi = filter_by_city(&table, "Delhi");
        assert_eq!(delhi.city, "Delhi");
        assert_eq!(delhi.len(), 3);
        assert!(delhi.records.iter().all(|r| r.location_name == "Delhi"));
        assert_eq!(delhi.column(crate::data::model::Field::Temperature), vec![38.0, 37.5, 36.0]);
    }

    #[test]
    fn cities_partition_the_table() {
        let table = table();
        let total: usize = distinct_cities(&table)
            .iter()
            .map(|city| {
                let subset = filter_by_city(&table, city);
                assert!(!subset.is_empty());
                subset.len()
            })
            .sum();
        assert_eq!(total, table.len());
    }

    #[test]
    fn unknown_city_is_empty_not_an_error() {
        let table = table();
        let subset = filter_by_city(&table, "Shimla");
        assert!(subset.is_empty());
        assert!(!distinct_cities(&table).contains(&"Shimla".to_string()));
    }
}
