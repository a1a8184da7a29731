use std::collections::BTreeSet;

use super::model::PairedSample;

/// Drop every paired row whose plate date is in `excluded_dates`.
///
/// Returns the number of rows removed.
pub fn exclude_dates(rows: &mut Vec<PairedSample>, excluded_dates: &BTreeSet<String>) -> usize {
    if excluded_dates.is_empty() {
        return 0;
    }
    let before = rows.len();
    rows.retain(|row| !excluded_dates.contains(&row.date));
    before - rows.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired(date: &str, well: &str) -> PairedSample {
        PairedSample {
            sample: format!("{date} {well}"),
            date: date.to_string(),
            well: well.to_string(),
            strain: "WT".to_string(),
            condition: "YPD".to_string(),
            dilution: 0,
            area_start: Some(1.0),
            area_end: Some(1.0),
            ratio: Some(1.0),
        }
    }

    #[test]
    fn test_excludes_only_listed_dates() {
        let mut rows = vec![
            paired("20160614", "A1"),
            paired("20160615", "A1"),
            paired("20160614", "B2"),
        ];
        let excluded = BTreeSet::from(["20160614".to_string()]);

        assert_eq!(exclude_dates(&mut rows, &excluded), 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "20160615");
    }

    #[test]
    fn test_empty_exclusion_set_keeps_everything() {
        let mut rows = vec![paired("20160614", "A1")];
        assert_eq!(exclude_dates(&mut rows, &BTreeSet::new()), 0);
        assert_eq!(rows.len(), 1);
    }
}
