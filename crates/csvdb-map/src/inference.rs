//! Column type inference from sampled raw values.
//!
//! Each value is classified on its own, then the column takes the least
//! restrictive class seen: `Text ⊒ Real ⊒ Integer`.
//!
//! # Classification
//!
//! After trimming and stripping one leading `+` or `-`:
//! - all ASCII digits → `Integer`
//! - exactly one `.` and all digits once it is removed → `Real`
//! - anything else → `Text`
//!
//! Blank values carry no type information and are skipped. A column whose
//! sampled values are all blank is `Text`; a column with no values at all
//! has no type (`None`).

use csvdb_model::DataType;

/// Maximum number of values examined per column.
pub const SAMPLE_LIMIT: usize = 1000;

/// Classify a single raw value.
pub fn classify(raw: &str) -> DataType {
    let value = raw.trim();
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    if is_digits(unsigned) {
        return DataType::Integer;
    }
    if unsigned.matches('.').count() == 1 && is_digits(&unsigned.replacen('.', "", 1)) {
        return DataType::Real;
    }
    DataType::Text
}

/// Infer the type of a column from its first [`SAMPLE_LIMIT`] values.
///
/// Returns `None` when `values` is empty.
pub fn infer<'a, I>(values: I) -> Option<DataType>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen_any = false;
    let mut inferred: Option<DataType> = None;
    for value in values.into_iter().take(SAMPLE_LIMIT) {
        seen_any = true;
        if value.trim().is_empty() {
            continue;
        }
        let class = classify(value);
        let unified = inferred.map_or(class, |current| current.unify(class));
        if unified == DataType::Text {
            return Some(DataType::Text);
        }
        inferred = Some(unified);
    }
    if !seen_any {
        return None;
    }
    Some(inferred.unwrap_or(DataType::Text))
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn classifies_single_values() {
        assert_eq!(classify("42"), DataType::Integer);
        assert_eq!(classify("-23123121"), DataType::Integer);
        assert_eq!(classify("+7"), DataType::Integer);
        assert_eq!(classify("0.4"), DataType::Real);
        assert_eq!(classify(".5"), DataType::Real);
        assert_eq!(classify("-1."), DataType::Real);
        assert_eq!(classify("1.2.3"), DataType::Text);
        assert_eq!(classify("0.4x"), DataType::Text);
        assert_eq!(classify("+-1"), DataType::Text);
        assert_eq!(classify("-"), DataType::Text);
        assert_eq!(classify("."), DataType::Text);
        assert_eq!(classify("1e5"), DataType::Text);
    }

    #[test]
    fn infers_least_restrictive_type() {
        assert_eq!(infer(["2", "3", "0.4", "-23123121"]), Some(DataType::Real));
        assert_eq!(infer(["2", "-1", "0"]), Some(DataType::Integer));
        assert_eq!(infer(["2", "0.4x"]), Some(DataType::Text));
    }

    #[test]
    fn blanks_are_skipped() {
        assert_eq!(infer(["1", "", "  ", "2"]), Some(DataType::Integer));
        assert_eq!(infer(["", ""]), Some(DataType::Text));
    }

    #[test]
    fn empty_input_has_no_type() {
        assert_eq!(infer(std::iter::empty()), None);
    }

    #[test]
    fn only_the_sample_is_examined() {
        let mut values = vec!["1"; SAMPLE_LIMIT];
        values.push("not a number");
        assert_eq!(infer(values.iter().copied()), Some(DataType::Integer));
    }

    proptest! {
        #[test]
        fn integers_are_integer(values in prop::collection::vec(any::<i64>(), 1..50)) {
            let rendered: Vec<String> = values.iter().map(i64::to_string).collect();
            prop_assert_eq!(infer(rendered.iter().map(String::as_str)), Some(DataType::Integer));
        }

        #[test]
        fn one_decimal_makes_column_real(
            ints in prop::collection::vec(any::<i32>(), 0..20),
            whole in 0u32..10_000,
            frac in 0u32..10_000,
        ) {
            let mut rendered: Vec<String> = ints.iter().map(i32::to_string).collect();
            rendered.push(format!("{whole}.{frac}"));
            prop_assert_eq!(infer(rendered.iter().map(String::as_str)), Some(DataType::Real));
        }

        #[test]
        fn any_text_makes_column_text(
            numbers in prop::collection::vec(any::<i32>(), 0..20),
            word in "[a-z]{1,8}",
        ) {
            let mut rendered: Vec<String> = numbers.iter().map(i32::to_string).collect();
            rendered.insert(rendered.len() / 2, word);
            prop_assert_eq!(infer(rendered.iter().map(String::as_str)), Some(DataType::Text));
        }
    }
}
