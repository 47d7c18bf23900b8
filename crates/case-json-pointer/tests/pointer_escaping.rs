use case_json_pointer::{escape_component, format_json_pointer, parse_json_pointer, unescape_component};
use proptest::prelude::*;

proptest! {
    #[test]
    fn component_escaping_round_trips(s in "[a-z~/0-9]{0,12}") {
        prop_assert_eq!(unescape_component(&escape_component(&s)), s);
    }

    #[test]
    fn pointer_round_trips(path in proptest::collection::vec("[a-z~/]{0,6}", 0..5)) {
        let pointer = format_json_pointer(&path);
        prop_assert_eq!(parse_json_pointer(&pointer), path);
    }
}

#[test]
fn escaped_pointer_never_contains_raw_separator_inside_segment() {
    let pointer = format_json_pointer(&["flowOfFunds/amount".to_string()]);
    assert_eq!(pointer, "/flowOfFunds~1amount");
    assert_eq!(pointer.matches('/').count(), 1);
}
