//! Property tests for session variable and warning behavior.

use latticedb_core::{TypeTag, Value};
use latticedb_engine::{Session, Warning};
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = (TypeTag, Value)> {
    prop_oneof![
        Just((TypeTag::Null, Value::Null)),
        any::<bool>().prop_map(|b| (TypeTag::Bool, Value::Bool(b))),
        any::<i64>().prop_map(|n| (TypeTag::Int64, Value::Int64(n))),
        (-1.0e12f64..1.0e12).prop_map(|f| (TypeTag::Float64, Value::Float64(f))),
        ".*".prop_map(|s| (TypeTag::Text, Value::Text(s))),
    ]
}

proptest! {
    #[test]
    fn set_then_get_returns_the_pair(name in "[a-z_][a-z0-9_.]{0,30}", (tag, value) in arb_value()) {
        let mut session = Session::new("127.0.0.1:0", "prop", 0);
        session.set(name.clone(), tag, value.clone());
        let (got_tag, got_value) = session.get(&name);
        prop_assert_eq!(got_tag, tag);
        prop_assert_eq!(got_value, value);
    }

    #[test]
    fn last_write_wins(values in proptest::collection::vec(arb_value(), 1..8)) {
        let mut session = Session::new("127.0.0.1:0", "prop", 0);
        for (tag, value) in &values {
            session.set("v", *tag, value.clone());
        }
        let (last_tag, last_value) = values[values.len() - 1].clone();
        prop_assert_eq!(session.get("v"), (last_tag, last_value));
    }

    #[test]
    fn warnings_read_back_newest_first(codes in proptest::collection::vec(any::<u32>(), 0..16)) {
        let mut session = Session::new("127.0.0.1:0", "prop", 0);
        for code in &codes {
            session.warn(Warning::new(*code, "w"));
        }
        let read: Vec<u32> = session.warnings().iter().map(|w| w.code).collect();
        let mut expected = codes;
        expected.reverse();
        prop_assert_eq!(read, expected);
    }

    #[test]
    fn warning_bound_keeps_the_newest(max in 1usize..8, count in 0usize..24) {
        let mut session = Session::new("127.0.0.1:0", "prop", 0).with_max_warnings(max);
        for i in 0..count {
            #[allow(clippy::cast_possible_truncation)]
            session.warn(Warning::new(i as u32, "w"));
        }
        prop_assert!(session.warning_count() <= max);
        if count > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let newest = (count - 1) as u32;
            prop_assert_eq!(session.warnings()[0].code, newest);
        }
    }
}
