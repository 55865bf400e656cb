use wheremerge::{
    LogicalOp, Query, WhereClause, compose_query,
    format::{FormatFlags, FormatOptions, format_query},
    merge_where_clauses, parse_query, parse_where,
};

const BASE: &str = "SELECT Id FROM Object";

fn query(filter: &str) -> Query {
    parse_query(&format!("{BASE} WHERE {filter}")).unwrap()
}

/// Merges the filters of two queries and checks the result against the parse of
/// `expected`, both structurally and by composing it back into a query that parses and
/// formats cleanly.
fn check_merge(first: &str, second: &str, op: LogicalOp, expected: &str) {
    let first = parse_query(first).unwrap();
    let second = parse_query(second).unwrap();
    let expected = parse_query(expected).unwrap().where_clause;

    let merged = merge_where_clauses(first.where_clause.as_ref(), second.where_clause.as_ref(), op);

    let mut composed = first.clone();
    composed.where_clause = merged.clone();
    let text = compose_query(&composed);

    let reparsed = parse_query(&text).unwrap();
    assert_eq!(reparsed, composed);
    for flags in [FormatFlags::empty(), FormatFlags::all()] {
        let options = FormatOptions { indent: 2, flags };
        format_query(&text, &options).unwrap();
    }

    assert_eq!(merged, expected);
}

mod base_case {
    use super::*;

    #[test]
    fn no_filters_on_either_side() {
        check_merge(BASE, BASE, LogicalOp::And, BASE);
    }

    #[test]
    fn only_one_side_filtered() {
        let filtered = "SELECT Id FROM Object WHERE field1 = 'value1'";
        check_merge(BASE, filtered, LogicalOp::And, filtered);
        check_merge(filtered, BASE, LogicalOp::Or, filtered);
    }
}

mod and_or {
    use super::*;

    #[test]
    fn simple_and() {
        check_merge(
            "SELECT Id FROM Object WHERE field1 = 'value1'",
            "SELECT Id FROM Object WHERE field2 = 'value2'",
            LogicalOp::And,
            "SELECT Id FROM Object WHERE (field1 = 'value1') AND (field2 = 'value2')",
        );
    }

    #[test]
    fn simple_or() {
        check_merge(
            "SELECT Id FROM Object WHERE field1 = 'value1'",
            "SELECT Id FROM Object WHERE field2 = 'value2'",
            LogicalOp::Or,
            "SELECT Id FROM Object WHERE (field1 = 'value1') OR (field2 = 'value2')",
        );
    }

    #[test]
    fn chains_keep_their_own_operators() {
        for (op, word) in [(LogicalOp::And, "AND"), (LogicalOp::Or, "OR")] {
            check_merge(
                "SELECT Id FROM Object WHERE field1 = 'value1' AND field3 = 'value3'",
                "SELECT Id FROM Object WHERE field2 = 'value2' OR field4 = 'value4'",
                op,
                &format!(
                    "SELECT Id FROM Object WHERE \
                     (field1 = 'value1' AND field3 = 'value3') {word} (field2 = 'value2' OR field4 = 'value4')"
                ),
            );
        }
    }

    #[test]
    fn extremely_deep_nesting() {
        check_merge(
            "SELECT Id FROM Object WHERE
             ((field1 = 'value1' AND (field2 = 'value2' OR (field3 = 'value3' AND field4 = 'value4')))
              OR ((field5 = 'value5' AND field6 = 'value6') AND (field7 = 'value7' OR field8 = 'value8')))",
            "SELECT Id FROM Object WHERE
             (((field9 = 'value9' AND (field10 = 'value10' OR field11 = 'value11')) OR field12 = 'value12')
              AND ((field13 = 'value13' OR field14 = 'value14') AND (field15 = 'value15' AND field16 = 'value16')))",
            LogicalOp::And,
            "SELECT Id FROM Object WHERE
             (((field1 = 'value1' AND (field2 = 'value2' OR (field3 = 'value3' AND field4 = 'value4')))
               OR ((field5 = 'value5' AND field6 = 'value6') AND (field7 = 'value7' OR field8 = 'value8'))))
             AND
             ((((field9 = 'value9' AND (field10 = 'value10' OR field11 = 'value11')) OR field12 = 'value12')
               AND ((field13 = 'value13' OR field14 = 'value14') AND (field15 = 'value15' AND field16 = 'value16'))))",
        );
    }
}

mod subqueries {
    use super::*;

    #[test]
    fn membership_in_sub_selects() {
        for (op, word) in [(LogicalOp::And, "AND"), (LogicalOp::Or, "OR")] {
            check_merge(
                &format!(
                    "SELECT Id FROM Object WHERE
                     field1 IN (SELECT Id FROM RelatedObject WHERE field2 = 'value1')
                     {word} field3 = 'value3'"
                ),
                &format!(
                    "SELECT Id FROM Object WHERE
                     field4 = 'value4'
                     {word} field5 IN (SELECT Id FROM AnotherRelatedObject WHERE field6 = 'value5')"
                ),
                op,
                &format!(
                    "SELECT Id FROM Object WHERE
                     (field1 IN (SELECT Id FROM RelatedObject WHERE field2 = 'value1')
                      {word} field3 = 'value3')
                     {word}
                     (field4 = 'value4'
                      {word} field5 IN (SELECT Id FROM AnotherRelatedObject WHERE field6 = 'value5'))"
                ),
            );
        }
    }

    #[test]
    fn sub_select_filters_are_left_alone() {
        let left = query("Id IN (SELECT Id FROM Other WHERE a = 1 OR b = 2)");
        let right = query("c = 3");
        let merged = merge_where_clauses(
            left.where_clause.as_ref(),
            right.where_clause.as_ref(),
            LogicalOp::And,
        )
        .unwrap();
        assert_eq!(
            merged.to_string(),
            "(Id IN (SELECT Id FROM Other WHERE a = 1 OR b = 2)) AND (c = 3)"
        );
    }
}

mod negation {
    use super::*;

    #[test]
    fn mixed_and_or_not() {
        check_merge(
            "SELECT Id FROM Object WHERE field1 = 'value1' AND field2 = 'value2' OR NOT field3 = 'value3'",
            "SELECT Id FROM Object WHERE field4 = 'value4' AND NOT field5 = 'value5'",
            LogicalOp::And,
            "SELECT Id FROM Object WHERE
             (field1 = 'value1' AND field2 = 'value2' OR NOT field3 = 'value3')
             AND
             (field4 = 'value4' AND NOT field5 = 'value5')",
        );
    }

    #[test]
    fn and_not() {
        check_merge(
            "SELECT Id FROM Object WHERE field1 = 'value1' AND NOT field2 = 'value2'",
            "SELECT Id FROM Object WHERE field3 = 'value3' AND NOT field4 = 'value4'",
            LogicalOp::And,
            "SELECT Id FROM Object WHERE
             (field1 = 'value1' AND NOT field2 = 'value2')
             AND
             (field3 = 'value3' AND NOT field4 = 'value4')",
        );
    }

    #[test]
    fn or_not() {
        check_merge(
            "SELECT Id FROM Object WHERE field1 = 'value1' OR NOT field2 = 'value2'",
            "SELECT Id FROM Object WHERE field3 = 'value3' OR NOT field4 = 'value4'",
            LogicalOp::Or,
            "SELECT Id FROM Object WHERE
             (field1 = 'value1' OR NOT field2 = 'value2')
             OR
             (field3 = 'value3' OR NOT field4 = 'value4')",
        );
    }

    #[test]
    fn negated_group() {
        check_merge(
            "SELECT Id FROM Object WHERE NOT (field1 = 'a' OR field2 = 'b')",
            "SELECT Id FROM Object WHERE field3 = 'c' AND NOT (field4 = 'd' AND field5 = 'e')",
            LogicalOp::Or,
            "SELECT Id FROM Object WHERE
             (NOT (field1 = 'a' OR field2 = 'b'))
             OR
             (field3 = 'c' AND NOT (field4 = 'd' AND field5 = 'e'))",
        );
    }

    #[test]
    fn new_scope_opens_before_a_negated_group() {
        let left = parse_where("NOT (a = 1 OR b = 2)").unwrap();
        let right = parse_where("c = 3").unwrap();
        let merged = merge_where_clauses(Some(&left), Some(&right), LogicalOp::And).unwrap();
        assert_eq!(merged.to_string(), "(NOT (a = 1 OR b = 2)) AND (c = 3)");

        let head = merged.first();
        assert_eq!((head.open_parens, head.negated, head.inner_parens), (1, true, 1));
        assert_eq!(parse_where(&merged.to_string()).unwrap(), merged);
    }

    #[test]
    fn leading_not_stays_inside_the_new_scope() {
        let merged = merge_where_clauses(
            Some(&parse_where("NOT a = 1").unwrap()),
            Some(&parse_where("NOT b = 2").unwrap()),
            LogicalOp::Or,
        )
        .unwrap();
        assert_eq!(merged.to_string(), "(NOT a = 1) OR (NOT b = 2)");
    }
}

mod scenarios {
    use super::*;

    fn merged_text(left: Option<&str>, right: Option<&str>, op: LogicalOp) -> Option<String> {
        let left = left.map(|s| parse_where(s).unwrap());
        let right = right.map(|s| parse_where(s).unwrap());
        merge_where_clauses(left.as_ref(), right.as_ref(), op).map(|c| c.to_string())
    }

    #[test]
    fn two_single_conditions() {
        assert_eq!(
            merged_text(Some("f1='v1'"), Some("f2='v2'"), LogicalOp::And).as_deref(),
            Some("(f1 = 'v1') AND (f2 = 'v2')")
        );
    }

    #[test]
    fn two_chains_joined_by_or() {
        assert_eq!(
            merged_text(Some("f1='v1' AND f3='v3'"), Some("f2='v2' OR f4='v4'"), LogicalOp::Or)
                .as_deref(),
            Some("(f1 = 'v1' AND f3 = 'v3') OR (f2 = 'v2' OR f4 = 'v4')")
        );
    }

    #[test]
    fn absent_left_adds_no_parentheses() {
        assert_eq!(
            merged_text(None, Some("f1='v1'"), LogicalOp::And).as_deref(),
            Some("f1 = 'v1'")
        );
    }

    #[test]
    fn both_absent() {
        assert_eq!(merged_text(None, None, LogicalOp::And), None);
        assert_eq!(merged_text(None, None, LogicalOp::Or), None);
    }

    #[test]
    fn nested_input_gains_exactly_one_scope() {
        let text = merged_text(Some("(a=1 AND (b=2 OR c=3))"), Some("d=4"), LogicalOp::And);
        assert_eq!(text.as_deref(), Some("((a = 1 AND (b = 2 OR c = 3))) AND (d = 4)"));

        let expected = parse_where("((a=1 AND (b=2 OR c=3))) AND (d=4)").unwrap();
        assert_eq!(parse_where(&text.unwrap()).unwrap(), expected);
    }
}

#[test]
fn inputs_survive_the_merge() {
    let left = parse_where("(a = 1 OR b = 2) AND c IN (SELECT Id FROM X WHERE d = 3)").unwrap();
    let right = parse_where("NOT e = 'x'").unwrap();
    let (left_before, right_before) = (left.to_string(), right.to_string());
    let (left_copy, right_copy) = (left.clone(), right.clone());

    for op in [LogicalOp::And, LogicalOp::Or] {
        let _ = merge_where_clauses(Some(&left), Some(&right), op);
        let _ = merge_where_clauses(Some(&left), None, op);
        let _ = merge_where_clauses(None, Some(&right), op);
    }

    assert_eq!(left.to_string(), left_before);
    assert_eq!(right.to_string(), right_before);
    assert_eq!(left, left_copy);
    assert_eq!(right, right_copy);
}

#[test]
fn merges_compose_further_without_losing_grouping() {
    let a = parse_where("a = 1 OR b = 2").unwrap();
    let b = parse_where("c = 3").unwrap();
    let c = parse_where("d = 4 OR e = 5").unwrap();

    let ab = merge_where_clauses(Some(&a), Some(&b), LogicalOp::And).unwrap();
    let abc = merge_where_clauses(Some(&ab), Some(&c), LogicalOp::And).unwrap();
    assert_eq!(
        abc.to_string(),
        "((a = 1 OR b = 2) AND (c = 3)) AND (d = 4 OR e = 5)"
    );
    assert_eq!(abc.paren_balance(), 0);
}

#[test]
fn query_level_merge_and_json_dump() {
    let mut first = query("slug = 'my_slug'");
    let second = query("name = 'my_name'");
    first.merge_where(second.where_clause.as_ref(), LogicalOp::Or);

    assert_eq!(
        compose_query(&first),
        "SELECT Id FROM Object WHERE (slug = 'my_slug') OR (name = 'my_name')"
    );

    let json = serde_json::to_value(&first).unwrap();
    let back: Query = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(back, first);
    assert_eq!(json["where"][0]["op"], "OR");
    assert_eq!(json["where"][0]["condition"]["openParens"], 1);

    let clause: WhereClause = serde_json::from_value(json["where"].clone()).unwrap();
    assert_eq!(Some(clause), first.where_clause);
}
