//! End-to-end execution tests: session state, the pull protocol, and
//! cooperative cancellation through a plan tree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use latticedb_core::{TypeTag, Value};
use latticedb_engine::expression::{Comparison, ComparisonOp, ExprRef, GetField, Literal};
use latticedb_engine::plan::{CrossJoin, Filter, Limit, Project, Sort, SortField, Values};
use latticedb_engine::row::{Column, Row, Schema};
use latticedb_engine::{
    drain, BoxedRowIter, Context, Error, Node, NodeRef, Result, RowIter, SchemaRef, Session,
    Warning,
};

fn test_session() -> Session {
    Session::new("127.0.0.1:34567", "client-1", 1)
}

fn test_context() -> Context {
    Context::new(test_session().into_ref())
}

fn int_schema(name: &str) -> Schema {
    Schema::new(vec![Column::new(name, TypeTag::Int64).not_null()])
}

fn numbers(name: &str, upto: i64) -> NodeRef {
    let rows = (1..=upto).map(|i| Row::new(vec![Value::Int64(i)])).collect();
    Values::node(int_schema(name), rows)
}

#[test]
fn session_variables_and_warnings() {
    let mut session = test_session();

    // Unset variables read as typed null, not as an error.
    assert_eq!(session.get("auto_increment_increment"), (TypeTag::Null, Value::Null));

    session.set("auto_increment_increment", TypeTag::Int64, Value::Int64(123));
    session.set("validate_password.policy", TypeTag::Text, Value::from("strict"));
    assert_eq!(
        session.get("auto_increment_increment"),
        (TypeTag::Int64, Value::Int64(123))
    );
    assert_eq!(
        session.get("validate_password.policy"),
        (TypeTag::Text, Value::from("strict"))
    );

    session.warn(Warning::new(1, "first"));
    session.warn(Warning::new(2, "second"));
    session.warn(Warning::new(3, "third"));

    // Reverse chronological order: the latest warning reads first.
    let codes: Vec<u32> = session.warnings().iter().map(|w| w.code).collect();
    assert_eq!(codes, vec![3, 2, 1]);
    assert_eq!(session.warning_count(), 3);

    session.clear_warnings();
    assert_eq!(session.warning_count(), 0);
}

/// A source that counts how many rows it has produced, so tests can observe
/// exactly where a consumer stopped pulling.
#[derive(Debug)]
struct CountingSource {
    schema: SchemaRef,
    total: u64,
    produced: Arc<AtomicU64>,
}

impl CountingSource {
    fn node(total: u64, produced: Arc<AtomicU64>) -> NodeRef {
        Arc::new(Self {
            schema: Arc::new(Schema::new(vec![Column::new("i", TypeTag::Int64).not_null()])),
            total,
            produced,
        })
    }
}

impl Node for CountingSource {
    fn name(&self) -> &'static str {
        "CountingSource"
    }

    fn resolved(&self) -> bool {
        true
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    fn with_children(&self, _children: Vec<NodeRef>) -> Result<NodeRef> {
        Err(Error::unsupported("with_children", self.name()))
    }

    fn with_expressions(&self, _expressions: Vec<ExprRef>) -> Result<NodeRef> {
        Err(Error::unsupported("with_expressions", self.name()))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        Ok(Box::new(CountingIter {
            ctx: ctx.clone(),
            remaining: self.total,
            produced: Arc::clone(&self.produced),
        }))
    }
}

struct CountingIter {
    ctx: Context,
    remaining: u64,
    produced: Arc<AtomicU64>,
}

impl RowIter for CountingIter {
    fn next(&mut self) -> Result<Row> {
        if self.remaining == 0 || self.ctx.is_cancelled() {
            return Err(Error::EndOfRows);
        }
        self.remaining -= 1;
        let n = i64::try_from(self.produced.fetch_add(1, Ordering::SeqCst) + 1).unwrap_or(i64::MAX);
        Ok(Row::new(vec![Value::Int64(n)]))
    }

    fn close(&mut self) -> Result<()> {
        self.remaining = 0;
        Ok(())
    }
}

#[test]
fn cancellation_stops_an_unbounded_source() {
    let produced = Arc::new(AtomicU64::new(0));
    let node = CountingSource::node(u64::MAX, Arc::clone(&produced));

    let ctx = test_context();
    let mut iter = node.row_iter(&ctx).expect("iter");

    for _ in 0..6 {
        iter.next().expect("row before cancel");
    }
    ctx.cancel();

    let err = iter.next().expect_err("cancelled");
    assert!(err.is_end_of_rows());
    assert!(ctx.is_cancelled());
    assert_eq!(produced.load(Ordering::SeqCst), 6);
    iter.close().expect("close");
}

#[test]
fn cancelling_a_parent_context_stops_iterators_on_descendants() {
    let produced = Arc::new(AtomicU64::new(0));
    let node = CountingSource::node(u64::MAX, Arc::clone(&produced));

    // The iterator is bound to a derived child context, not the one being
    // cancelled.
    let ctx = test_context();
    let child_ctx = ctx.child();
    let mut iter = node.row_iter(&child_ctx).expect("iter");
    iter.next().expect("row before cancel");

    ctx.cancel();
    assert!(iter.next().expect_err("cancelled via parent").is_end_of_rows());
    assert!(child_ctx.is_cancelled());
    assert_eq!(produced.load(Ordering::SeqCst), 1);
    iter.close().expect("close");
}

#[test]
fn cancellation_propagates_through_a_composite_plan() {
    let produced = Arc::new(AtomicU64::new(0));
    let source = CountingSource::node(u64::MAX, Arc::clone(&produced));
    let plan = Limit::node(
        1_000_000,
        0,
        Filter::node(
            Comparison::expr(
                ComparisonOp::Gt,
                GetField::expr(0, "i", TypeTag::Int64, false),
                Literal::expr(0i64),
            ),
            source,
        ),
    );

    let ctx = test_context();
    let mut iter = plan.row_iter(&ctx).expect("iter");
    for _ in 0..3 {
        iter.next().expect("row before cancel");
    }
    ctx.cancel();
    assert!(iter.next().expect_err("cancelled").is_end_of_rows());
    assert_eq!(produced.load(Ordering::SeqCst), 3);
}

#[test]
fn full_pipeline_produces_expected_rows() {
    // SELECT a, b FROM left CROSS JOIN right WHERE a >= b ORDER BY b DESC, a ASC LIMIT 3
    let plan = Limit::node(
        3,
        0,
        Sort::node(
            vec![
                SortField::desc(GetField::expr(1, "b", TypeTag::Int64, false)),
                SortField::asc(GetField::expr(0, "a", TypeTag::Int64, false)),
            ],
            Filter::node(
                Comparison::expr(
                    ComparisonOp::GtEq,
                    GetField::expr(0, "a", TypeTag::Int64, false),
                    GetField::expr(1, "b", TypeTag::Int64, false),
                ),
                CrossJoin::node(numbers("a", 3), numbers("b", 3)),
            ),
        ),
    );

    let rows = drain(plan.row_iter(&test_context()).expect("iter")).expect("drain");
    let pairs: Vec<(i64, i64)> = rows
        .iter()
        .map(|r| {
            let a = r.get(0).and_then(Value::as_int).expect("a");
            let b = r.get(1).and_then(Value::as_int).expect("b");
            (a, b)
        })
        .collect();
    assert_eq!(pairs, vec![(3, 3), (2, 2), (3, 2)]);
}

#[test]
fn projection_renames_and_computes() {
    let plan = Project::node(
        vec![
            latticedb_engine::expression::Alias::expr(
                GetField::expr(0, "n", TypeTag::Int64, false),
                "value",
            ),
            Literal::expr("tag"),
        ],
        numbers("n", 2),
    );

    let schema = plan.schema();
    assert_eq!(schema.column_at(0).map(Column::name), Some("value"));
    assert_eq!(schema.column_at(1).map(Column::type_tag), Some(TypeTag::Text));

    let rows = drain(plan.row_iter(&test_context()).expect("iter")).expect("drain");
    assert_eq!(rows[0].values(), &[Value::Int64(1), Value::from("tag")]);
    assert_eq!(rows[1].values(), &[Value::Int64(2), Value::from("tag")]);
}

#[test]
fn close_is_idempotent_across_the_tree() {
    let plan = Limit::node(10, 0, Filter::node(Literal::expr(true), numbers("n", 5)));
    let mut iter = plan.row_iter(&test_context()).expect("iter");
    iter.next().expect("row");
    iter.close().expect("first close");
    iter.close().expect("second close");
    assert!(iter.next().expect_err("closed").is_end_of_rows());
}

#[test]
fn drain_closes_on_failure() {
    // A filter over a non-boolean predicate fails on the first pull; drain
    // must still return the error rather than the sentinel.
    let plan = Filter::node(Literal::expr(1i64), numbers("n", 3));
    let err = drain(plan.row_iter(&test_context()).expect("iter")).expect_err("failure");
    assert!(!err.is_end_of_rows());
}

#[test]
fn deadline_in_the_past_yields_no_rows() {
    let ctx = test_context()
        .with_deadline(std::time::Instant::now() - std::time::Duration::from_millis(1));
    let rows = drain(numbers("n", 100).row_iter(&ctx).expect("iter")).expect("drain");
    assert!(rows.is_empty());
}

#[test]
fn context_warnings_reach_the_session() {
    let ctx = test_context();
    ctx.warn(Warning::new(1364, "field does not have a default value"));

    let session = ctx.session();
    let guard = session.lock().expect("session lock");
    assert_eq!(guard.warning_count(), 1);
    assert_eq!(guard.warnings()[0].code, 1364);
}
